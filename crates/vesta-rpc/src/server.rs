use std::net::SocketAddr;
use std::sync::Arc;

use jsonrpsee::core::{async_trait, RpcResult};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::types::ErrorObject;
use tracing::info;

use vesta_core::constants::{API_VERSION, GRANA_PER_VST, PROTOCOL_VERSION};
use vesta_core::error::VestaError;
use vesta_core::types::{AccountId, Balance, Timestamp};
use vesta_maturity::{release_schedule, MaturityQuery};
use vesta_state::{LedgerEngine, StateDb};

use crate::api::VestaApiServer;
use crate::types::{
    RpcAccount, RpcGenesisInfo, RpcReleasePoint, RpcUnlockSummary, RpcVersionInfo,
};

fn rpc_err(code: i32, msg: impl Into<String>) -> ErrorObject<'static> {
    ErrorObject::owned(code, msg.into(), None::<()>)
}

/// Map a ledger error onto a JSON-RPC error object, preserving the
/// surface message (clients match on "Wrong amount" etc.).
fn ledger_err(e: VestaError) -> ErrorObject<'static> {
    let code = match &e {
        VestaError::InvalidRequest { .. } => -32001,
        VestaError::InsufficientBalance { .. } => -32002,
        VestaError::AllowanceExceeded { .. } => -32003,
        VestaError::Disabled => -32004,
        VestaError::Unauthorized => -32005,
        VestaError::InvalidAccountId(_) => -32602,
        _ => -32603,
    };
    rpc_err(code, e.to_string())
}

fn parse_account(s: &str) -> Result<AccountId, ErrorObject<'static>> {
    AccountId::from_b58(s).map_err(|e| rpc_err(-32602, format!("invalid account id: {e}")))
}

fn parse_amount(s: &str) -> Result<Balance, ErrorObject<'static>> {
    s.parse()
        .map_err(|e| rpc_err(-32602, format!("invalid grana amount: {e}")))
}

fn now() -> Timestamp {
    chrono::Utc::now().timestamp()
}

/// Shared state passed to the RPC server.
pub struct RpcServerState {
    pub db: Arc<StateDb>,
    pub engine: Arc<LedgerEngine>,
    /// Serializes all ledger-mutating calls: one global sequential ordering,
    /// held for the full duration of each write.
    pub write_lock: tokio::sync::Mutex<()>,
}

impl RpcServerState {
    pub fn new(db: Arc<StateDb>, engine: Arc<LedgerEngine>) -> Self {
        Self {
            db,
            engine,
            write_lock: tokio::sync::Mutex::new(()),
        }
    }
}

/// The RPC server implementation.
pub struct RpcServer {
    state: Arc<RpcServerState>,
}

impl RpcServer {
    pub fn new(state: Arc<RpcServerState>) -> Self {
        Self { state }
    }

    /// Start the JSON-RPC server on `addr`. Returns a handle to stop it.
    pub async fn start(self, addr: SocketAddr) -> anyhow::Result<ServerHandle> {
        let server = Server::builder().build(addr).await?;
        let module = self.into_rpc();
        let handle = server.start(module);
        info!(%addr, "RPC server started");
        Ok(handle)
    }
}

#[async_trait]
impl VestaApiServer for RpcServer {
    // ── Reads ────────────────────────────────────────────────────────────────

    async fn get_account(&self, account_id: String) -> RpcResult<Option<RpcAccount>> {
        let id = parse_account(&account_id)?;

        let account = self.state.db.get_account(&id).map_err(ledger_err)?;
        let queue = self.state.db.get_queue(&id).map_err(ledger_err)?;
        if account.is_none() && queue.is_none() {
            return Ok(None);
        }

        let free = account.map(|a| a.free_balance).unwrap_or(0);
        let queue = queue.unwrap_or_default();
        let locked = queue.locked_total();
        let total = free + locked;

        Ok(Some(RpcAccount {
            account_id: id.to_b58(),
            free_grana: free.to_string(),
            free_vst: (free / GRANA_PER_VST).to_string(),
            locked_grana: locked.to_string(),
            locked_vst: (locked / GRANA_PER_VST).to_string(),
            total_grana: total.to_string(),
            total_vst: (total / GRANA_PER_VST).to_string(),
            queue_length: queue.len() as u64,
        }))
    }

    async fn get_balance(&self, account_id: String) -> RpcResult<String> {
        let id = parse_account(&account_id)?;
        let balance = self.state.engine.balance_of(&id).map_err(ledger_err)?;
        Ok(balance.to_string())
    }

    async fn get_free_balance(&self, account_id: String) -> RpcResult<String> {
        let id = parse_account(&account_id)?;
        let balance = self.state.engine.free_balance_of(&id).map_err(ledger_err)?;
        Ok(balance.to_string())
    }

    async fn get_locked_balance(&self, account_id: String) -> RpcResult<String> {
        let id = parse_account(&account_id)?;
        let query = MaturityQuery::new(&self.state.db);
        let balance = query.locked_balance(&id).map_err(ledger_err)?;
        Ok(balance.to_string())
    }

    async fn get_queue_length(&self, account_id: String) -> RpcResult<u64> {
        let id = parse_account(&account_id)?;
        let query = MaturityQuery::new(&self.state.db);
        Ok(query.queue_length(&id).map_err(ledger_err)? as u64)
    }

    async fn get_release_timestamps(&self, account_id: String) -> RpcResult<Vec<i64>> {
        let id = parse_account(&account_id)?;
        let query = MaturityQuery::new(&self.state.db);
        query.release_timestamps(&id).map_err(ledger_err)
    }

    async fn get_locked_amount_at(
        &self,
        account_id: String,
        release_at: i64,
    ) -> RpcResult<String> {
        let id = parse_account(&account_id)?;
        let query = MaturityQuery::new(&self.state.db);
        let amount = query.locked_amount_at(&id, release_at).map_err(ledger_err)?;
        Ok(amount.to_string())
    }

    async fn get_release_schedule(&self, account_id: String) -> RpcResult<Vec<RpcReleasePoint>> {
        let id = parse_account(&account_id)?;
        let queue = self
            .state
            .db
            .get_queue(&id)
            .map_err(ledger_err)?
            .unwrap_or_default();

        Ok(release_schedule(&queue, now())
            .into_iter()
            .map(|p| RpcReleasePoint {
                release_at: p.release_at,
                amount_grana: p.amount.to_string(),
                cumulative_grana: p.cumulative.to_string(),
                matured: p.matured,
            })
            .collect())
    }

    async fn get_allowance(&self, owner: String, spender: String) -> RpcResult<String> {
        let owner = parse_account(&owner)?;
        let spender = parse_account(&spender)?;
        let amount = self
            .state
            .engine
            .allowance(&owner, &spender)
            .map_err(ledger_err)?;
        Ok(amount.to_string())
    }

    async fn get_max_unlock_iteration_count(&self) -> RpcResult<u32> {
        self.state
            .engine
            .max_unlock_iteration_count()
            .map_err(ledger_err)
    }

    async fn get_genesis_info(&self) -> RpcResult<RpcGenesisInfo> {
        Ok(RpcGenesisInfo::current())
    }

    async fn get_version(&self) -> RpcResult<RpcVersionInfo> {
        Ok(RpcVersionInfo {
            node_version: env!("CARGO_PKG_VERSION").to_string(),
            protocol_version: PROTOCOL_VERSION.to_string(),
            api_version: API_VERSION.to_string(),
        })
    }

    // ── Writes ───────────────────────────────────────────────────────────────

    async fn transfer_locked(
        &self,
        sender: String,
        recipient: String,
        amount: String,
        lock_duration_secs: u32,
        unlock_budget: u32,
    ) -> RpcResult<()> {
        let sender = parse_account(&sender)?;
        let recipient = parse_account(&recipient)?;
        let amount = parse_amount(&amount)?;

        let _guard = self.state.write_lock.lock().await;
        self.state
            .engine
            .transfer_locked(
                &sender,
                &recipient,
                amount,
                lock_duration_secs,
                unlock_budget,
                now(),
            )
            .map_err(ledger_err)?;
        Ok(())
    }

    async fn transfer_locked_from(
        &self,
        spender: String,
        sender: String,
        recipient: String,
        amount: String,
        lock_duration_secs: u32,
    ) -> RpcResult<()> {
        let spender = parse_account(&spender)?;
        let sender = parse_account(&sender)?;
        let recipient = parse_account(&recipient)?;
        let amount = parse_amount(&amount)?;

        let _guard = self.state.write_lock.lock().await;
        self.state
            .engine
            .transfer_locked_from(
                &spender,
                &sender,
                &recipient,
                amount,
                lock_duration_secs,
                now(),
            )
            .map_err(ledger_err)?;
        Ok(())
    }

    async fn unlock_expired(
        &self,
        account: String,
        unlock_budget: u32,
    ) -> RpcResult<RpcUnlockSummary> {
        let account = parse_account(&account)?;

        let _guard = self.state.write_lock.lock().await;
        let freed = self
            .state
            .engine
            .unlock_expired(&account, unlock_budget, now())
            .map_err(ledger_err)?;
        Ok(RpcUnlockSummary {
            released_grana: freed.amount.to_string(),
            batches: freed.batches,
        })
    }

    async fn approve(&self, owner: String, spender: String, amount: String) -> RpcResult<()> {
        let owner = parse_account(&owner)?;
        let spender = parse_account(&spender)?;
        let amount = parse_amount(&amount)?;

        let _guard = self.state.write_lock.lock().await;
        self.state
            .engine
            .approve(&owner, &spender, amount)
            .map_err(ledger_err)?;
        Ok(())
    }

    async fn transfer(&self, sender: String, recipient: String, amount: String) -> RpcResult<()> {
        let sender = parse_account(&sender)?;
        let recipient = parse_account(&recipient)?;
        let amount = parse_amount(&amount)?;

        self.state
            .engine
            .transfer(&sender, &recipient, amount)
            .map_err(ledger_err)?;
        Ok(())
    }

    async fn transfer_from(
        &self,
        spender: String,
        sender: String,
        recipient: String,
        amount: String,
    ) -> RpcResult<()> {
        let spender = parse_account(&spender)?;
        let sender = parse_account(&sender)?;
        let recipient = parse_account(&recipient)?;
        let amount = parse_amount(&amount)?;

        self.state
            .engine
            .transfer_from(&spender, &sender, &recipient, amount)
            .map_err(ledger_err)?;
        Ok(())
    }

    async fn set_max_unlock_iteration_count(&self, caller: String, value: u32) -> RpcResult<()> {
        let caller = parse_account(&caller)?;

        let _guard = self.state.write_lock.lock().await;
        self.state
            .engine
            .set_max_unlock_iteration_count(&caller, value)
            .map_err(ledger_err)?;
        Ok(())
    }
}
