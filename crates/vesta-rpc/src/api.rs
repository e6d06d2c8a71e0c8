use jsonrpsee::core::RpcResult;
use jsonrpsee::proc_macros::rpc;

use crate::types::{
    RpcAccount, RpcGenesisInfo, RpcReleasePoint, RpcUnlockSummary, RpcVersionInfo,
};

/// Vesta JSON-RPC 2.0 API definition.
///
/// All method names are prefixed with "vesta_" via `namespace = "vesta"`.
/// Amounts travel as decimal grana strings (u128 does not survive JSON
/// number precision). Caller identity is an explicit parameter: the
/// authorization layer in front of this node is responsible for only
/// letting a caller name itself.
#[rpc(server, namespace = "vesta")]
pub trait VestaApi {
    // ── Reads ────────────────────────────────────────────────────────────────

    /// Get an account summary by base-58 account id. Null if the ledger has
    /// never seen the account.
    #[method(name = "getAccount")]
    async fn get_account(&self, account_id: String) -> RpcResult<Option<RpcAccount>>;

    /// Total balance (free + locked) in grana.
    #[method(name = "getBalance")]
    async fn get_balance(&self, account_id: String) -> RpcResult<String>;

    /// Immediately spendable balance in grana.
    #[method(name = "getFreeBalance")]
    async fn get_free_balance(&self, account_id: String) -> RpcResult<String>;

    /// Aggregate locked balance in grana.
    #[method(name = "getLockedBalance")]
    async fn get_locked_balance(&self, account_id: String) -> RpcResult<String>;

    /// Number of pending locked batches.
    #[method(name = "getQueueLength")]
    async fn get_queue_length(&self, account_id: String) -> RpcResult<u64>;

    /// Release timestamps of all pending batches, oldest-arrived first.
    #[method(name = "getReleaseTimestamps")]
    async fn get_release_timestamps(&self, account_id: String) -> RpcResult<Vec<i64>>;

    /// Pending amount releasing at exactly `release_at` (grana).
    #[method(name = "getLockedAmountAt")]
    async fn get_locked_amount_at(&self, account_id: String, release_at: i64)
        -> RpcResult<String>;

    /// The account's release curve, release-time ascending.
    #[method(name = "getReleaseSchedule")]
    async fn get_release_schedule(&self, account_id: String) -> RpcResult<Vec<RpcReleasePoint>>;

    /// Approved spending budget of `spender` against `owner` (grana).
    #[method(name = "getAllowance")]
    async fn get_allowance(&self, owner: String, spender: String) -> RpcResult<String>;

    /// Current ceiling for per-call maturation budgets.
    #[method(name = "getMaxUnlockIterationCount")]
    async fn get_max_unlock_iteration_count(&self) -> RpcResult<u32>;

    /// Protocol constants.
    #[method(name = "getGenesisInfo")]
    async fn get_genesis_info(&self) -> RpcResult<RpcGenesisInfo>;

    /// Node and protocol version information.
    #[method(name = "getVersion")]
    async fn get_version(&self) -> RpcResult<RpcVersionInfo>;

    // ── Writes ───────────────────────────────────────────────────────────────

    /// Locked transfer: move `amount` grana from `sender` to `recipient`,
    /// locked for `lock_duration_secs` (0 = immediately spendable).
    /// Matures the sender's queue first, bounded by `unlock_budget`.
    #[method(name = "transferLocked")]
    async fn transfer_locked(
        &self,
        sender: String,
        recipient: String,
        amount: String,
        lock_duration_secs: u32,
        unlock_budget: u32,
    ) -> RpcResult<()>;

    /// Delegated locked transfer against a pre-approved allowance. Never
    /// matures the sender's queue first.
    #[method(name = "transferLockedFrom")]
    async fn transfer_locked_from(
        &self,
        spender: String,
        sender: String,
        recipient: String,
        amount: String,
        lock_duration_secs: u32,
    ) -> RpcResult<()>;

    /// Self-service unlock: release up to `unlock_budget` matured batches
    /// and credit them to the account's free balance.
    #[method(name = "unlockExpired")]
    async fn unlock_expired(&self, account: String, unlock_budget: u32)
        -> RpcResult<RpcUnlockSummary>;

    /// Grant `spender` a spending budget against `owner`'s funds
    /// (overwrite semantics).
    #[method(name = "approve")]
    async fn approve(&self, owner: String, spender: String, amount: String) -> RpcResult<()>;

    /// Conventional unrestricted transfer. Always fails with "Disabled";
    /// retained for interface compatibility.
    #[method(name = "transfer")]
    async fn transfer(&self, sender: String, recipient: String, amount: String) -> RpcResult<()>;

    /// Conventional unrestricted transferFrom. Always fails with "Disabled".
    #[method(name = "transferFrom")]
    async fn transfer_from(
        &self,
        spender: String,
        sender: String,
        recipient: String,
        amount: String,
    ) -> RpcResult<()>;

    /// Update the maturation budget ceiling. Owner only.
    #[method(name = "setMaxUnlockIterationCount")]
    async fn set_max_unlock_iteration_count(&self, caller: String, value: u32) -> RpcResult<()>;
}
