use std::path::Path;

use vesta_core::account::Account;
use vesta_core::constants::DEFAULT_MAX_UNLOCK_ITERATIONS;
use vesta_core::error::VestaError;
use vesta_core::queue::LockQueue;
use vesta_core::types::{AccountId, Balance};

/// Persistent ledger database backed by sled (pure-Rust, no C dependencies).
///
/// Named trees (analogous to column families):
///   accounts   — AccountId bytes            → bincode(Account)
///   queues     — AccountId bytes            → bincode(LockQueue)
///   allowances — owner bytes ++ spender bytes → bincode(Balance)
///   meta       — utf8 key bytes             → raw bytes
pub struct StateDb {
    _db: sled::Db,
    accounts: sled::Tree,
    queues: sled::Tree,
    allowances: sled::Tree,
    meta: sled::Tree,
}

const META_OWNER: &str = "owner";
const META_MAX_UNLOCK_ITERATIONS: &str = "max_unlock_iterations";

impl StateDb {
    /// Open or create the ledger database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, VestaError> {
        let db = sled::open(path).map_err(|e| VestaError::Storage(e.to_string()))?;
        let accounts   = db.open_tree("accounts").map_err(|e| VestaError::Storage(e.to_string()))?;
        let queues     = db.open_tree("queues").map_err(|e| VestaError::Storage(e.to_string()))?;
        let allowances = db.open_tree("allowances").map_err(|e| VestaError::Storage(e.to_string()))?;
        let meta       = db.open_tree("meta").map_err(|e| VestaError::Storage(e.to_string()))?;
        Ok(Self { _db: db, accounts, queues, allowances, meta })
    }

    // ── Accounts ─────────────────────────────────────────────────────────────

    pub fn get_account(&self, id: &AccountId) -> Result<Option<Account>, VestaError> {
        match self.accounts.get(id.as_bytes()).map_err(|e| VestaError::Storage(e.to_string()))? {
            Some(bytes) => {
                let acc = bincode::deserialize(&bytes)
                    .map_err(|e| VestaError::Serialization(e.to_string()))?;
                Ok(Some(acc))
            }
            None => Ok(None),
        }
    }

    pub fn put_account(&self, account: &Account) -> Result<(), VestaError> {
        let bytes = bincode::serialize(account)
            .map_err(|e| VestaError::Serialization(e.to_string()))?;
        self.accounts
            .insert(account.account_id.as_bytes(), bytes)
            .map_err(|e| VestaError::Storage(e.to_string()))?;
        Ok(())
    }

    pub fn account_exists(&self, id: &AccountId) -> bool {
        self.accounts.contains_key(id.as_bytes()).unwrap_or(false)
    }

    // ── Lock queues ──────────────────────────────────────────────────────────

    pub fn get_queue(&self, id: &AccountId) -> Result<Option<LockQueue>, VestaError> {
        match self.queues.get(id.as_bytes()).map_err(|e| VestaError::Storage(e.to_string()))? {
            Some(bytes) => {
                let queue = bincode::deserialize(&bytes)
                    .map_err(|e| VestaError::Serialization(e.to_string()))?;
                Ok(Some(queue))
            }
            None => Ok(None),
        }
    }

    pub fn put_queue(&self, id: &AccountId, queue: &LockQueue) -> Result<(), VestaError> {
        let bytes = bincode::serialize(queue)
            .map_err(|e| VestaError::Serialization(e.to_string()))?;
        self.queues
            .insert(id.as_bytes(), bytes)
            .map_err(|e| VestaError::Storage(e.to_string()))?;
        Ok(())
    }

    // ── Allowances ───────────────────────────────────────────────────────────

    fn allowance_key(owner: &AccountId, spender: &AccountId) -> [u8; 64] {
        let mut key = [0u8; 64];
        key[..32].copy_from_slice(owner.as_bytes());
        key[32..].copy_from_slice(spender.as_bytes());
        key
    }

    /// Approved spending budget for `spender` against `owner`'s funds.
    /// Zero when nothing was ever approved.
    pub fn get_allowance(&self, owner: &AccountId, spender: &AccountId) -> Result<Balance, VestaError> {
        match self
            .allowances
            .get(Self::allowance_key(owner, spender))
            .map_err(|e| VestaError::Storage(e.to_string()))?
        {
            Some(bytes) => bincode::deserialize(&bytes)
                .map_err(|e| VestaError::Serialization(e.to_string())),
            None => Ok(0),
        }
    }

    pub fn put_allowance(
        &self,
        owner: &AccountId,
        spender: &AccountId,
        amount: Balance,
    ) -> Result<(), VestaError> {
        let bytes = bincode::serialize(&amount)
            .map_err(|e| VestaError::Serialization(e.to_string()))?;
        self.allowances
            .insert(Self::allowance_key(owner, spender), bytes)
            .map_err(|e| VestaError::Storage(e.to_string()))?;
        Ok(())
    }

    // ── Meta ─────────────────────────────────────────────────────────────────

    pub fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), VestaError> {
        self.meta
            .insert(key.as_bytes(), value)
            .map_err(|e| VestaError::Storage(e.to_string()))?;
        Ok(())
    }

    pub fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, VestaError> {
        self.meta
            .get(key.as_bytes())
            .map(|v| v.map(|iv| iv.to_vec()))
            .map_err(|e| VestaError::Storage(e.to_string()))
    }

    /// The administrator account recorded at genesis, if any.
    pub fn owner(&self) -> Result<Option<AccountId>, VestaError> {
        match self.get_meta(META_OWNER)? {
            Some(bytes) => {
                if bytes.len() != 32 {
                    return Err(VestaError::Storage("corrupt owner record".into()));
                }
                let mut arr = [0u8; 32];
                arr.copy_from_slice(&bytes);
                Ok(Some(AccountId::from_bytes(arr)))
            }
            None => Ok(None),
        }
    }

    pub fn set_owner(&self, owner: &AccountId) -> Result<(), VestaError> {
        self.put_meta(META_OWNER, owner.as_bytes())
    }

    /// Configured ceiling for per-call maturation budgets. Falls back to the
    /// protocol default when genesis never wrote one.
    pub fn max_unlock_iterations(&self) -> Result<u32, VestaError> {
        match self.get_meta(META_MAX_UNLOCK_ITERATIONS)? {
            Some(bytes) => {
                let arr: [u8; 4] = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| VestaError::Storage("corrupt iteration ceiling record".into()))?;
                Ok(u32::from_le_bytes(arr))
            }
            None => Ok(DEFAULT_MAX_UNLOCK_ITERATIONS),
        }
    }

    pub fn set_max_unlock_iterations(&self, value: u32) -> Result<(), VestaError> {
        self.put_meta(META_MAX_UNLOCK_ITERATIONS, &value.to_le_bytes())
    }

    // ── Aggregates ───────────────────────────────────────────────────────────

    /// Sum of every free and locked balance in the ledger. Scans both trees;
    /// used by genesis verification and stats, not by the hot path.
    pub fn ledger_total(&self) -> Result<Balance, VestaError> {
        let mut total: Balance = 0;
        for item in self.accounts.iter() {
            let (_, bytes) = item.map_err(|e| VestaError::Storage(e.to_string()))?;
            let acc: Account = bincode::deserialize(&bytes)
                .map_err(|e| VestaError::Serialization(e.to_string()))?;
            total += acc.free_balance;
        }
        for item in self.queues.iter() {
            let (_, bytes) = item.map_err(|e| VestaError::Storage(e.to_string()))?;
            let queue: LockQueue = bincode::deserialize(&bytes)
                .map_err(|e| VestaError::Serialization(e.to_string()))?;
            total += queue.locked_total();
        }
        Ok(total)
    }

    /// Flush all pending writes to disk.
    pub fn flush(&self) -> Result<(), VestaError> {
        self._db.flush().map_err(|e| VestaError::Storage(e.to_string()))?;
        Ok(())
    }
}
