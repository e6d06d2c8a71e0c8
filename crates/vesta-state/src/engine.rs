use std::sync::Arc;

use tracing::{debug, info};

use vesta_core::account::Account;
use vesta_core::error::VestaError;
use vesta_core::queue::{LockQueue, MaturedFunds};
use vesta_core::types::{AccountId, Balance, Timestamp};

use crate::db::StateDb;

// ── Staged mutations ──────────────────────────────────────────────────────────

/// All state changes staged by an operation before atomic commit.
///
/// Every operation validates and mutates in-memory copies first and writes
/// nothing until the whole call has succeeded, so a failure mid-operation
/// leaves the ledger untouched, including any maturation performed earlier
/// in the same call.
#[derive(Default)]
struct StagedMutations {
    accounts: Vec<Account>,
    queues: Vec<(AccountId, LockQueue)>,
    allowances: Vec<(AccountId, AccountId, Balance)>,
}

impl StagedMutations {
    fn commit(self, db: &StateDb) -> Result<(), VestaError> {
        for acc in &self.accounts {
            db.put_account(acc)?;
        }
        for (id, queue) in &self.queues {
            db.put_queue(id, queue)?;
        }
        for (owner, spender, amount) in &self.allowances {
            db.put_allowance(owner, spender, *amount)?;
        }
        Ok(())
    }
}

// ── LedgerEngine ──────────────────────────────────────────────────────────────

/// The transfer ledger.
///
/// Tracks free balances, decides lock vs. free placement of incoming value,
/// and orchestrates bounded maturation before spendability checks. Callers
/// must serialize mutating calls (one global sequential ordering); the
/// engine itself holds no lock.
pub struct LedgerEngine {
    pub db: Arc<StateDb>,
}

impl LedgerEngine {
    pub fn new(db: Arc<StateDb>) -> Self {
        Self { db }
    }

    // ── Transfers ────────────────────────────────────────────────────────────

    /// Move `amount` grana from `sender` to `recipient`, locking it for
    /// `lock_duration_secs` (0 = immediately spendable by the recipient).
    ///
    /// Runs a maturation pass on the sender first, bounded by
    /// `unlock_budget`, so value that matured just before this call can be
    /// spent without a separate unlock round-trip.
    pub fn transfer_locked(
        &self,
        sender: &AccountId,
        recipient: &AccountId,
        amount: Balance,
        lock_duration_secs: u32,
        unlock_budget: u32,
        now: Timestamp,
    ) -> Result<(), VestaError> {
        self.check_unlock_budget(unlock_budget)?;

        let mut staged = StagedMutations::default();
        let mut sender_acc = self.load_account(sender)?;
        let mut sender_queue = self.load_queue(sender)?;

        let freed = sender_queue.mature(now, unlock_budget);
        sender_acc.free_balance += freed.amount;
        if freed.batches > 0 {
            debug!(account = %sender, amount = freed.amount, batches = freed.batches,
                "matured before spend");
        }

        if sender_acc.free_balance < amount {
            return Err(VestaError::InsufficientBalance {
                need: amount,
                have: sender_acc.free_balance,
            });
        }
        sender_acc.free_balance -= amount;

        let release_at = now + Timestamp::from(lock_duration_secs);
        if recipient == sender {
            // One staged copy: the debit and the credit must land on the
            // same record.
            if lock_duration_secs == 0 {
                sender_acc.free_balance += amount;
            } else {
                sender_queue.push(amount, release_at);
            }
        } else {
            let mut recipient_acc = self.load_account(recipient)?;
            let mut recipient_queue = self.load_queue(recipient)?;
            if lock_duration_secs == 0 {
                recipient_acc.free_balance += amount;
            } else {
                recipient_queue.push(amount, release_at);
            }
            staged.accounts.push(recipient_acc);
            staged.queues.push((recipient.clone(), recipient_queue));
        }
        staged.accounts.push(sender_acc);
        staged.queues.push((sender.clone(), sender_queue));
        staged.commit(&self.db)?;

        info!(from = %sender, to = %recipient, amount, lock_duration_secs,
            "locked transfer applied");
        Ok(())
    }

    /// Delegated transfer: `spender` moves `amount` grana of `sender`'s funds
    /// against a pre-approved allowance.
    ///
    /// Deliberately never matures the sender's queue first: a delegated
    /// spend must not expose value the account holder has not chosen to
    /// unlock. The balance check runs against the free balance as currently
    /// recorded, even if a maturation pass would have covered the shortfall.
    pub fn transfer_locked_from(
        &self,
        spender: &AccountId,
        sender: &AccountId,
        recipient: &AccountId,
        amount: Balance,
        lock_duration_secs: u32,
        now: Timestamp,
    ) -> Result<(), VestaError> {
        let mut staged = StagedMutations::default();
        let mut sender_acc = self.load_account(sender)?;

        if sender_acc.free_balance < amount {
            return Err(VestaError::InsufficientBalance {
                need: amount,
                have: sender_acc.free_balance,
            });
        }
        let approved = self.db.get_allowance(sender, spender)?;
        if approved < amount {
            return Err(VestaError::AllowanceExceeded {
                approved,
                requested: amount,
            });
        }
        sender_acc.free_balance -= amount;
        staged
            .allowances
            .push((sender.clone(), spender.clone(), approved - amount));

        let release_at = now + Timestamp::from(lock_duration_secs);
        if recipient == sender {
            if lock_duration_secs == 0 {
                sender_acc.free_balance += amount;
            } else {
                let mut sender_queue = self.load_queue(sender)?;
                sender_queue.push(amount, release_at);
                staged.queues.push((sender.clone(), sender_queue));
            }
        } else {
            let mut recipient_acc = self.load_account(recipient)?;
            let mut recipient_queue = self.load_queue(recipient)?;
            if lock_duration_secs == 0 {
                recipient_acc.free_balance += amount;
            } else {
                recipient_queue.push(amount, release_at);
            }
            staged.accounts.push(recipient_acc);
            staged.queues.push((recipient.clone(), recipient_queue));
        }
        staged.accounts.push(sender_acc);
        staged.commit(&self.db)?;

        info!(spender = %spender, from = %sender, to = %recipient, amount,
            lock_duration_secs, "delegated locked transfer applied");
        Ok(())
    }

    // ── Disabled conventional entry points ───────────────────────────────────

    /// Conventional unrestricted transfer. Retained for interface
    /// compatibility only; this ledger moves value exclusively through the
    /// locked-transfer path.
    pub fn transfer(
        &self,
        _sender: &AccountId,
        _recipient: &AccountId,
        _amount: Balance,
    ) -> Result<(), VestaError> {
        Err(VestaError::Disabled)
    }

    /// Conventional unrestricted transferFrom. Always fails; see
    /// [`LedgerEngine::transfer`].
    pub fn transfer_from(
        &self,
        _spender: &AccountId,
        _sender: &AccountId,
        _recipient: &AccountId,
        _amount: Balance,
    ) -> Result<(), VestaError> {
        Err(VestaError::Disabled)
    }

    // ── Maturation ───────────────────────────────────────────────────────────

    /// Self-service unlock: release the contiguous matured prefix of
    /// `account`'s queue, at most `unlock_budget` batches, and credit the
    /// released amount to the free balance.
    pub fn unlock_expired(
        &self,
        account: &AccountId,
        unlock_budget: u32,
        now: Timestamp,
    ) -> Result<MaturedFunds, VestaError> {
        self.check_unlock_budget(unlock_budget)?;

        let mut acc = self.load_account(account)?;
        let mut queue = self.load_queue(account)?;
        let freed = queue.mature(now, unlock_budget);
        if freed.batches == 0 {
            // Nothing matured; leave the ledger byte-identical.
            return Ok(freed);
        }
        acc.free_balance += freed.amount;

        let mut staged = StagedMutations::default();
        staged.accounts.push(acc);
        staged.queues.push((account.clone(), queue));
        staged.commit(&self.db)?;

        info!(account = %account, amount = freed.amount, batches = freed.batches,
            "expired locks released");
        Ok(freed)
    }

    // ── Allowances ───────────────────────────────────────────────────────────

    /// Grant `spender` a spending budget against `owner`'s funds.
    /// Overwrite semantics: the new amount replaces any previous approval.
    pub fn approve(
        &self,
        owner: &AccountId,
        spender: &AccountId,
        amount: Balance,
    ) -> Result<(), VestaError> {
        self.db.put_allowance(owner, spender, amount)?;
        info!(owner = %owner, spender = %spender, amount, "allowance set");
        Ok(())
    }

    pub fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Result<Balance, VestaError> {
        self.db.get_allowance(owner, spender)
    }

    // ── Configuration ────────────────────────────────────────────────────────

    /// Update the ceiling for per-call maturation budgets. Owner only.
    pub fn set_max_unlock_iteration_count(
        &self,
        caller: &AccountId,
        value: u32,
    ) -> Result<(), VestaError> {
        self.ensure_owner(caller)?;
        self.db.set_max_unlock_iterations(value)?;
        info!(value, "max unlock iteration count updated");
        Ok(())
    }

    pub fn max_unlock_iteration_count(&self) -> Result<u32, VestaError> {
        self.db.max_unlock_iterations()
    }

    // ── Reads ────────────────────────────────────────────────────────────────

    /// Total balance: free plus locked.
    pub fn balance_of(&self, id: &AccountId) -> Result<Balance, VestaError> {
        Ok(self.free_balance_of(id)? + self.locked_balance_of(id)?)
    }

    pub fn free_balance_of(&self, id: &AccountId) -> Result<Balance, VestaError> {
        Ok(self
            .db
            .get_account(id)?
            .map(|a| a.free_balance)
            .unwrap_or(0))
    }

    pub fn locked_balance_of(&self, id: &AccountId) -> Result<Balance, VestaError> {
        Ok(self
            .db
            .get_queue(id)?
            .map(|q| q.locked_total())
            .unwrap_or(0))
    }

    // ── Helpers ──────────────────────────────────────────────────────────────

    fn load_account(&self, id: &AccountId) -> Result<Account, VestaError> {
        Ok(self
            .db
            .get_account(id)?
            .unwrap_or_else(|| Account::new(id.clone())))
    }

    fn load_queue(&self, id: &AccountId) -> Result<LockQueue, VestaError> {
        Ok(self.db.get_queue(id)?.unwrap_or_default())
    }

    fn check_unlock_budget(&self, got: u32) -> Result<(), VestaError> {
        let max = self.db.max_unlock_iterations()?;
        if got > max {
            return Err(VestaError::InvalidRequest { max, got });
        }
        Ok(())
    }

    fn ensure_owner(&self, caller: &AccountId) -> Result<(), VestaError> {
        match self.db.owner()? {
            Some(owner) if &owner == caller => Ok(()),
            _ => Err(VestaError::Unauthorized),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
