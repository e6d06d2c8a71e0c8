use serde::{Deserialize, Serialize};

use crate::types::{AccountId, Balance};

/// Account state as stored in the ledger DB.
///
/// Only the immediately spendable balance lives here. The locked side of an
/// account is held by its `LockQueue` record, which carries the aggregate
/// locked total; the account's total balance is always derived as
/// `free_balance + queue.locked_total()` and never stored a second time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub account_id: AccountId,
    /// Immediately spendable balance in grana.
    pub free_balance: Balance,
}

impl Account {
    pub fn new(account_id: AccountId) -> Self {
        Self {
            account_id,
            free_balance: 0,
        }
    }
}
