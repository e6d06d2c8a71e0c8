use serde::{Deserialize, Serialize};

use vesta_core::types::AccountId;

/// Account ids for the two genesis roles.
///
/// In production these come from the external identity/authorization layer;
/// in tests and dev runs, deterministic ids are derived from labels.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenesisParams {
    /// Receives the entire fixed supply as free balance.
    pub issuer: AccountId,
    /// The administrator: the only account allowed to change the unlock
    /// iteration ceiling.
    pub owner: AccountId,
}

impl GenesisParams {
    /// Deterministic parameters for local development and tests.
    /// Not for production: anyone can derive these ids.
    pub fn dev() -> Self {
        Self {
            issuer: AccountId::derived(b"vesta.dev.issuer"),
            owner: AccountId::derived(b"vesta.dev.owner"),
        }
    }
}
