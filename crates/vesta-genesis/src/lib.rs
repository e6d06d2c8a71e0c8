//! vesta-genesis
//!
//! Builds the Vesta genesis state from scratch, writing directly into a
//! `StateDb` without going through the ledger engine (genesis is the
//! founding document; no transfer ever created this value).
//!
//! Genesis writes:
//!   1. the issuer account holding the entire fixed supply, free
//!   2. the administrator account (zero balance, recorded as owner)
//!   3. the default unlock-iteration ceiling
//!
//! After this, `TOTAL_SUPPLY_GRANA` exists on the ledger and no further
//! minting is ever possible.

pub mod params;

pub use params::GenesisParams;

use tracing::info;

use vesta_core::account::Account;
use vesta_core::constants::{DEFAULT_MAX_UNLOCK_ITERATIONS, TOTAL_SUPPLY_GRANA, TOTAL_SUPPLY_VST};
use vesta_core::error::VestaError;
use vesta_state::StateDb;

/// Apply the genesis state to an empty `StateDb`.
///
/// Fails with `GenesisAlreadyApplied` if an owner is already recorded;
/// genesis may only run once per database.
pub fn apply_genesis(db: &StateDb, params: &GenesisParams) -> Result<(), VestaError> {
    if db.owner()?.is_some() {
        return Err(VestaError::GenesisAlreadyApplied);
    }
    info!("applying Vesta genesis state");

    // ── 1. Issuer allocation ─────────────────────────────────────────────────
    let mut issuer = Account::new(params.issuer.clone());
    issuer.free_balance = TOTAL_SUPPLY_GRANA;
    db.put_account(&issuer)?;
    info!(
        account = %params.issuer,
        supply_vst = TOTAL_SUPPLY_VST,
        "genesis: issuer allocation"
    );

    // ── 2. Administrator ─────────────────────────────────────────────────────
    if !db.account_exists(&params.owner) {
        db.put_account(&Account::new(params.owner.clone()))?;
    }
    db.set_owner(&params.owner)?;
    info!(account = %params.owner, "genesis: administrator recorded");

    // ── 3. Configuration defaults ────────────────────────────────────────────
    db.set_max_unlock_iterations(DEFAULT_MAX_UNLOCK_ITERATIONS)?;

    // ── Verify supply ────────────────────────────────────────────────────────
    verify_genesis_supply(db)?;

    db.flush()?;
    info!("genesis state committed to disk");
    Ok(())
}

/// Verify that all free and locked balances sum to exactly TOTAL_SUPPLY.
fn verify_genesis_supply(db: &StateDb) -> Result<(), VestaError> {
    let total = db.ledger_total()?;
    if total != TOTAL_SUPPLY_GRANA {
        return Err(VestaError::GenesisSupplyMismatch {
            expected: TOTAL_SUPPLY_GRANA,
            got: total,
        });
    }
    info!(total_grana = total, "genesis supply verified");
    Ok(())
}
