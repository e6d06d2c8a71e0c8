use thiserror::Error;

use crate::types::Balance;

/// The reject strings for `InsufficientBalance`, `InvalidRequest` and
/// `Disabled` are part of the client-facing contract; do not reword them.
#[derive(Debug, Error)]
pub enum VestaError {
    // ── Ledger errors ────────────────────────────────────────────────────────
    #[error("Not enough tokens.")]
    InsufficientBalance { need: Balance, have: Balance },

    /// Caller-supplied unlock budget exceeds the configured ceiling.
    #[error("Wrong amount")]
    InvalidRequest { max: u32, got: u32 },

    #[error("allowance exceeded: approved {approved}, requested {requested}")]
    AllowanceExceeded { approved: Balance, requested: Balance },

    #[error("Disabled")]
    Disabled,

    #[error("caller is not the owner")]
    Unauthorized,

    // ── Encoding / identity ──────────────────────────────────────────────────
    #[error("invalid account id: {0}")]
    InvalidAccountId(String),

    // ── Serialization / storage ──────────────────────────────────────────────
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("storage error: {0}")]
    Storage(String),

    // ── Genesis ──────────────────────────────────────────────────────────────
    #[error("genesis supply mismatch: expected {expected}, got {got}")]
    GenesisSupplyMismatch { expected: u128, got: u128 },

    #[error("genesis already applied")]
    GenesisAlreadyApplied,
}
