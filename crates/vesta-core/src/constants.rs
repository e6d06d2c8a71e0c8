/// ─── Vesta Protocol Constants ───────────────────────────────────────────────
///
/// "The ledger for value that ripens on schedule."
///
/// Total supply: 100,000,000 VST
/// Base unit:    Grana  (1 VST = 10^18 grana)
/// Ticker:       VST

// ── Supply ───────────────────────────────────────────────────────────────────

/// 1 VST expressed in grana.
pub const GRANA_PER_VST: u128 = 1_000_000_000_000_000_000;

/// Total fixed supply in VST.
pub const TOTAL_SUPPLY_VST: u128 = 100_000_000;

/// Total fixed supply in grana. Never changes after genesis.
pub const TOTAL_SUPPLY_GRANA: u128 = TOTAL_SUPPLY_VST * GRANA_PER_VST;

// ── Maturation ───────────────────────────────────────────────────────────────

/// Default ceiling on how many locked batches one maturation pass may
/// inspect. Every unlock request names its own budget; budgets above the
/// configured ceiling are rejected. Owner-mutable at runtime.
pub const DEFAULT_MAX_UNLOCK_ITERATIONS: u32 = 100;

// ── Versioning ───────────────────────────────────────────────────────────────

pub const PROTOCOL_VERSION: &str = "vesta/1.0.0";
pub const API_VERSION: &str = "1.0.0";
