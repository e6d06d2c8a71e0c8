use serde::{Deserialize, Serialize};

/// JSON-serializable account summary returned by `vesta_getAccount`.
/// u128 amounts are decimal strings; the `_vst` fields are whole-token
/// integer divisions for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcAccount {
    pub account_id: String,
    pub free_grana: String,
    pub free_vst: String,
    pub locked_grana: String,
    pub locked_vst: String,
    pub total_grana: String,
    pub total_vst: String,
    pub queue_length: u64,
}

/// One point of an account's release curve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcReleasePoint {
    pub release_at: i64,
    pub amount_grana: String,
    pub cumulative_grana: String,
    pub matured: bool,
}

/// Result of `vesta_unlockExpired`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcUnlockSummary {
    pub released_grana: String,
    pub batches: u32,
}

/// Protocol constants returned by `vesta_getGenesisInfo`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcGenesisInfo {
    pub protocol: String,
    pub ticker: String,
    pub base_unit: String,
    /// 10^18, as a string; it does not fit JSON number precision.
    pub grana_per_vst: String,
    pub total_supply_vst: String,
    pub default_max_unlock_iterations: u32,
}

impl RpcGenesisInfo {
    pub fn current() -> Self {
        use vesta_core::constants::*;
        Self {
            protocol: "Vesta".into(),
            ticker: "VST".into(),
            base_unit: "grana".into(),
            grana_per_vst: GRANA_PER_VST.to_string(),
            total_supply_vst: TOTAL_SUPPLY_VST.to_string(),
            default_max_unlock_iterations: DEFAULT_MAX_UNLOCK_ITERATIONS,
        }
    }
}

/// Node / protocol version information returned by `vesta_getVersion`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcVersionInfo {
    pub node_version: String,
    pub protocol_version: String,
    pub api_version: String,
}
