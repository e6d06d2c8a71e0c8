use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::VestaError;

/// Balance in grana (1 VST = 10^18 grana). u128 holds the full supply of
/// 10^26 grana with room to spare.
pub type Balance = u128;

/// Unix timestamp (seconds, UTC).
pub type Timestamp = i64;

// ── AccountId ────────────────────────────────────────────────────────────────

/// 32-byte opaque account identifier. The ledger does not interpret it;
/// ownership and signing live with the external authorization layer.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(pub [u8; 32]);

impl AccountId {
    pub fn from_bytes(b: [u8; 32]) -> Self {
        Self(b)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Deterministic id derived as BLAKE3(seed). Used for dev genesis
    /// accounts and tests; real deployments supply externally minted ids.
    pub fn derived(seed: &[u8]) -> Self {
        Self(*blake3::hash(seed).as_bytes())
    }

    /// Base-58 encoded string representation.
    pub fn to_b58(&self) -> String {
        bs58::encode(&self.0).into_string()
    }

    pub fn from_b58(s: &str) -> Result<Self, VestaError> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| VestaError::InvalidAccountId(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(VestaError::InvalidAccountId(format!(
                "expected 32 bytes, got {}",
                bytes.len()
            )));
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_b58())
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", &self.to_b58()[..8])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn b58_round_trip() {
        let id = AccountId::derived(b"round-trip");
        let encoded = id.to_b58();
        assert_eq!(AccountId::from_b58(&encoded).unwrap(), id);
    }

    #[test]
    fn from_b58_rejects_wrong_length() {
        // 4-byte payload: decodes fine, wrong length.
        let short = bs58::encode(b"oops").into_string();
        assert!(matches!(
            AccountId::from_b58(&short),
            Err(VestaError::InvalidAccountId(_))
        ));
    }

    #[test]
    fn derived_is_stable() {
        assert_eq!(AccountId::derived(b"alice"), AccountId::derived(b"alice"));
        assert_ne!(AccountId::derived(b"alice"), AccountId::derived(b"bob"));
    }
}
