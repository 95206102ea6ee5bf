//! # Protocol Configuration & Constants
//!
//! Every wire-format constant the encoder depends on lives here, next to the
//! handful of client settings (RPC node, timeout, address prefix, chain id)
//! that callers are allowed to change. The wire constants are not settings:
//! they are dictated by the chain, and changing one produces bytes no node
//! will accept.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

/// Compressed secp256k1 public keys are always 33 bytes on the wire.
pub const PUBLIC_KEY_LENGTH: usize = 33;

/// Length of the RIPEMD-160 checksum appended to encoded public keys.
pub const KEY_CHECKSUM_LENGTH: usize = 4;

/// Number of characters in a public key's textual prefix (`BLT`, `STM`, ...).
pub const ADDRESS_PREFIX_LENGTH: usize = 3;

/// Tail shared by every spelling of the null key. Whatever the prefix, a key
/// ending in this string encodes to [`PUBLIC_KEY_LENGTH`] zero bytes.
pub const NULL_KEY_SUFFIX: &str = "1111111111111111111111111111111114T1Anm";

/// Asset symbols occupy exactly seven bytes, zero-padded.
pub const ASSET_SYMBOL_WIDTH: usize = 7;

/// Largest asset precision accepted. 10^18 is the largest power of ten that
/// still fits in an `i64`.
pub const MAX_ASSET_PRECISION: u8 = 18;

/// Native symbols and the only precision the chain accepts for each.
pub const NATIVE_ASSETS: &[(&str, u8)] = &[("BLURT", 3), ("VESTS", 6)];

/// Length of a chain id in bytes.
pub const CHAIN_ID_LENGTH: usize = 32;

/// Timestamp format used on the JSON side of the wire. Always UTC, never
/// carries an offset.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Transaction ids are the first 20 bytes of SHA-256 over the encoded bytes.
pub const TRANSACTION_ID_LENGTH: usize = 20;

// ---------------------------------------------------------------------------
// Client defaults
// ---------------------------------------------------------------------------

/// Address prefix used when rendering keys back to text.
pub const DEFAULT_ADDRESS_PREFIX: &str = "BLT";

/// Blurt mainnet chain id.
pub const DEFAULT_CHAIN_ID: &str =
    "cd8d90f29ae273abec3eaa7731e25934c63eb654d55080caff2ebb7f5df6381f";

/// Default JSON-RPC endpoint. A local node; the helper speaks plain HTTP.
pub const DEFAULT_RPC_NODE: &str = "http://127.0.0.1:8091";

/// Default RPC timeout, in seconds.
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 10;

/// How far past the head block time a freshly built transaction expires.
pub const DEFAULT_EXPIRATION_WINDOW: Duration = Duration::from_secs(60);

// ---------------------------------------------------------------------------
// ChainId
// ---------------------------------------------------------------------------

/// Errors from parsing a chain id.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChainIdError {
    #[error("chain id is not valid hex: {0}")]
    InvalidHex(String),

    #[error("chain id must be {expected} bytes, got {actual}")]
    WrongLength { expected: usize, actual: usize },
}

/// The 32-byte chain id prepended to transaction bytes before hashing for a
/// signature. Different chains, different ids, so a signature never replays
/// across networks.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId([u8; CHAIN_ID_LENGTH]);

impl ChainId {
    pub fn new(bytes: [u8; CHAIN_ID_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; CHAIN_ID_LENGTH] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl Default for ChainId {
    fn default() -> Self {
        // The constant is checked by `default_chain_id_parses` below.
        DEFAULT_CHAIN_ID.parse().unwrap_or(Self([0u8; CHAIN_ID_LENGTH]))
    }
}

impl FromStr for ChainId {
    type Err = ChainIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| ChainIdError::InvalidHex(e.to_string()))?;
        let arr: [u8; CHAIN_ID_LENGTH] =
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| ChainIdError::WrongLength {
                    expected: CHAIN_ID_LENGTH,
                    actual: bytes.len(),
                })?;
        Ok(Self(arr))
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChainId({})", self.to_hex())
    }
}

impl Serialize for ChainId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ChainId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// ClientConfig
// ---------------------------------------------------------------------------

/// Settings for talking to a node and presenting results.
///
/// None of these affect the encoded bytes of a transaction. The chain id only
/// enters the signing digest, and the address prefix only matters when keys
/// are rendered back to text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// JSON-RPC endpoint (`http://` or `https://`).
    pub node: String,
    /// Per-call RPC timeout, in seconds.
    pub timeout_secs: u64,
    /// Prefix for rendering public keys.
    pub address_prefix: String,
    /// Chain id mixed into signing digests.
    pub chain_id: ChainId,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            node: DEFAULT_RPC_NODE.to_string(),
            timeout_secs: DEFAULT_RPC_TIMEOUT_SECS,
            address_prefix: DEFAULT_ADDRESS_PREFIX.to_string(),
            chain_id: ChainId::default(),
        }
    }
}

impl ClientConfig {
    /// The RPC timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_chain_id_parses() {
        let id: ChainId = DEFAULT_CHAIN_ID.parse().unwrap();
        assert_eq!(id.to_hex(), DEFAULT_CHAIN_ID);
        assert_eq!(ChainId::default(), id);
    }

    #[test]
    fn chain_id_rejects_wrong_length() {
        let err = "abcd".parse::<ChainId>().unwrap_err();
        assert_eq!(
            err,
            ChainIdError::WrongLength {
                expected: 32,
                actual: 2
            }
        );
    }

    #[test]
    fn chain_id_rejects_bad_hex() {
        assert!(matches!(
            "zz".parse::<ChainId>(),
            Err(ChainIdError::InvalidHex(_))
        ));
    }

    #[test]
    fn null_key_suffix_is_base58() {
        // The sentinel must be spellable in base58 or no real key could end with it.
        assert!(bs58::decode(NULL_KEY_SUFFIX).into_vec().is_ok());
    }

    #[test]
    fn precision_bound_fits_i64() {
        assert!(10i64.checked_pow(MAX_ASSET_PRECISION as u32).is_some());
        assert!(10i64
            .checked_pow(MAX_ASSET_PRECISION as u32 + 1)
            .is_none());
    }

    #[test]
    fn client_config_deserializes_with_defaults() {
        let cfg: ClientConfig = serde_json::from_str(r#"{"timeout_secs": 3}"#).unwrap();
        assert_eq!(cfg.timeout_secs, 3);
        assert_eq!(cfg.node, DEFAULT_RPC_NODE);
        assert_eq!(cfg.timeout(), Duration::from_secs(3));
        assert_eq!(cfg.chain_id, ChainId::default());
    }
}
