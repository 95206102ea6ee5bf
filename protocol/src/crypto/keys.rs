//! # Public Keys
//!
//! Textual public keys on Blurt look like `BLT5FXGQF9Kxq6...`: a three-letter
//! address prefix followed by base58 of the 33-byte compressed secp256k1 key
//! and the first four bytes of its RIPEMD-160 hash. On the wire only the 33
//! key bytes survive.
//!
//! ## The null key
//!
//! Accounts can carry "no key". Its textual form is any prefix followed by
//! [`NULL_KEY_SUFFIX`], and it is encoded as 33 zero bytes. Recognition is by
//! suffix, before any base58 work, so the prefix never matters.
//!
//! Private keys never pass through this crate. Signing is out of scope.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use super::hash::ripemd160;
use crate::config::{
    ADDRESS_PREFIX_LENGTH, DEFAULT_ADDRESS_PREFIX, KEY_CHECKSUM_LENGTH, NULL_KEY_SUFFIX,
    PUBLIC_KEY_LENGTH,
};

/// Errors that can occur while decoding a textual public key.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("public key is too short to carry a prefix and key data")]
    TooShort,

    #[error("public key prefix {0:?} is not three ASCII letters")]
    InvalidPrefix(String),

    #[error("public key is not valid base58: {0}")]
    InvalidBase58(String),

    #[error("public key decodes to {actual} bytes, expected {expected}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("public key checksum mismatch")]
    ChecksumMismatch,

    #[error("public key is not a compressed point (leading byte 0x{0:02x})")]
    NotCompressed(u8),
}

/// A compressed secp256k1 public key, or the null key.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PublicKey {
    prefix: String,
    bytes: [u8; PUBLIC_KEY_LENGTH],
}

impl PublicKey {
    /// Wraps raw compressed key bytes under the given address prefix.
    pub fn from_bytes(
        prefix: impl Into<String>,
        bytes: [u8; PUBLIC_KEY_LENGTH],
    ) -> Result<Self, KeyError> {
        if bytes != [0u8; PUBLIC_KEY_LENGTH] && !matches!(bytes[0], 0x02 | 0x03) {
            return Err(KeyError::NotCompressed(bytes[0]));
        }
        let prefix = prefix.into();
        validate_prefix(&prefix)?;
        Ok(Self { prefix, bytes })
    }

    /// The null key under the default prefix.
    pub fn null() -> Self {
        Self {
            prefix: DEFAULT_ADDRESS_PREFIX.to_string(),
            bytes: [0u8; PUBLIC_KEY_LENGTH],
        }
    }

    pub fn is_null(&self) -> bool {
        self.bytes == [0u8; PUBLIC_KEY_LENGTH]
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The 33 bytes that go on the wire.
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.bytes
    }

    /// Same key, rendered under a different address prefix.
    pub fn with_prefix(&self, prefix: impl Into<String>) -> Result<Self, KeyError> {
        Self::from_bytes(prefix, self.bytes)
    }
}

fn validate_prefix(prefix: &str) -> Result<(), KeyError> {
    if prefix.len() == ADDRESS_PREFIX_LENGTH && prefix.bytes().all(|b| b.is_ascii_alphabetic()) {
        Ok(())
    } else {
        Err(KeyError::InvalidPrefix(prefix.to_string()))
    }
}

fn checksum(key: &[u8]) -> [u8; KEY_CHECKSUM_LENGTH] {
    let digest = ripemd160(key);
    let mut out = [0u8; KEY_CHECKSUM_LENGTH];
    out.copy_from_slice(&digest[..KEY_CHECKSUM_LENGTH]);
    out
}

impl FromStr for PublicKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() <= ADDRESS_PREFIX_LENGTH || !s.is_char_boundary(ADDRESS_PREFIX_LENGTH) {
            return Err(KeyError::TooShort);
        }
        let (prefix, encoded) = s.split_at(ADDRESS_PREFIX_LENGTH);
        validate_prefix(prefix)?;

        if s.ends_with(NULL_KEY_SUFFIX) {
            return Ok(Self {
                prefix: prefix.to_string(),
                bytes: [0u8; PUBLIC_KEY_LENGTH],
            });
        }

        let raw = bs58::decode(encoded)
            .into_vec()
            .map_err(|e| KeyError::InvalidBase58(e.to_string()))?;
        let expected = PUBLIC_KEY_LENGTH + KEY_CHECKSUM_LENGTH;
        if raw.len() != expected {
            return Err(KeyError::InvalidLength {
                expected,
                actual: raw.len(),
            });
        }

        let (key, check) = raw.split_at(PUBLIC_KEY_LENGTH);
        if checksum(key).as_slice() != check {
            return Err(KeyError::ChecksumMismatch);
        }

        let mut bytes = [0u8; PUBLIC_KEY_LENGTH];
        bytes.copy_from_slice(key);
        Self::from_bytes(prefix, bytes)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return write!(f, "{}{}", self.prefix, NULL_KEY_SUFFIX);
        }
        let mut raw = Vec::with_capacity(PUBLIC_KEY_LENGTH + KEY_CHECKSUM_LENGTH);
        raw.extend_from_slice(&self.bytes);
        raw.extend_from_slice(&checksum(&self.bytes));
        write!(f, "{}{}", self.prefix, bs58::encode(raw).into_string())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({self})")
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
