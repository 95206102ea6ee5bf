//! # Hashing Utilities
//!
//! The two hash functions the chain's wire format touches:
//!
//! - **SHA-256** — transaction ids (truncated to 20 bytes) and the signing
//!   digest over `chain_id || transaction bytes`.
//! - **RIPEMD-160** — the four-byte checksum on textual public keys.
//!
//! Neither is our choice. Both are dictated by the chain, and both come from
//! the RustCrypto `Digest` family, so they share one calling convention.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of the input data.
///
/// # Example
///
/// ```
/// use blurt_protocol::crypto::sha256;
///
/// let hash = sha256(b"blurt");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> [u8; 32] {
    sha256_multi(&[data])
}

/// SHA-256 over several slices fed in order, without concatenating them
/// first. `sha256_multi(&[a, b]) == sha256(a ++ b)`.
pub fn sha256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Compute the RIPEMD-160 hash of the input data.
pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    let mut hasher = Ripemd160::new();
    hasher.update(data);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_known_vector() {
        assert_eq!(
            hex::encode(sha256(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn ripemd160_known_vector() {
        assert_eq!(
            hex::encode(ripemd160(b"abc")),
            "8eb208f7e05d987a9b044a8e98c6b087f15a0bfc"
        );
    }

    #[test]
    fn sha256_multi_equals_concatenation() {
        let joined = sha256(b"chain-idtx-bytes");
        let parts = sha256_multi(&[b"chain-id", b"tx-bytes"]);
        assert_eq!(joined, parts);
    }

    #[test]
    fn sha256_is_deterministic() {
        assert_eq!(sha256(b"same input"), sha256(b"same input"));
        assert_ne!(sha256(b"input a"), sha256(b"input b"));
    }
}
