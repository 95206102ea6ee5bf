//! # Cryptographic Primitives
//!
//! Just enough cryptography to encode a transaction and name it: decoding
//! textual public keys into their 33 wire bytes, and the hashes used for
//! key checksums, transaction ids and signing digests.
//!
//! No signing, no private keys. If you find yourself wanting to add either
//! here, you are in the wrong crate.

pub mod hash;
pub mod keys;

pub use hash::{ripemd160, sha256, sha256_multi};
pub use keys::{KeyError, PublicKey};
