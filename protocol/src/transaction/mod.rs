//! # Transaction Module
//!
//! Typed transactions and the assembler that turns them into canonical
//! bytes.
//!
//! ## Architecture
//!
//! ```text
//! types.rs     — Asset (exact decimal amount) and Operation ([name, payload])
//! assembler.rs — encode_operation / encode_transaction over raw JSON values
//! builder.rs   — Transaction, its id and signing digest, TransactionBuilder
//! ```
//!
//! ## Transaction Layout
//!
//! 1. `ref_block_num` — u16
//! 2. `ref_block_prefix` — u32
//! 3. `expiration` — u32 seconds since the epoch
//! 4. `operations` — varint count, then each operation (varint id + payload)
//! 5. `extensions` — varint count, then each string
//!
//! Signatures are not part of the encoding. The digest a signer would sign
//! is `sha256(chain_id ‖ bytes)`, available as [`Transaction::digest`].

pub mod assembler;
pub mod builder;
pub mod types;

pub use assembler::{encode_operation, encode_transaction, transaction_schema};
pub use builder::{Transaction, TransactionBuilder};
pub use types::{Asset, AssetError, Operation};
