// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Blurt Protocol — Canonical Transaction Encoder
//!
//! Turns transactions and operations into the exact byte sequence the Blurt
//! consensus layer hashes and verifies. One wrong field order, one missing
//! length prefix, one integer a byte too wide, and the digest changes and
//! every signature over it is worthless. There is no "close enough" here.
//!
//! ## Architecture
//!
//! Leaf-first, the way the bytes actually get produced:
//!
//! - **serializer** — The byte sink plus every primitive, composite and
//!   domain encoder, expressed as one [`serializer::Encoder`] schema tree.
//! - **crypto** — Public-key decoding and the hash functions that go with it.
//! - **operations** — The immutable registry: operation name → numeric id
//!   and ordered field schema.
//! - **transaction** — Typed transactions, assets, the builder, and the
//!   transaction assembler that walks the registry.
//! - **network** — A deliberately small JSON-RPC helper for reading chain
//!   state (reference block, head time). Nothing is ever broadcast.
//! - **config** — Protocol constants and client settings.
//!
//! ## Ground rules
//!
//! 1. Bytes are append-only. Encoders never read back or rewind the sink.
//! 2. Every failure is fatal for the encode call that hit it. The partially
//!    written sink is garbage; throw it away.
//! 3. Errors carry the path that led to them (`transfer: amount: ...`).
//! 4. Nothing here signs or broadcasts. That's someone else's job.

pub mod config;
pub mod crypto;
pub mod network;
pub mod operations;
pub mod serializer;
pub mod transaction;

pub use serializer::{ByteSink, EncodeError, Encoder, ErrorKind};
pub use transaction::{encode_operation, encode_transaction, Transaction, TransactionBuilder};
