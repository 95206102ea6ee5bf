//! # Serializer
//!
//! Everything between a JSON value tree and the bytes the chain hashes.
//!
//! ```text
//! sink.rs       — ByteSink, the append-only output buffer
//! primitives.rs — fixed-width integers, varint, bool, string
//! domain.rs     — asset, timestamp, public key, binary
//! encoder.rs    — the Encoder schema tree (array, optional, flat map,
//!                 static variant, object, operation) and its dispatch
//! error.rs      — EncodeError: an ErrorKind plus the breadcrumb path
//! ```
//!
//! ## Example
//!
//! ```
//! use blurt_protocol::serializer::{field, ByteSink, Encoder};
//! use serde_json::json;
//!
//! let beneficiary = Encoder::object(vec![
//!     field("account", Encoder::String),
//!     field("weight", Encoder::uint16()),
//! ]);
//!
//! let mut sink = ByteSink::new();
//! beneficiary
//!     .encode(&mut sink, &json!({"account": "alice", "weight": 10000}))
//!     .unwrap();
//! assert_eq!(sink.to_hex(), "05616c6963651027");
//! ```

pub mod domain;
pub mod encoder;
pub mod error;
pub mod primitives;
pub mod sink;

pub use encoder::{field, Encoder, Field};
pub use error::{EncodeError, ErrorKind};
pub use primitives::IntWidth;
pub use sink::{varint_len, ByteSink};
