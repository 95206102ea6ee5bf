//! Transaction construction via the builder pattern.
//!
//! [`TransactionBuilder`] collects the reference block, expiration and
//! operations and hands back an unsigned [`Transaction`]. The builder does
//! not encode; encoding happens on demand through [`Transaction::to_bytes`],
//! so a transaction can be built, inspected, and serialised to JSON without
//! touching the registry.

use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::assembler::encode_transaction;
use super::types::Operation;
use crate::config::{ChainId, DEFAULT_EXPIRATION_WINDOW, TIMESTAMP_FORMAT, TRANSACTION_ID_LENGTH};
use crate::crypto::hash::{sha256, sha256_multi};
use crate::network::{GlobalProperties, RpcError};
use crate::serializer::{ByteSink, EncodeError, ErrorKind};

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// An unsigned Blurt transaction.
///
/// Field names and JSON shapes match what the chain's API returns, so a
/// transaction fetched from a node deserialises directly into this type
/// (signatures, if present, are ignored).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Lower 16 bits of the reference block number.
    pub ref_block_num: u16,

    /// Bytes 4..8 of the reference block id, read as little-endian `u32`.
    pub ref_block_prefix: u32,

    /// `YYYY-MM-DDTHH:MM:SS`, UTC.
    pub expiration: String,

    pub operations: Vec<Operation>,

    #[serde(default)]
    pub extensions: Vec<String>,
}

impl Transaction {
    /// The JSON value tree the assembler consumes.
    pub fn to_value(&self) -> Result<Value, EncodeError> {
        serde_json::to_value(self).map_err(|e| ErrorKind::decode("transaction", e).into())
    }

    /// Appends the canonical encoding to `sink`.
    pub fn encode(&self, sink: &mut ByteSink) -> Result<(), EncodeError> {
        encode_transaction(sink, &self.to_value()?)
    }

    /// The canonical bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        let mut sink = ByteSink::new();
        self.encode(&mut sink)?;
        Ok(sink.into_vec())
    }

    /// Transaction id as the chain reports it: hex of the first 20 bytes of
    /// SHA-256 over the canonical bytes.
    pub fn id(&self) -> Result<String, EncodeError> {
        let digest = sha256(&self.to_bytes()?);
        Ok(hex::encode(&digest[..TRANSACTION_ID_LENGTH]))
    }

    /// SHA-256 over `chain_id ‖ bytes`. This is the message a signer signs.
    pub fn digest(&self, chain_id: &ChainId) -> Result<[u8; 32], EncodeError> {
        let bytes = self.to_bytes()?;
        Ok(sha256_multi(&[chain_id.as_bytes().as_slice(), bytes.as_slice()]))
    }
}

// ---------------------------------------------------------------------------
// TransactionBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`Transaction`].
///
/// # Example
///
/// ```
/// use blurt_protocol::transaction::{Operation, TransactionBuilder};
/// use serde_json::json;
///
/// let tx = TransactionBuilder::new()
///     .reference_block(100, 123456789)
///     .expiration("2020-01-01T00:00:00")
///     .operation(Operation::new("transfer", json!({
///         "from": "a", "to": "b", "amount": "1.000 TEST", "memo": ""
///     })))
///     .build();
///
/// assert_eq!(tx.to_bytes().unwrap().len(), 34);
/// ```
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    ref_block_num: u16,
    ref_block_prefix: u32,
    expiration: Option<String>,
    window: Duration,
    operations: Vec<Operation>,
    extensions: Vec<String>,
}

impl Default for TransactionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self {
            ref_block_num: 0,
            ref_block_prefix: 0,
            expiration: None,
            window: DEFAULT_EXPIRATION_WINDOW,
            operations: Vec::new(),
            extensions: Vec::new(),
        }
    }

    /// Seeds the reference block from the node's dynamic global properties
    /// and sets expiration to head block time plus the expiration window.
    pub fn from_global_properties(props: &GlobalProperties) -> Result<Self, RpcError> {
        let (num, prefix) = props.reference_block()?;
        let head = props.head_time()?;
        let builder = Self::new().reference_block(num, prefix);
        let expires = head + window_delta(builder.window);
        Ok(builder.expiration(format_time(&expires)))
    }

    pub fn reference_block(mut self, ref_block_num: u16, ref_block_prefix: u32) -> Self {
        self.ref_block_num = ref_block_num;
        self.ref_block_prefix = ref_block_prefix;
        self
    }

    /// Explicit expiration, `YYYY-MM-DDTHH:MM:SS`. Validated at encode time.
    pub fn expiration(mut self, expiration: impl Into<String>) -> Self {
        self.expiration = Some(expiration.into());
        self
    }

    pub fn expiration_at(self, at: DateTime<Utc>) -> Self {
        self.expiration(format_time(&at.naive_utc()))
    }

    /// Window added to the current time when no explicit expiration is set.
    pub fn expire_in(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub fn operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn operations(mut self, operations: impl IntoIterator<Item = Operation>) -> Self {
        self.operations.extend(operations);
        self
    }

    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extensions.push(extension.into());
        self
    }

    /// Builds the transaction. Without an explicit expiration, it expires
    /// `now + window`.
    pub fn build(self) -> Transaction {
        let expiration = self
            .expiration
            .unwrap_or_else(|| format_time(&(Utc::now().naive_utc() + window_delta(self.window))));
        Transaction {
            ref_block_num: self.ref_block_num,
            ref_block_prefix: self.ref_block_prefix,
            expiration,
            operations: self.operations,
            extensions: self.extensions,
        }
    }
}

fn window_delta(window: Duration) -> chrono::Duration {
    chrono::Duration::from_std(window).unwrap_or(chrono::Duration::zero())
}

fn format_time(at: &NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}
