//! Domain encoders: assets, timestamps, public keys and binary blobs.
//!
//! These are the encoders with opinions. Each one parses its input through a
//! collaborator ([`Asset`], [`PublicKey`], the `hex` crate, `chrono`) and
//! then writes a layout the chain has fixed forever.

use chrono::NaiveDateTime;
use serde_json::Value;

use super::error::ErrorKind;
use super::primitives::{length_prefix, mismatch};
use super::sink::ByteSink;
use crate::config::{ASSET_SYMBOL_WIDTH, NULL_KEY_SUFFIX, PUBLIC_KEY_LENGTH, TIMESTAMP_FORMAT};
use crate::crypto::keys::PublicKey;
use crate::transaction::types::Asset;

// ---------------------------------------------------------------------------
// Asset
// ---------------------------------------------------------------------------

/// `i64` amount in the smallest unit, one precision byte, then the symbol
/// zero-padded to seven bytes.
pub fn write_asset(sink: &mut ByteSink, value: &Value) -> Result<(), ErrorKind> {
    let asset = Asset::from_value(value).map_err(ErrorKind::from)?;
    write_asset_parts(sink, &asset);
    Ok(())
}

pub(crate) fn write_asset_parts(sink: &mut ByteSink, asset: &Asset) {
    sink.write_i64(asset.units());
    sink.write_u8(asset.precision());
    let mut symbol = [0u8; ASSET_SYMBOL_WIDTH];
    // Asset guarantees the symbol is ASCII and at most seven bytes.
    let raw = asset.symbol().as_bytes();
    symbol[..raw.len()].copy_from_slice(raw);
    sink.append(&symbol);
}

// ---------------------------------------------------------------------------
// Timestamp
// ---------------------------------------------------------------------------

/// Parses `YYYY-MM-DDTHH:MM:SS[.fff][Z]` as a UTC instant and returns whole
/// seconds since the epoch. Fractional seconds are dropped.
pub fn parse_timestamp(input: &str) -> Result<u32, ErrorKind> {
    let trimmed = input.strip_suffix('Z').unwrap_or(input);
    let base = match trimmed.split_once('.') {
        Some((base, fraction)) => {
            if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ErrorKind::decode("date", format!("{input:?}")));
            }
            base
        }
        None => trimmed,
    };

    let parsed = NaiveDateTime::parse_from_str(base, TIMESTAMP_FORMAT)
        .map_err(|e| ErrorKind::decode("date", format!("{input:?}: {e}")))?;
    let seconds = parsed.and_utc().timestamp();
    u32::try_from(seconds).map_err(|_| ErrorKind::range(input, "u32 timestamp"))
}

pub fn write_timestamp(sink: &mut ByteSink, value: &Value) -> Result<(), ErrorKind> {
    match value {
        Value::String(s) => {
            sink.write_u32(parse_timestamp(s)?);
            Ok(())
        }
        other => Err(mismatch("date string", other)),
    }
}

// ---------------------------------------------------------------------------
// Public key
// ---------------------------------------------------------------------------

/// The null key (sentinel string or JSON `null`) becomes 33 zero bytes;
/// anything else is decoded and written verbatim.
pub fn write_public_key(sink: &mut ByteSink, value: &Value) -> Result<(), ErrorKind> {
    match value {
        Value::Null => {
            sink.append(&[0u8; PUBLIC_KEY_LENGTH]);
            Ok(())
        }
        Value::String(s) if s.ends_with(NULL_KEY_SUFFIX) => {
            sink.append(&[0u8; PUBLIC_KEY_LENGTH]);
            Ok(())
        }
        Value::String(s) => {
            let key: PublicKey = s
                .parse()
                .map_err(|e| ErrorKind::decode("public key", e))?;
            sink.append(key.as_bytes());
            Ok(())
        }
        other => Err(mismatch("public key string", other)),
    }
}

// ---------------------------------------------------------------------------
// Binary
// ---------------------------------------------------------------------------

/// Decodes a hex string, or a JSON array of byte values, into raw bytes.
pub fn binary_bytes(value: &Value) -> Result<Vec<u8>, ErrorKind> {
    match value {
        Value::String(s) => hex::decode(s).map_err(|e| ErrorKind::decode("hex", e)),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_u64()
                    .and_then(|b| u8::try_from(b).ok())
                    .ok_or_else(|| ErrorKind::range(item, "u8"))
            })
            .collect(),
        other => Err(mismatch("hex string", other)),
    }
}

/// With `size`, the decoded length must match exactly and no prefix is
/// written. Without, a varint length precedes the bytes.
pub fn write_binary(
    sink: &mut ByteSink,
    size: Option<usize>,
    value: &Value,
) -> Result<(), ErrorKind> {
    let bytes = binary_bytes(value)?;
    match size {
        Some(expected) if bytes.len() != expected => {
            return Err(ErrorKind::SizeMismatch {
                expected,
                actual: bytes.len(),
            });
        }
        Some(_) => {}
        None => length_prefix(sink, bytes.len())?,
    }
    sink.append(&bytes);
    Ok(())
}
