//! The schema tree.
//!
//! An [`Encoder`] describes how one JSON value becomes bytes. Leaf variants
//! map onto the primitive and domain encoders; composite variants hold their
//! child encoders, so a whole operation layout is a single tree built once
//! and walked for every value. Dispatch is always on the schema, never on the
//! shape of the incoming JSON: a value of the wrong shape is an error, not a
//! cue to try something else.

use serde_json::Value;
use tracing::trace;

use super::domain;
use super::error::{EncodeError, ErrorKind};
use super::primitives::{self, mismatch, IntWidth};
use super::sink::ByteSink;

/// One named field of an [`Encoder::Object`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub encoder: Encoder,
}

/// Shorthand for building object schemas.
pub fn field(name: &'static str, encoder: Encoder) -> Field {
    Field { name, encoder }
}

/// A node in the schema tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encoder {
    /// Placeholder for element types that must never carry data. Encoding
    /// anything through it fails.
    Void,
    /// Varint length + UTF-8 bytes.
    String,
    /// One byte, 1 or 0.
    Bool,
    /// Fixed-width little-endian integer.
    Int(IntWidth),
    /// Base-128 varint32.
    Varint,
    /// i64 amount, u8 precision, 7-byte symbol.
    Asset,
    /// u32 seconds since the epoch.
    Date,
    /// 33 compressed key bytes, zeros for the null key.
    PublicKey,
    /// Raw bytes; fixed length when `Some`, varint-prefixed when `None`.
    Binary(Option<usize>),
    /// Varint count, then each element.
    Array(Box<Encoder>),
    /// Presence byte, then the value if present.
    Optional(Box<Encoder>),
    /// Varint count, then key and value for each pair, in input order.
    FlatMap(Box<Encoder>, Box<Encoder>),
    /// Varint branch index, then the payload through that branch.
    StaticVariant(Vec<Encoder>),
    /// Declared fields in declared order.
    Object(Vec<Field>),
    /// `[name, payload]` dispatched through the operation registry.
    Operation,
}

impl Encoder {
    pub fn array(item: Encoder) -> Self {
        Self::Array(Box::new(item))
    }

    pub fn optional(value: Encoder) -> Self {
        Self::Optional(Box::new(value))
    }

    pub fn flat_map(key: Encoder, value: Encoder) -> Self {
        Self::FlatMap(Box::new(key), Box::new(value))
    }

    pub fn variant(branches: Vec<Encoder>) -> Self {
        Self::StaticVariant(branches)
    }

    pub fn object(fields: Vec<Field>) -> Self {
        Self::Object(fields)
    }

    pub fn binary(size: usize) -> Self {
        Self::Binary(Some(size))
    }

    pub fn variable_binary() -> Self {
        Self::Binary(None)
    }

    pub const fn int8() -> Self {
        Self::Int(IntWidth::I8)
    }

    pub const fn int16() -> Self {
        Self::Int(IntWidth::I16)
    }

    pub const fn int32() -> Self {
        Self::Int(IntWidth::I32)
    }

    pub const fn int64() -> Self {
        Self::Int(IntWidth::I64)
    }

    pub const fn uint8() -> Self {
        Self::Int(IntWidth::U8)
    }

    pub const fn uint16() -> Self {
        Self::Int(IntWidth::U16)
    }

    pub const fn uint32() -> Self {
        Self::Int(IntWidth::U32)
    }

    pub const fn uint64() -> Self {
        Self::Int(IntWidth::U64)
    }

    /// Appends the encoding of `value` to `sink`.
    ///
    /// On error the sink holds a partial encoding and must be discarded.
    pub fn encode(&self, sink: &mut ByteSink, value: &Value) -> Result<(), EncodeError> {
        match self {
            Self::Void => Err(ErrorKind::schema("Void can not be serialized").into()),
            Self::String => Ok(primitives::write_string(sink, value)?),
            Self::Bool => Ok(primitives::write_bool(sink, value)?),
            Self::Int(width) => Ok(primitives::write_int(sink, *width, value)?),
            Self::Varint => Ok(primitives::write_varint(sink, value)?),
            Self::Asset => Ok(domain::write_asset(sink, value)?),
            Self::Date => Ok(domain::write_timestamp(sink, value)?),
            Self::PublicKey => Ok(domain::write_public_key(sink, value)?),
            Self::Binary(size) => Ok(domain::write_binary(sink, *size, value)?),
            Self::Array(item) => encode_array(sink, item, value),
            Self::Optional(inner) => {
                // Reached with a value in hand, so it is present. Absence is
                // only expressible as a missing object field.
                sink.write_u8(1);
                inner.encode(sink, value)
            }
            Self::FlatMap(key, val) => encode_flat_map(sink, key, val, value),
            Self::StaticVariant(branches) => encode_variant(sink, branches, value),
            Self::Object(fields) => encode_object(sink, fields, value),
            Self::Operation => crate::operations::registry().encode(sink, value),
        }
    }

    /// Convenience: encodes `value` into a fresh buffer.
    pub fn to_bytes(&self, value: &Value) -> Result<Vec<u8>, EncodeError> {
        let mut sink = ByteSink::new();
        self.encode(&mut sink, value)?;
        Ok(sink.into_vec())
    }
}

fn encode_array(sink: &mut ByteSink, item: &Encoder, value: &Value) -> Result<(), EncodeError> {
    let items = value.as_array().ok_or_else(|| mismatch("array", value))?;
    primitives::length_prefix(sink, items.len())?;
    for element in items {
        item.encode(sink, element)?;
    }
    Ok(())
}

fn encode_flat_map(
    sink: &mut ByteSink,
    key: &Encoder,
    val: &Encoder,
    value: &Value,
) -> Result<(), EncodeError> {
    let pairs = value
        .as_array()
        .ok_or_else(|| mismatch("array of [key, value] pairs", value))?;
    primitives::length_prefix(sink, pairs.len())?;
    for pair in pairs {
        match pair.as_array().map(Vec::as_slice) {
            Some([k, v]) => {
                key.encode(sink, k)?;
                val.encode(sink, v)?;
            }
            _ => return Err(mismatch("[key, value] pair", pair).into()),
        }
    }
    Ok(())
}

fn encode_variant(
    sink: &mut ByteSink,
    branches: &[Encoder],
    value: &Value,
) -> Result<(), EncodeError> {
    let (tag, payload) = match value.as_array().map(Vec::as_slice) {
        Some([tag, payload]) => (tag, payload),
        _ => return Err(mismatch("[index, payload] pair", value).into()),
    };
    let index = primitives::integer(tag)?;
    let branch = usize::try_from(index)
        .ok()
        .and_then(|i| branches.get(i))
        .ok_or_else(|| {
            ErrorKind::schema(format!(
                "variant index {index} out of range ({} variants)",
                branches.len()
            ))
        })?;
    primitives::write_varint(sink, tag)?;
    branch.encode(sink, payload)
}

fn encode_object(sink: &mut ByteSink, fields: &[Field], value: &Value) -> Result<(), EncodeError> {
    let object = value.as_object().ok_or_else(|| mismatch("object", value))?;
    for Field { name, encoder } in fields {
        trace!(field = name, "encoding field");
        let result = match (object.get(*name), encoder) {
            (None, Encoder::Optional(_)) => {
                sink.write_u8(0);
                Ok(())
            }
            (None, _) => Err(ErrorKind::schema("missing value").into()),
            (Some(v), enc) => enc.encode(sink, v),
        };
        result.map_err(|e| e.within(*name))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bytes(encoder: &Encoder, value: Value) -> Vec<u8> {
        encoder.to_bytes(&value).unwrap()
    }

    #[test]
    fn void_always_fails() {
        let err = Encoder::Void.to_bytes(&json!(null)).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Schema { .. }));
        assert_eq!(err.to_string(), "Void can not be serialized");
    }

    #[test]
    fn empty_void_array_is_fine() {
        assert_eq!(bytes(&Encoder::array(Encoder::Void), json!([])), [0]);
        assert!(Encoder::array(Encoder::Void).to_bytes(&json!([1])).is_err());
    }

    #[test]
    fn array_preserves_order_and_duplicates() {
        let enc = Encoder::array(Encoder::uint8());
        assert_eq!(bytes(&enc, json!([3, 1, 3])), [3, 3, 1, 3]);
    }

    #[test]
    fn optional_distinguishes_missing_from_present() {
        let enc = Encoder::object(vec![field("memo", Encoder::optional(Encoder::String))]);
        assert_eq!(bytes(&enc, json!({})), [0]);
        assert_eq!(bytes(&enc, json!({"memo": "hi"})), [1, 2, b'h', b'i']);
        // null is a value, and a string encoder won't take it.
        assert!(enc.to_bytes(&json!({"memo": null})).is_err());
    }

    #[test]
    fn optional_public_key_accepts_explicit_null() {
        let enc = Encoder::object(vec![field("key", Encoder::optional(Encoder::PublicKey))]);
        let out = bytes(&enc, json!({"key": null}));
        assert_eq!(out.len(), 34);
        assert_eq!(out[0], 1);
    }

    #[test]
    fn flat_map_keeps_duplicates_and_order() {
        let enc = Encoder::flat_map(Encoder::String, Encoder::uint16());
        let out = bytes(&enc, json!([["b", 1], ["a", 2], ["b", 3]]));
        assert_eq!(
            out,
            [3, 1, b'b', 1, 0, 1, b'a', 2, 0, 1, b'b', 3, 0]
        );
    }

    #[test]
    fn flat_map_rejects_malformed_pairs() {
        let enc = Encoder::flat_map(Encoder::String, Encoder::uint16());
        assert!(enc.to_bytes(&json!([["a"]])).is_err());
        assert!(enc.to_bytes(&json!({"a": 1})).is_err());
    }

    #[test]
    fn static_variant_uses_caller_index() {
        let enc = Encoder::variant(vec![Encoder::uint8(), Encoder::String]);
        assert_eq!(bytes(&enc, json!([0, 7])), [0, 7]);
        assert_eq!(bytes(&enc, json!([1, "x"])), [1, 1, b'x']);
    }

    #[test]
    fn static_variant_index_out_of_range() {
        let enc = Encoder::variant(vec![Encoder::uint8()]);
        let err = enc.to_bytes(&json!([1, 7])).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Schema { .. }));
        assert!(err.to_string().contains("out of range"));
        assert!(enc.to_bytes(&json!([-1, 7])).is_err());
    }

    #[test]
    fn object_follows_schema_order_not_input_order() {
        let enc = Encoder::object(vec![
            field("first", Encoder::uint8()),
            field("second", Encoder::uint8()),
        ]);
        let out = bytes(&enc, json!({"second": 2, "first": 1, "extra": 9}));
        assert_eq!(out, [1, 2]);
    }

    #[test]
    fn object_errors_carry_field_path() {
        let enc = Encoder::object(vec![field(
            "owner",
            Encoder::object(vec![field("weight_threshold", Encoder::uint32())]),
        )]);
        let err = enc
            .to_bytes(&json!({"owner": {"weight_threshold": -1}}))
            .unwrap_err();
        assert_eq!(err.path(), ["owner", "weight_threshold"]);
        assert!(err.to_string().starts_with("owner: weight_threshold: "));
    }

    #[test]
    fn missing_required_field_is_a_schema_error() {
        let enc = Encoder::object(vec![field("to", Encoder::String)]);
        let err = enc.to_bytes(&json!({})).unwrap_err();
        assert_eq!(err.to_string(), "to: missing value");
    }

    #[test]
    fn array_errors_propagate_without_partial_success() {
        let enc = Encoder::array(Encoder::uint8());
        let mut sink = ByteSink::new();
        assert!(enc.encode(&mut sink, &json!([1, 300])).is_err());
    }
}
