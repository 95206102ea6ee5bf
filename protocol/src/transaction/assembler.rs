//! The transaction assembler.
//!
//! A transaction header is five fields in a fixed order: reference block
//! number, reference block prefix, expiration, the operation list, and the
//! extension list. The operation list is where the registry comes in.

use std::sync::OnceLock;

use serde_json::Value;
use tracing::debug;

use crate::operations::registry;
use crate::serializer::{field, ByteSink, EncodeError, Encoder};

/// Schema of a full (unsigned) transaction.
pub fn transaction_schema() -> &'static Encoder {
    static SCHEMA: OnceLock<Encoder> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Encoder::object(vec![
            field("ref_block_num", Encoder::uint16()),
            field("ref_block_prefix", Encoder::uint32()),
            field("expiration", Encoder::Date),
            field("operations", Encoder::array(Encoder::Operation)),
            field("extensions", Encoder::array(Encoder::String)),
        ])
    })
}

/// Appends one operation: its varint id, then its payload.
///
/// Fails with a schema error naming `name` when no operation of that name
/// is registered.
pub fn encode_operation(
    sink: &mut ByteSink,
    name: &str,
    payload: &Value,
) -> Result<(), EncodeError> {
    registry().encode_named(sink, name, payload)
}

/// Appends a whole transaction given as a JSON object.
///
/// On error the sink contents are undefined and must be discarded.
pub fn encode_transaction(sink: &mut ByteSink, transaction: &Value) -> Result<(), EncodeError> {
    let start = sink.len();
    transaction_schema().encode(sink, transaction)?;
    debug!(bytes = sink.len() - start, "encoded transaction");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializer::ErrorKind;
    use serde_json::json;

    fn transfer_tx() -> Value {
        json!({
            "ref_block_num": 100,
            "ref_block_prefix": 123456789,
            "expiration": "2020-01-01T00:00:00",
            "operations": [["transfer", {
                "from": "a", "to": "b", "amount": "1.000 TEST", "memo": ""
            }]],
            "extensions": [],
        })
    }

    #[test]
    fn golden_transfer() {
        let mut sink = ByteSink::new();
        encode_transaction(&mut sink, &transfer_tx()).unwrap();
        assert_eq!(
            sink.to_hex(),
            "640015cd5b0700e10b5e010201610162e80300000000000003544553540000000000"
        );
    }

    #[test]
    fn operation_alone() {
        let mut sink = ByteSink::new();
        encode_operation(
            &mut sink,
            "account_witness_proxy",
            &json!({"account": "a", "proxy": ""}),
        )
        .unwrap();
        assert_eq!(sink.as_slice(), [9, 1, b'a', 0]);
    }

    #[test]
    fn unknown_operation_is_schema_error() {
        let mut sink = ByteSink::new();
        let err = encode_operation(&mut sink, "nope", &json!({})).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Schema { .. }));
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn error_path_runs_from_transaction_to_leaf() {
        let mut tx = transfer_tx();
        tx["operations"][0][1]["amount"] = json!("1.000 TOOLONGSYM");
        let mut sink = ByteSink::new();
        let err = encode_transaction(&mut sink, &tx).unwrap_err();
        assert_eq!(err.path(), ["operations", "transfer", "amount"]);
    }

    #[test]
    fn header_fields_are_range_checked() {
        let mut tx = transfer_tx();
        tx["ref_block_num"] = json!(65536);
        let mut sink = ByteSink::new();
        let err = encode_transaction(&mut sink, &tx).unwrap_err();
        assert_eq!(err.path(), ["ref_block_num"]);
        assert!(matches!(err.kind(), ErrorKind::Range { .. }));
    }

    #[test]
    fn string_extensions_are_length_prefixed() {
        let mut tx = transfer_tx();
        tx["extensions"] = json!(["x"]);
        let mut sink = ByteSink::new();
        encode_transaction(&mut sink, &tx).unwrap();
        assert!(sink.to_hex().ends_with("010178"));
    }

    #[test]
    fn missing_operations_field() {
        let mut tx = transfer_tx();
        tx.as_object_mut().unwrap().remove("operations");
        let mut sink = ByteSink::new();
        let err = encode_transaction(&mut sink, &tx).unwrap_err();
        assert_eq!(err.to_string(), "operations: missing value");
    }
}
