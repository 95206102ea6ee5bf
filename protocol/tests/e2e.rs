//! End-to-end tests for the Blurt encoder.
//!
//! The expected byte strings are captured regression vectors: encodings of
//! fixed inputs recorded once and pinned here, so any change to the wire
//! format shows up as a failure.

use std::thread;

use serde_json::{json, Value};

use blurt_protocol::config::ChainId;
use blurt_protocol::crypto::keys::PublicKey;
use blurt_protocol::operations::registry;
use blurt_protocol::operations::schemas::signed_block_header;
use blurt_protocol::serializer::{ByteSink, ErrorKind};
use blurt_protocol::transaction::{
    encode_operation, encode_transaction, Operation, Transaction, TransactionBuilder,
};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

const KEY: &str = "BLT5FXGQF9Kxq6kZAM62Wm5o2mN8CKkm5z3cB2dGEpveCfSUnDNbH";
const KEY_HEX: &str = "022fc208f09407c9e4c956b44a67131e5db19cc8b85c1b97da09278ae991a67f3e";
const TRANSFER_TX_HEX: &str = "640015cd5b0700e10b5e010201610162e80300000000000003544553540000000000";

fn transfer_tx() -> Value {
    json!({
        "ref_block_num": 100,
        "ref_block_prefix": 123456789,
        "expiration": "2020-01-01T00:00:00",
        "operations": [["transfer", {"from": "a", "to": "b", "amount": "1.000 TEST", "memo": ""}]],
        "extensions": []
    })
}

fn encode_tx(value: &Value) -> Result<String, blurt_protocol::EncodeError> {
    let mut sink = ByteSink::new();
    encode_transaction(&mut sink, value)?;
    Ok(sink.to_hex())
}

fn encode_op(name: &str, payload: Value) -> Result<String, blurt_protocol::EncodeError> {
    let mut sink = ByteSink::new();
    encode_operation(&mut sink, name, &payload)?;
    Ok(sink.to_hex())
}

fn authority() -> Value {
    json!({"weight_threshold": 1, "account_auths": [], "key_auths": [[KEY, 1]]})
}

// ---------------------------------------------------------------------------
// Golden vectors
// ---------------------------------------------------------------------------

#[test]
fn transfer_transaction_golden_vector() {
    assert_eq!(encode_tx(&transfer_tx()).unwrap(), TRANSFER_TX_HEX);
}

#[test]
fn typed_and_untyped_paths_agree() {
    let typed: Transaction = serde_json::from_value(transfer_tx()).unwrap();
    assert_eq!(hex::encode(typed.to_bytes().unwrap()), TRANSFER_TX_HEX);

    let built = TransactionBuilder::new()
        .reference_block(100, 123_456_789)
        .expiration("2020-01-01T00:00:00")
        .operation(Operation::new(
            "transfer",
            json!({"from": "a", "to": "b", "amount": "1.000 TEST", "memo": ""}),
        ))
        .build();
    assert_eq!(built, typed);
}

#[test]
fn transaction_id_and_digest() {
    let tx: Transaction = serde_json::from_value(transfer_tx()).unwrap();
    assert_eq!(tx.id().unwrap(), "1566a61e015ec22656938213f5d038e13893057a");
    assert_eq!(
        hex::encode(tx.digest(&ChainId::default()).unwrap()),
        "9ca6117d0c1f2e99a99e6dc05d929aec4e39669375c191df0c81dbeb75efbfe7"
    );
}

#[test]
fn account_create_with_keys() {
    let out = encode_op(
        "account_create",
        json!({
            "fee": "10.000 BLURT",
            "creator": "alice",
            "new_account_name": "bob",
            "owner": authority(),
            "active": authority(),
            "posting": authority(),
            "memo_key": KEY,
            "json_metadata": ""
        }),
    )
    .unwrap();
    let auth = format!("0100000000 01{KEY_HEX}0100");
    let expected = format!(
        "05 102700000000000003424c5552540000 05616c696365 03626f62 {auth}{auth}{auth} {KEY_HEX} 00"
    )
    .replace(' ', "");
    assert_eq!(out, expected);
}

#[test]
fn comment_options_with_beneficiaries() {
    let out = encode_op(
        "comment_options",
        json!({
            "author": "alice",
            "permlink": "post",
            "max_accepted_payout": "1000000.000 BLURT",
            "percent_hbd": 10000,
            "allow_votes": true,
            "allow_curation_rewards": true,
            "extensions": [[0, {"beneficiaries": [
                {"account": "bob", "weight": 2500},
                {"account": "carol", "weight": 500}
            ]}]]
        }),
    )
    .unwrap();
    assert_eq!(
        out,
        "0d05616c69636504706f737400ca9a3b0000000003424c55525400001027010101000203626f62c409056361726f6cf401"
    );
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[test]
fn input_key_order_does_not_matter() {
    let shuffled = json!({
        "extensions": [],
        "operations": [["transfer", {"memo": "", "amount": "1.000 TEST", "to": "b", "from": "a"}]],
        "expiration": "2020-01-01T00:00:00",
        "ref_block_prefix": 123456789,
        "ref_block_num": 100
    });
    assert_eq!(encode_tx(&shuffled).unwrap(), TRANSFER_TX_HEX);
}

#[test]
fn encoding_is_deterministic_across_threads() {
    let handles: Vec<_> = (0..8)
        .map(|_| thread::spawn(|| encode_tx(&transfer_tx()).unwrap()))
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), TRANSFER_TX_HEX);
    }
}

#[test]
fn public_key_round_trip_through_text() {
    let key: PublicKey = KEY.parse().unwrap();
    assert_eq!(hex::encode(key.as_bytes()), KEY_HEX);
    assert_eq!(key.to_string(), KEY);
}

#[test]
fn null_key_in_witness_update() {
    let payload = json!({
        "owner": "w",
        "url": "",
        "block_signing_key": "BLT1111111111111111111111111111111114T1Anm",
        "props": {
            "account_creation_fee": "1.000 BLURT",
            "maximum_block_size": 65536,
            "hbd_interest_rate": 0
        },
        "fee": "0.000 BLURT"
    });
    let out = hex::decode(encode_op("witness_update", payload).unwrap()).unwrap();
    // id, "w", "", then the key
    assert_eq!(&out[..4], [7, 1, b'w', 0]);
    assert_eq!(&out[4..37], [0u8; 33]);
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn unknown_operation_inside_transaction() {
    let mut tx = transfer_tx();
    tx["operations"] = json!([["transfer_everything", {}]]);
    let err = encode_tx(&tx).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Schema { .. }));
    assert_eq!(
        err.to_string(),
        "operations: No serializer for operation: transfer_everything"
    );
}

#[test]
fn bad_checksum_key_names_the_field() {
    let mut bad = authority();
    bad["key_auths"] = json!([["BLT5FXGQF9Kxq6kZAM62Wm5o2mN8CKkm5z3cB2dGEpveCfSUohMsd", 1]]);
    let err = encode_op(
        "request_account_recovery",
        json!({
            "recovery_account": "r",
            "account_to_recover": "a",
            "new_owner_authority": bad,
            "extensions": []
        }),
    )
    .unwrap_err();
    assert_eq!(
        err.path(),
        ["request_account_recovery", "new_owner_authority", "key_auths"]
    );
    assert!(matches!(
        err.kind(),
        ErrorKind::Decode {
            what: "public key",
            ..
        }
    ));
}

#[test]
fn fixed_binary_size_mismatch() {
    let header = json!({
        "previous": "ab".repeat(19),
        "timestamp": "2020-01-01T00:00:00",
        "witness": "w",
        "transaction_merkle_root": "00".repeat(20),
        "extensions": [],
        "witness_signature": "00".repeat(65)
    });
    let err = signed_block_header().to_bytes(&header).unwrap_err();
    assert_eq!(
        err.to_string(),
        "previous: Unable to serialize binary. Expected 20 bytes, got 19"
    );
}

#[test]
fn amount_overflow_is_a_range_error() {
    let err = encode_op(
        "transfer",
        json!({"from": "a", "to": "b", "amount": "99999999999999999999.000 TEST", "memo": ""}),
    )
    .unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Range { .. }));
    assert_eq!(err.dotted_path(), "transfer.amount");
}

#[test]
fn registry_lists_every_operation() {
    assert_eq!(registry().len(), 33);
    assert!(registry().iter().all(|op| !op.fields().is_empty()));
}
