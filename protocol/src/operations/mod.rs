//! # Operation Registry
//!
//! Every operation the chain understands, keyed by name, with its numeric
//! id and the ordered field layout of its payload.
//!
//! The table is built on first use and never changes afterwards, so
//! [`registry`] hands out a `&'static` reference that any number of threads
//! can share.
//!
//! ## Wire form
//!
//! An operation encodes as its id (varint) followed by the payload object
//! in schema field order. Input is the `[name, payload]` pair the JSON-RPC
//! API uses.
//!
//! ## Ids
//!
//! Ids are part of consensus. They run 0 to 32 with no gaps and must never
//! be renumbered; the tests pin every one of them.

pub mod schemas;

use std::collections::HashMap;
use std::sync::OnceLock;

use serde_json::Value;
use tracing::debug;

use crate::serializer::primitives::mismatch;
use crate::serializer::{field, ByteSink, EncodeError, Encoder, ErrorKind, Field};
use schemas::{authority, chain_properties, comment_options_extensions, void_extensions};

// ---------------------------------------------------------------------------
// OperationSchema
// ---------------------------------------------------------------------------

/// One registry entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationSchema {
    name: &'static str,
    id: u32,
    payload: Encoder,
}

impl OperationSchema {
    fn new(name: &'static str, id: u32, fields: Vec<Field>) -> Self {
        Self {
            name,
            id,
            payload: Encoder::object(fields),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Payload fields in wire order.
    pub fn fields(&self) -> &[Field] {
        match &self.payload {
            Encoder::Object(fields) => fields,
            _ => &[],
        }
    }

    /// Writes the id and then the payload. Failures inside the payload are
    /// prefixed with the operation name.
    pub fn encode(&self, sink: &mut ByteSink, payload: &Value) -> Result<(), EncodeError> {
        debug!(operation = self.name, id = self.id, "encoding operation");
        sink.write_varint32(self.id);
        self.payload
            .encode(sink, payload)
            .map_err(|e| e.within(self.name))
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// The immutable name → schema table.
#[derive(Debug)]
pub struct Registry {
    ordered: Vec<OperationSchema>,
    by_name: HashMap<&'static str, usize>,
}

impl Registry {
    fn from_schemas(mut ordered: Vec<OperationSchema>) -> Self {
        ordered.sort_by_key(OperationSchema::id);
        let by_name = ordered
            .iter()
            .enumerate()
            .map(|(index, schema)| (schema.name, index))
            .collect();
        Self { ordered, by_name }
    }

    pub fn lookup(&self, name: &str) -> Option<&OperationSchema> {
        self.by_name.get(name).map(|&index| &self.ordered[index])
    }

    pub fn by_id(&self, id: u32) -> Option<&OperationSchema> {
        self.ordered.iter().find(|schema| schema.id == id)
    }

    /// All entries, ordered by id.
    pub fn iter(&self) -> impl Iterator<Item = &OperationSchema> {
        self.ordered.iter()
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Encodes one named operation.
    pub fn encode_named(
        &self,
        sink: &mut ByteSink,
        name: &str,
        payload: &Value,
    ) -> Result<(), EncodeError> {
        let schema = self
            .lookup(name)
            .ok_or_else(|| ErrorKind::schema(format!("No serializer for operation: {name}")))?;
        schema.encode(sink, payload)
    }

    /// Encodes an operation given as `[name, payload]`.
    pub fn encode(&self, sink: &mut ByteSink, value: &Value) -> Result<(), EncodeError> {
        match value.as_array().map(Vec::as_slice) {
            Some([Value::String(name), payload]) => self.encode_named(sink, name, payload),
            _ => Err(mismatch("[name, payload] operation", value).into()),
        }
    }
}

/// The process-wide registry.
pub fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(|| Registry::from_schemas(operation_table()))
}

fn strings(names: &[&'static str]) -> Vec<Field> {
    names.iter().map(|&name| field(name, Encoder::String)).collect()
}

fn operation_table() -> Vec<OperationSchema> {
    use Encoder::{Asset, Bool, Date, PublicKey, String as Str};

    let op = OperationSchema::new;
    let escrow_parties = || strings(&["from", "to", "agent", "who"]);

    vec![
        op(
            "vote",
            0,
            [
                strings(&["voter", "author", "permlink"]),
                vec![field("weight", Encoder::int16())],
            ]
            .concat(),
        ),
        op(
            "comment",
            1,
            strings(&[
                "parent_author",
                "parent_permlink",
                "author",
                "permlink",
                "title",
                "body",
                "json_metadata",
            ]),
        ),
        op(
            "transfer",
            2,
            vec![
                field("from", Str),
                field("to", Str),
                field("amount", Asset),
                field("memo", Str),
            ],
        ),
        op(
            "transfer_to_vesting",
            3,
            vec![field("from", Str), field("to", Str), field("amount", Asset)],
        ),
        op(
            "withdraw_vesting",
            4,
            vec![field("account", Str), field("vesting_shares", Asset)],
        ),
        op(
            "account_create",
            5,
            vec![
                field("fee", Asset),
                field("creator", Str),
                field("new_account_name", Str),
                field("owner", authority()),
                field("active", authority()),
                field("posting", authority()),
                field("memo_key", PublicKey),
                field("json_metadata", Str),
            ],
        ),
        op(
            "account_update",
            6,
            vec![
                field("account", Str),
                field("owner", Encoder::optional(authority())),
                field("active", Encoder::optional(authority())),
                field("posting", Encoder::optional(authority())),
                field("memo_key", PublicKey),
                field("json_metadata", Str),
            ],
        ),
        op(
            "witness_update",
            7,
            vec![
                field("owner", Str),
                field("url", Str),
                field("block_signing_key", PublicKey),
                field("props", chain_properties()),
                field("fee", Asset),
            ],
        ),
        op(
            "account_witness_vote",
            8,
            vec![
                field("account", Str),
                field("witness", Str),
                field("approve", Bool),
            ],
        ),
        op("account_witness_proxy", 9, strings(&["account", "proxy"])),
        op(
            "custom",
            10,
            vec![
                field("required_auths", Encoder::array(Str)),
                field("id", Encoder::uint16()),
                field("data", Encoder::variable_binary()),
            ],
        ),
        op("delete_comment", 11, strings(&["author", "permlink"])),
        op(
            "custom_json",
            12,
            vec![
                field("required_auths", Encoder::array(Str)),
                field("required_posting_auths", Encoder::array(Str)),
                field("id", Str),
                field("json", Str),
            ],
        ),
        op(
            "comment_options",
            13,
            vec![
                field("author", Str),
                field("permlink", Str),
                field("max_accepted_payout", Asset),
                field("percent_hbd", Encoder::uint16()),
                field("allow_votes", Bool),
                field("allow_curation_rewards", Bool),
                field("extensions", comment_options_extensions()),
            ],
        ),
        op(
            "set_withdraw_vesting_route",
            14,
            vec![
                field("from_account", Str),
                field("to_account", Str),
                field("percent", Encoder::uint16()),
                field("auto_vest", Bool),
            ],
        ),
        op(
            "claim_account",
            15,
            vec![
                field("creator", Str),
                field("fee", Asset),
                field("extensions", void_extensions()),
            ],
        ),
        op(
            "create_claimed_account",
            16,
            vec![
                field("creator", Str),
                field("new_account_name", Str),
                field("owner", authority()),
                field("active", authority()),
                field("posting", authority()),
                field("memo_key", PublicKey),
                field("json_metadata", Str),
                field("extensions", void_extensions()),
            ],
        ),
        op(
            "request_account_recovery",
            17,
            vec![
                field("recovery_account", Str),
                field("account_to_recover", Str),
                field("new_owner_authority", authority()),
                field("extensions", void_extensions()),
            ],
        ),
        op(
            "recover_account",
            18,
            vec![
                field("account_to_recover", Str),
                field("new_owner_authority", authority()),
                field("recent_owner_authority", authority()),
                field("extensions", void_extensions()),
            ],
        ),
        op(
            "change_recovery_account",
            19,
            vec![
                field("account_to_recover", Str),
                field("new_recovery_account", Str),
                field("extensions", void_extensions()),
            ],
        ),
        op(
            "escrow_transfer",
            20,
            vec![
                field("from", Str),
                field("to", Str),
                field("agent", Str),
                field("escrow_id", Encoder::uint32()),
                field("hbd_amount", Asset),
                field("hive_amount", Asset),
                field("fee", Asset),
                field("ratification_deadline", Date),
                field("escrow_expiration", Date),
                field("json_meta", Str),
            ],
        ),
        op(
            "escrow_dispute",
            21,
            [escrow_parties(), vec![field("escrow_id", Encoder::uint32())]].concat(),
        ),
        op(
            "escrow_release",
            22,
            [
                escrow_parties(),
                vec![
                    field("receiver", Str),
                    field("escrow_id", Encoder::uint32()),
                    field("hbd_amount", Asset),
                    field("hive_amount", Asset),
                ],
            ]
            .concat(),
        ),
        op(
            "escrow_approve",
            23,
            [
                escrow_parties(),
                vec![
                    field("escrow_id", Encoder::uint32()),
                    field("approve", Bool),
                ],
            ]
            .concat(),
        ),
        op(
            "transfer_to_savings",
            24,
            vec![
                field("from", Str),
                field("to", Str),
                field("amount", Asset),
                field("memo", Str),
            ],
        ),
        op(
            "transfer_from_savings",
            25,
            vec![
                field("from", Str),
                field("request_id", Encoder::uint32()),
                field("to", Str),
                field("amount", Asset),
                field("memo", Str),
            ],
        ),
        op(
            "cancel_transfer_from_savings",
            26,
            vec![field("from", Str), field("request_id", Encoder::uint32())],
        ),
        op(
            "custom_binary",
            27,
            vec![
                field("required_owner_auths", Encoder::array(Str)),
                field("required_active_auths", Encoder::array(Str)),
                field("required_posting_auths", Encoder::array(Str)),
                field("required_auths", Encoder::array(authority())),
                field("id", Str),
                field("data", Encoder::variable_binary()),
            ],
        ),
        op(
            "decline_voting_rights",
            28,
            vec![field("account", Str), field("decline", Bool)],
        ),
        op(
            "reset_account",
            29,
            vec![
                field("reset_account", Str),
                field("account_to_reset", Str),
                field("new_owner_authority", authority()),
            ],
        ),
        op(
            "set_reset_account",
            30,
            strings(&["account", "current_reset_account", "reset_account"]),
        ),
        op(
            "claim_reward_balance",
            31,
            vec![
                field("account", Str),
                field("reward_blurt", Asset),
                field("reward_vests", Asset),
            ],
        ),
        op(
            "delegate_vesting_shares",
            32,
            vec![
                field("delegator", Str),
                field("delegatee", Str),
                field("vesting_shares", Asset),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    fn encode(value: Value) -> Result<Vec<u8>, EncodeError> {
        let mut sink = ByteSink::new();
        registry().encode(&mut sink, &value)?;
        Ok(sink.into_vec())
    }

    #[test]
    fn ids_are_unique_and_contiguous() {
        let ids: Vec<u32> = registry().iter().map(OperationSchema::id).collect();
        assert_eq!(ids, (0..=32).collect::<Vec<_>>());
        let names: HashSet<&str> = registry().iter().map(OperationSchema::name).collect();
        assert_eq!(names.len(), registry().len());
    }

    #[test]
    fn pinned_ids() {
        let expect = [
            ("vote", 0),
            ("comment", 1),
            ("transfer", 2),
            ("account_create", 5),
            ("account_update", 6),
            ("account_witness_proxy", 9),
            ("custom_json", 12),
            ("comment_options", 13),
            ("escrow_transfer", 20),
            ("custom_binary", 27),
            ("claim_reward_balance", 31),
            ("delegate_vesting_shares", 32),
        ];
        for (name, id) in expect {
            assert_eq!(registry().lookup(name).map(OperationSchema::id), Some(id), "{name}");
        }
        assert_eq!(registry().by_id(5).map(OperationSchema::name), Some("account_create"));
        assert!(registry().by_id(33).is_none());
    }

    #[test]
    fn field_order_matches_wire_order() {
        let transfer = registry().lookup("transfer").unwrap();
        let names: Vec<&str> = transfer.fields().iter().map(|f| f.name).collect();
        assert_eq!(names, ["from", "to", "amount", "memo"]);

        let savings = registry().lookup("transfer_from_savings").unwrap();
        let names: Vec<&str> = savings.fields().iter().map(|f| f.name).collect();
        assert_eq!(names, ["from", "request_id", "to", "amount", "memo"]);
    }

    #[test]
    fn vote_encoding() {
        let out = encode(json!(["vote", {
            "voter": "a", "author": "b", "permlink": "c", "weight": -10000
        }]))
        .unwrap();
        assert_eq!(hex::encode(out), "00016101620163f0d8");
    }

    #[test]
    fn unknown_operation_names_itself() {
        let err = encode(json!(["frobnicate", {}])).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Schema { .. }));
        assert!(err.to_string().contains("frobnicate"));
        assert_eq!(err.to_string(), "No serializer for operation: frobnicate");
    }

    #[test]
    fn malformed_operation_pair() {
        assert!(encode(json!({"type": "vote"})).is_err());
        assert!(encode(json!(["vote"])).is_err());
        assert!(encode(json!([2, {}])).is_err());
    }

    #[test]
    fn payload_errors_are_prefixed_with_operation_name() {
        let err = encode(json!(["transfer", {
            "from": "a", "to": "b", "amount": "1.000 TOOLONGSYM", "memo": ""
        }]))
        .unwrap_err();
        assert_eq!(err.path(), ["transfer", "amount"]);
        assert!(err.to_string().starts_with("transfer: amount: invalid asset"));
    }

    #[test]
    fn account_update_optionals() {
        let base = json!({
            "account": "alice",
            "memo_key": "BLT1111111111111111111111111111111114T1Anm",
            "json_metadata": "",
        });
        let out = encode(json!(["account_update", base.clone()])).unwrap();
        // id, account, three absent optionals, null memo key, empty metadata
        assert_eq!(out.len(), 1 + 6 + 3 + 33 + 1);
        assert_eq!(&out[7..10], [0, 0, 0]);

        let mut with_owner = base;
        with_owner["owner"] = json!({
            "weight_threshold": 1, "account_auths": [], "key_auths": []
        });
        let out = encode(json!(["account_update", with_owner])).unwrap();
        assert_eq!(&out[7..14], [1, 1, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn custom_json_encoding() {
        let out = encode(json!(["custom_json", {
            "required_auths": [],
            "required_posting_auths": ["alice"],
            "id": "follow",
            "json": "{}",
        }]))
        .unwrap();
        assert_eq!(hex::encode(out), "0c000105616c69636506666f6c6c6f77027b7d");
    }

    #[test]
    fn claim_account_rejects_extension_data() {
        let err = encode(json!(["claim_account", {
            "creator": "a", "fee": "0.000 BLURT", "extensions": [1]
        }]))
        .unwrap_err();
        assert_eq!(err.path(), ["claim_account", "extensions"]);
    }

    #[test]
    fn registry_is_shared() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| registry() as *const Registry as usize))
            .collect();
        let addrs: HashSet<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(addrs.len(), 1);
    }
}
