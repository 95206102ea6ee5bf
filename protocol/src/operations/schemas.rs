//! Record layouts shared between operations.

use crate::serializer::{field, Encoder};

/// `{weight_threshold, account_auths, key_auths}`. Both auth maps keep the
/// caller's pair order.
pub fn authority() -> Encoder {
    Encoder::object(vec![
        field("weight_threshold", Encoder::uint32()),
        field(
            "account_auths",
            Encoder::flat_map(Encoder::String, Encoder::uint16()),
        ),
        field(
            "key_auths",
            Encoder::flat_map(Encoder::PublicKey, Encoder::uint16()),
        ),
    ])
}

pub fn beneficiary() -> Encoder {
    Encoder::object(vec![
        field("account", Encoder::String),
        field("weight", Encoder::uint16()),
    ])
}

pub fn price() -> Encoder {
    Encoder::object(vec![
        field("base", Encoder::Asset),
        field("quote", Encoder::Asset),
    ])
}

/// Witness-voted chain parameters carried by `witness_update`.
pub fn chain_properties() -> Encoder {
    Encoder::object(vec![
        field("account_creation_fee", Encoder::Asset),
        field("maximum_block_size", Encoder::uint32()),
        field("hbd_interest_rate", Encoder::uint16()),
    ])
}

pub fn signed_block_header() -> Encoder {
    Encoder::object(vec![
        field("previous", Encoder::binary(20)),
        field("timestamp", Encoder::Date),
        field("witness", Encoder::String),
        field("transaction_merkle_root", Encoder::binary(20)),
        field("extensions", void_extensions()),
        field("witness_signature", Encoder::binary(65)),
    ])
}

/// `comment_options` extensions. Branch 0 is the beneficiary list; there
/// are no other branches.
pub fn comment_options_extensions() -> Encoder {
    Encoder::array(Encoder::variant(vec![Encoder::object(vec![field(
        "beneficiaries",
        Encoder::array(beneficiary()),
    )])]))
}

/// Reserved extension slot that must stay empty.
pub fn void_extensions() -> Encoder {
    Encoder::array(Encoder::Void)
}
