//! Builds a transfer, encodes it, and prints the bytes, id and digest.
//!
//! Run with:
//!   cargo run --example encode_transfer
//!
//! Pass `--node http://host:port` to reference the node's current head block
//! instead of a fixed one.

use blurt_protocol::config::ChainId;
use blurt_protocol::network::{get_global_properties, RpcClient};
use blurt_protocol::transaction::{Operation, TransactionBuilder};
use serde_json::json;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

#[tokio::main]
async fn main() -> Result<()> {
    let node = std::env::args()
        .skip_while(|arg| arg != "--node")
        .nth(1);

    let builder = match node {
        Some(url) => {
            let client = RpcClient::new(&url, std::time::Duration::from_secs(10))?;
            let props = get_global_properties(&client).await?;
            println!("head block     : {} ({})", props.head_block_number, props.time);
            TransactionBuilder::from_global_properties(&props)?
        }
        None => TransactionBuilder::new()
            .reference_block(100, 123_456_789)
            .expiration("2020-01-01T00:00:00"),
    };

    let tx = builder
        .operation(Operation::new(
            "transfer",
            json!({"from": "alice", "to": "bob", "amount": "1.000 BLURT", "memo": "hello"}),
        ))
        .build();

    println!("transaction    : {}", serde_json::to_string(&tx)?);
    println!("bytes          : {}", hex::encode(tx.to_bytes()?));
    println!("id             : {}", tx.id()?);
    println!("digest         : {}", hex::encode(tx.digest(&ChainId::default())?));
    Ok(())
}
