// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Blurt Transaction Tool
//!
//! Entry point for the `blurt-tx` binary. Parses CLI arguments, initializes
//! logging, and runs one subcommand:
//!
//! - `encode`     — transaction JSON → hex bytes, id, signing digest
//! - `operation`  — one operation → hex bytes
//! - `operations` — list the operation registry
//! - `props`      — read the head block from a node
//! - `version`    — print build version information

mod cli;
mod logging;

use std::io::Read;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;

use blurt_protocol::config::ClientConfig;
use blurt_protocol::network::{get_global_properties, RpcClient};
use blurt_protocol::operations::registry;
use blurt_protocol::serializer::ByteSink;
use blurt_protocol::transaction::{encode_operation, Transaction};

use cli::{BlurtTxCli, Commands};
use logging::LogFormat;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = BlurtTxCli::parse();
    logging::init_logging("blurt_tx=info,blurt_protocol=warn", LogFormat::from_flag(cli.log_json));

    match cli.command {
        Commands::Encode(args) => encode(args),
        Commands::Operation(args) => operation(args),
        Commands::Operations => {
            list_operations();
            Ok(())
        }
        Commands::Props(args) => props(args).await,
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Encodes a transaction read from a file or stdin.
fn encode(args: cli::EncodeArgs) -> Result<()> {
    let raw = match &args.file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read transaction from stdin")?;
            buf
        }
    };

    let tx: Transaction =
        serde_json::from_str(&raw).context("input is not a transaction object")?;
    let bytes = tx.to_bytes().context("failed to encode transaction")?;
    let id = tx.id()?;
    let digest = tx.digest(&args.chain_id)?;

    tracing::info!(
        operations = tx.operations.len(),
        bytes = bytes.len(),
        "transaction encoded"
    );

    println!("bytes  : {}", hex::encode(&bytes));
    println!("id     : {id}");
    println!("digest : {}", hex::encode(digest));
    Ok(())
}

/// Encodes one operation given on the command line.
fn operation(args: cli::OperationArgs) -> Result<()> {
    let payload: Value =
        serde_json::from_str(&args.payload).context("payload is not valid JSON")?;
    let mut sink = ByteSink::new();
    encode_operation(&mut sink, &args.name, &payload)
        .with_context(|| format!("failed to encode {}", args.name))?;
    println!("{}", sink.to_hex());
    Ok(())
}

fn list_operations() {
    for op in registry().iter() {
        let fields: Vec<&str> = op.fields().iter().map(|f| f.name).collect();
        println!("{:>2}  {:<30} {}", op.id(), op.name(), fields.join(", "));
    }
}

/// Fetches dynamic global properties and prints the reference block.
async fn props(args: cli::PropsArgs) -> Result<()> {
    let config = ClientConfig {
        node: args.node,
        timeout_secs: args.timeout,
        ..ClientConfig::default()
    };
    let client = RpcClient::from_config(&config)
        .with_context(|| format!("invalid node URL {}", config.node))?;
    let props = get_global_properties(&client)
        .await
        .with_context(|| format!("failed to query {}", config.node))?;
    let (ref_block_num, ref_block_prefix) = props.reference_block()?;

    println!("head_block_number : {}", props.head_block_number);
    println!("head_block_id     : {}", props.head_block_id);
    println!("time              : {}", props.time);
    println!("ref_block_num     : {ref_block_num}");
    println!("ref_block_prefix  : {ref_block_prefix}");
    Ok(())
}

fn print_version() {
    println!("blurt-tx       {}", env!("CARGO_PKG_VERSION"));
    println!("operations     {}", registry().len());
    println!("rustc          {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}
