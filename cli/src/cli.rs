//! # CLI Interface
//!
//! Defines the command-line argument structure for `blurt-tx` using
//! `clap` derive. Five subcommands: `encode`, `operation`, `operations`,
//! `props` and `version`.

use std::path::PathBuf;

use blurt_protocol::config::{ChainId, DEFAULT_RPC_NODE, DEFAULT_RPC_TIMEOUT_SECS};
use clap::{Parser, Subcommand};

/// Blurt transaction encoder.
///
/// Turns transaction JSON into the canonical bytes the chain signs and
/// verifies, and reads the chain state needed to build one.
#[derive(Parser, Debug)]
#[command(
    name = "blurt-tx",
    about = "Canonical Blurt transaction encoder",
    version,
    propagate_version = true
)]
pub struct BlurtTxCli {
    /// Log output as JSON lines instead of human-readable text.
    #[arg(long, global = true, env = "BLURT_LOG_JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Encode a transaction and print its bytes, id and signing digest.
    Encode(EncodeArgs),
    /// Encode a single operation and print its bytes.
    Operation(OperationArgs),
    /// List every registered operation with its id and fields.
    Operations,
    /// Fetch dynamic global properties and the derived reference block.
    Props(PropsArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `encode` subcommand.
#[derive(Parser, Debug)]
pub struct EncodeArgs {
    /// Transaction JSON file. Reads stdin when omitted.
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,

    /// Chain id (hex) mixed into the signing digest.
    #[arg(long, env = "BLURT_CHAIN_ID", default_value_t = ChainId::default())]
    pub chain_id: ChainId,
}

/// Arguments for the `operation` subcommand.
#[derive(Parser, Debug)]
pub struct OperationArgs {
    /// Operation name, e.g. `transfer`.
    pub name: String,

    /// Operation payload as a JSON object.
    pub payload: String,
}

/// Arguments for the `props` subcommand.
#[derive(Parser, Debug)]
pub struct PropsArgs {
    /// JSON-RPC endpoint of the node.
    #[arg(long, short = 'n', env = "BLURT_NODE", default_value = DEFAULT_RPC_NODE)]
    pub node: String,

    /// Timeout for the call, in seconds.
    #[arg(long, env = "BLURT_RPC_TIMEOUT", default_value_t = DEFAULT_RPC_TIMEOUT_SECS)]
    pub timeout: u64,
}
