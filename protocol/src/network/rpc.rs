//! # JSON-RPC Client
//!
//! Just enough JSON-RPC 2.0 over HTTP to read chain state from a Blurt node.
//! Requests are `POST`ed with `reqwest`; both `http://` and `https://` node
//! URLs are accepted.
//!
//! Every call runs under a deadline. When it passes, the call fails with
//! [`RpcError::Timeout`] no matter which stage (connect, write, read) was
//! still in flight.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ClientConfig;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    /// Always "2.0".
    pub jsonrpc: String,
    pub id: u64,
    /// Fully qualified method, e.g. `database_api.get_dynamic_global_properties`.
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl RpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            method: method.into(),
            params,
        }
    }
}

/// The error object a node returns in place of `result`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A JSON-RPC 2.0 response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RemoteError>,
}

// ---------------------------------------------------------------------------
// RpcError
// ---------------------------------------------------------------------------

/// Everything that can go wrong talking to a node.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("Network timeout.")]
    Timeout,

    #[error("invalid node URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("http error talking to node: {0}")]
    Http(#[from] reqwest::Error),

    #[error("node answered with HTTP status {0}")]
    HttpStatus(u16),

    #[error("malformed response from node: {0}")]
    Malformed(String),

    #[error("node returned error {}: {}", .0.code, .0.message)]
    Remote(RemoteError),

    #[error("{0}")]
    BadResponse(String),
}

/// Parses a node URL. Only `http` and `https` are accepted.
pub fn parse_node_url(url: &str) -> Result<Url, RpcError> {
    let invalid = |reason: String| RpcError::InvalidUrl {
        url: url.to_string(),
        reason,
    };
    let parsed = Url::parse(url).map_err(|e| invalid(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(invalid(format!("unsupported scheme {other:?}"))),
    }
}

// ---------------------------------------------------------------------------
// RpcClient
// ---------------------------------------------------------------------------

/// A JSON-RPC client bound to one node.
#[derive(Debug, Clone)]
pub struct RpcClient {
    http: Client,
    url: Url,
    default_timeout: Duration,
}

impl RpcClient {
    pub fn new(url: &str, default_timeout: Duration) -> Result<Self, RpcError> {
        Self::with_http_client(url, default_timeout, Client::new())
    }

    /// Uses a preconfigured `reqwest` client (proxy, TLS roots, headers).
    pub fn with_http_client(
        url: &str,
        default_timeout: Duration,
        http: Client,
    ) -> Result<Self, RpcError> {
        Ok(Self {
            http,
            url: parse_node_url(url)?,
            default_timeout,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, RpcError> {
        Self::new(&config.node, config.timeout())
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Calls `method` and returns the whole response envelope.
    ///
    /// `timeout_secs` overrides the client default. A remote `error`
    /// object is returned as [`RpcError::Remote`].
    pub async fn call(
        &self,
        method: &str,
        params: Value,
        timeout_secs: Option<u64>,
    ) -> Result<RpcResponse, RpcError> {
        let deadline = timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(self.default_timeout);
        let request = RpcRequest::new(1, method, params);

        debug!(method, node = %self.url, "rpc call");
        let response = match tokio::time::timeout(deadline, self.round_trip(&request)).await {
            Ok(result) => result,
            Err(_) => Err(RpcError::Timeout),
        }
        .map_err(|e| {
            warn!(method, error = %e, "rpc call failed");
            e
        })?;

        match response.error {
            Some(error) => Err(RpcError::Remote(error)),
            None => Ok(response),
        }
    }

    async fn round_trip(&self, request: &RpcRequest) -> Result<RpcResponse, RpcError> {
        let response = self
            .http
            .post(self.url.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::HttpStatus(status.as_u16()));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| RpcError::Malformed(e.to_string()))
    }
}
