//! # Network Module
//!
//! Read-only access to a Blurt node. Building a transaction needs two facts
//! from the chain, the reference block and the head block time, and this
//! module fetches them. Nothing here broadcasts.
//!
//! ## Architecture
//!
//! ```text
//! rpc.rs   — JSON-RPC 2.0 request/response types and the HTTP client
//! props.rs — dynamic global properties and reference-block derivation
//! ```
//!
//! ## Design Decisions
//!
//! - The client is a thin JSON-RPC layer over `reqwest`. URL parsing and
//!   HTTP framing belong to it.
//! - The timeout wraps the whole exchange, so a node that accepts the
//!   connection and then goes silent still fails on schedule.

pub mod props;
pub mod rpc;

pub use props::{get_global_properties, GlobalProperties, GLOBAL_PROPERTIES_METHOD};
pub use rpc::{parse_node_url, RemoteError, RpcClient, RpcError, RpcRequest, RpcResponse};

/// A client for the loopback test servers that ignores any proxy settings
/// in the environment.
#[cfg(test)]
pub(crate) fn local_client(url: &str, timeout: std::time::Duration) -> RpcClient {
    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    RpcClient::with_http_client(url, timeout, http).unwrap()
}

/// Serves one canned HTTP response on a random local port. Returns the URL
/// and a handle resolving to the raw request that was received.
#[cfg(test)]
pub(crate) async fn one_shot(
    response: &'static str,
) -> (String, tokio::task::JoinHandle<String>) {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/", listener.local_addr().unwrap());
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 4096];
        let mut received = Vec::new();
        // Read until the full body announced by Content-Length has arrived.
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            received.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&received);
            if let Some((head, body)) = text.split_once("\r\n\r\n") {
                let len: usize = head
                    .lines()
                    .filter_map(|l| l.split_once(':'))
                    .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, v)| v.trim().parse().ok())
                    .unwrap_or(0);
                if body.len() >= len {
                    break;
                }
            }
            if n == 0 {
                break;
            }
        }
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        String::from_utf8_lossy(&received).into_owned()
    });
    (url, handle)
}
