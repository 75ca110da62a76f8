//! Remote data sources: blockchain transactions and IPFS content
//!
//! The inspector only talks to these traits, so tests and embedders can supply
//! their own sources. The HTTP implementations bound every call with a timeout.

use std::future::Future;

use reqwest::{Client, Url};
use tracing::debug;

use crate::errors::{FetchError, FetchResult};
use crate::types::ContentId;

pub mod explorer;
pub mod ipfs;
pub mod timeout;

pub use explorer::BlockExplorerClient;
pub use ipfs::IpfsGatewayClient;
pub use timeout::with_timeout;

/// Source of serialised blockchain transactions
pub trait TransactionSource {
    /// Hex-encoded serialised transaction with the given TXID
    fn get_transaction(&self, txid: &str) -> impl Future<Output = FetchResult<String>> + Send;
}

/// Source of content-addressed blobs
pub trait ContentSource {
    /// Raw bytes of the blob identified by `cid`
    fn get_data(&self, cid: &ContentId) -> impl Future<Output = FetchResult<Vec<u8>>> + Send;
}

pub(crate) fn build_http_client() -> FetchResult<Client> {
    Client::builder()
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .build()
        .map_err(|e| FetchError::RequestFailed {
            operation: "build HTTP client".to_string(),
            message: e.to_string(),
        })
}

/// Parse an http(s) URL as given; relative references resolve against it
/// with standard URL-join rules
pub(crate) fn parse_http_url(url: &str) -> FetchResult<Url> {
    let parsed =
        Url::parse(url.trim()).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", url, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(FetchError::InvalidUrl(format!(
            "{}: unsupported scheme '{}'",
            url, scheme
        ))),
    }
}

/// Parse an http(s) URL to be used as a directory, adding a trailing '/' so
/// relative paths are appended rather than replacing the last segment
pub(crate) fn parse_base_url(url: &str) -> FetchResult<Url> {
    let mut base = url.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }

    parse_http_url(&base)
}

/// GET `url` and return the response body; any non-2xx status is an error
pub(crate) async fn http_get(
    client: &Client,
    url: Url,
    operation: &str,
    timeout_ms: u64,
) -> FetchResult<Vec<u8>> {
    debug!("{}: GET {}", operation, url);

    with_timeout(operation, timeout_ms, async {
        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| timeout::request_error(operation, timeout_ms, e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| timeout::request_error(operation, timeout_ms, e))?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body).trim().to_string();
            let message = if text.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown status")
                    .to_string()
            } else {
                text
            };

            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body.to_vec())
    })
    .await
}
