//! Block explorer client for raw transactions
//!
//! The explorer is addressed by a root URL and an endpoint template such as
//! `tx/:txid/hex`, resolved against the root with URL-join rules: a root of
//! `https://host/api/` gives `https://host/api/tx/...`, while `https://host/api`
//! gives `https://host/tx/...`. Responses may be a bare hex string or a JSON object with a
//! `hex` member.

use reqwest::{Client, Url};
use serde::Deserialize;

use super::{build_http_client, http_get, parse_http_url, TransactionSource};
use crate::config::InspectorConfig;
use crate::errors::{FetchError, FetchResult};

const TXID_PLACEHOLDER: &str = ":txid";

#[derive(Debug, Deserialize)]
struct RawTxResponse {
    hex: String,
}

#[derive(Debug, Clone)]
pub struct BlockExplorerClient {
    http: Client,
    root_url: Url,
    endpoint: String,
    timeout_ms: u64,
}

impl BlockExplorerClient {
    pub fn new(root_url: &str, endpoint: &str, timeout_ms: u64) -> FetchResult<Self> {
        let root_url = parse_http_url(root_url)?;

        if !endpoint.contains(TXID_PLACEHOLDER) {
            return Err(FetchError::InvalidUrl(format!(
                "endpoint '{}' has no '{}' placeholder",
                endpoint, TXID_PLACEHOLDER
            )));
        }

        Ok(Self {
            http: build_http_client()?,
            root_url,
            endpoint: endpoint.to_string(),
            timeout_ms,
        })
    }

    pub fn from_config(config: &InspectorConfig) -> FetchResult<Self> {
        Self::new(
            config.explorer_root_url(),
            &config.block_explorer.raw_tx_hex_endpoint,
            config.block_explorer.timeout_ms,
        )
    }

    /// Full request URL for a TXID
    pub fn tx_url(&self, txid: &str) -> FetchResult<Url> {
        if txid.is_empty() || !txid.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(FetchError::InvalidTxid {
                txid: txid.to_string(),
            });
        }

        let path = self.endpoint.replace(TXID_PLACEHOLDER, txid);
        self.root_url
            .join(&path)
            .map_err(|e| FetchError::InvalidUrl(format!("{} + {}: {}", self.root_url, path, e)))
    }
}

impl TransactionSource for BlockExplorerClient {
    async fn get_transaction(&self, txid: &str) -> FetchResult<String> {
        let url = self.tx_url(txid)?;
        let body = http_get(&self.http, url, "get raw transaction", self.timeout_ms).await?;
        parse_raw_tx_response(&body)
    }
}

/// Extract the hex-encoded transaction from an explorer response body
pub fn parse_raw_tx_response(body: &[u8]) -> FetchResult<String> {
    let text = std::str::from_utf8(body)
        .map_err(|_| FetchError::InvalidResponse("response is not UTF-8 text".to_string()))?
        .trim();

    if text.starts_with('{') {
        let response: RawTxResponse = serde_json::from_str(text)
            .map_err(|e| FetchError::InvalidResponse(format!("unexpected JSON response: {}", e)))?;
        return Ok(response.hex);
    }

    if !text.is_empty() && text.len() % 2 == 0 && text.chars().all(|c| c.is_ascii_hexdigit()) {
        return Ok(text.to_string());
    }

    Err(FetchError::InvalidResponse(
        "expected a hex-encoded transaction".to_string(),
    ))
}
