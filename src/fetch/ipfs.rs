//! IPFS HTTP gateway client

use reqwest::{Client, Url};

use super::{build_http_client, http_get, parse_base_url, ContentSource};
use crate::config::InspectorConfig;
use crate::errors::{FetchError, FetchResult};
use crate::types::ContentId;

#[derive(Debug, Clone)]
pub struct IpfsGatewayClient {
    http: Client,
    gateway_url: Url,
    timeout_ms: u64,
}

impl IpfsGatewayClient {
    pub fn new(gateway_url: &str, timeout_ms: u64) -> FetchResult<Self> {
        Ok(Self {
            http: build_http_client()?,
            gateway_url: parse_base_url(gateway_url)?,
            timeout_ms,
        })
    }

    pub fn from_config(config: &InspectorConfig) -> FetchResult<Self> {
        Self::new(&config.ipfs_gateway.url, config.ipfs_gateway.timeout_ms)
    }

    /// Gateway URL of a blob, `<gateway>/ipfs/<cid>`
    pub fn data_url(&self, cid: &ContentId) -> FetchResult<Url> {
        self.gateway_url
            .join(&format!("ipfs/{}", cid))
            .map_err(|e| FetchError::InvalidUrl(format!("{}ipfs/{}: {}", self.gateway_url, cid, e)))
    }
}

impl ContentSource for IpfsGatewayClient {
    async fn get_data(&self, cid: &ContentId) -> FetchResult<Vec<u8>> {
        let url = self.data_url(cid)?;
        http_get(&self.http, url, "get IPFS data", self.timeout_ms).await
    }
}
