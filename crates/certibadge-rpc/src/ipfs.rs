//! Content-store HTTP adapter: bearer-token multipart uploads.
//!
//! Speaks the web3.storage-style API: POST `/upload` with the file as a
//! multipart part, response body carrying the resulting `cid`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use certibadge_core::{Cid, ContentStore, GatewayError, GatewayResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentStoreConfig {
    pub base_url: String,
    /// Bearer token for the upload API.
    pub api_token: String,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl ContentStoreConfig {
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_token: api_token.into(),
            timeout_ms: None,
        }
    }

    pub fn validate(&self) -> GatewayResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(GatewayError::Config("storage base_url is empty".into()));
        }
        if self.api_token.trim().is_empty() {
            return Err(GatewayError::Config("storage api_token is empty".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    cid: String,
}

pub struct HttpContentStore {
    config: ContentStoreConfig,
    http: reqwest::Client,
}

impl HttpContentStore {
    pub fn new(config: ContentStoreConfig) -> GatewayResult<Self> {
        config.validate()?;
        let timeout = Duration::from_millis(config.timeout_ms.unwrap_or(60_000));
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Config(format!("failed to build http client: {}", e)))?;
        Ok(Self { config, http })
    }

    fn upload_url(&self) -> String {
        format!("{}/upload", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ContentStore for HttpContentStore {
    async fn upload(&self, bytes: &[u8], filename: &str) -> GatewayResult<Cid> {
        let part = reqwest::multipart::Part::bytes(bytes.to_vec()).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(self.upload_url())
            .bearer_auth(&self.config.api_token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Protocol(format!("http status {}", status)));
        }

        let parsed: UploadResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Serialization(e.to_string()))?;
        debug!(filename, cid = %parsed.cid, "content uploaded");
        Ok(Cid::new(parsed.cid))
    }
}
