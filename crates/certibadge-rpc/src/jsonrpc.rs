//! JSON-RPC 2.0 client plumbing shared by the ENS and wallet adapters.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use certibadge_core::{GatewayError, GatewayResult};

/// JSON-RPC 2.0 request envelope.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub method: String,
    pub params: Value,
    pub id: u64,
}

impl JsonRpcRequest {
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            method: method.into(),
            params,
            id: 1,
        }
    }
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

/// JSON-RPC 2.0 response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Collapse the envelope into a result value. Callers that need to
    /// inspect specific error codes (wallet denial) match on `error`
    /// before calling this.
    pub fn into_result(self) -> GatewayResult<Value> {
        if let Some(err) = self.error {
            return Err(GatewayError::Protocol(format!(
                "rpc error {}: {}",
                err.code, err.message
            )));
        }
        self.result
            .ok_or_else(|| GatewayError::Protocol("rpc response has no result".into()))
    }
}

/// Thin reqwest wrapper posting JSON-RPC envelopes to one endpoint.
#[derive(Debug, Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    url: String,
}

impl RpcClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> GatewayResult<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(GatewayError::Config("rpc url is empty".into()));
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Config(format!("failed to build http client: {}", e)))?;
        Ok(Self { http, url })
    }

    pub async fn call(&self, method: &str, params: Value) -> GatewayResult<JsonRpcResponse> {
        let request = JsonRpcRequest::new(method, params);
        let response = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Protocol(format!("http status {}", status)));
        }
        response
            .json()
            .await
            .map_err(|e| GatewayError::Serialization(e.to_string()))
    }
}
