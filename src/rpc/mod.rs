//! JSON-RPC client for the Metashrew/Sandshrew indexer
//!
//! This module handles:
//! - The JSON-RPC 2.0 request/response envelope
//! - Sending requests over HTTP POST
//! - Mapping `error` objects and HTTP failures to [`ShrewError`]
//!
//! There is no retry logic: every failure goes straight back to the caller.

pub mod methods;
pub mod multicall;

use async_trait::async_trait;
use log::debug;
use reqwest::{header, Client};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::config::ClientConfig;
use crate::error::{Result, ShrewError};

pub use methods::IndexerMethods;
pub use multicall::Multicall;

/// Log output above this size is summarized
pub const MAX_LOG_SIZE: usize = 2000;

/// JSON-RPC request
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RpcRequest {
    /// Always "2.0"
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    pub params: Vec<Value>,
}

impl RpcRequest {
    pub fn new(id: u64, method: &str, params: Vec<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            method: method.to_string(),
            params,
        }
    }
}

/// JSON-RPC response
#[derive(Deserialize, Debug, Clone)]
pub struct RpcResponse {
    /// `Some(Value::Null)` when the server sent `"result": null`, `None` when
    /// the field is missing altogether
    #[serde(default, deserialize_with = "present_value")]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub id: Value,
}

fn present_value<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl RpcResponse {
    /// The result value, or the server's error
    pub fn into_result(self) -> Result<Value> {
        if let Some(error) = self.error.filter(|e| !e.is_null()) {
            return Err(remote_error_from_value(&error));
        }
        self.result
            .ok_or_else(|| ShrewError::InvalidResponse("response has neither result nor error".to_string()))
    }
}

/// Decode a response body, which must be a single JSON-RPC object
pub fn parse_response(body: &str) -> Result<RpcResponse> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| ShrewError::InvalidResponse(format!("failed to parse RPC response: {}", e)))?;
    if !value.is_object() {
        return Err(ShrewError::InvalidResponse(format!(
            "expected a JSON-RPC object, got {}",
            truncate_json_for_logging(&value)
        )));
    }
    serde_json::from_value(value)
        .map_err(|e| ShrewError::InvalidResponse(format!("failed to parse RPC response: {}", e)))
}

/// Convert a JSON-RPC `error` member into [`ShrewError::Remote`]
///
/// Accepts the standard `{code, message}` object as well as the bare strings
/// some gateways send.
pub fn remote_error_from_value(error: &Value) -> ShrewError {
    match error {
        Value::Object(map) => {
            let message = match map.get("message") {
                Some(Value::String(message)) => message.clone(),
                Some(other) => other.to_string(),
                None => error.to_string(),
            };
            let code = map.get("code").and_then(Value::as_i64);
            ShrewError::remote(message, code)
        }
        Value::String(message) => ShrewError::remote(message.clone(), None),
        other => ShrewError::remote(other.to_string(), None),
    }
}

/// Anything that can perform a JSON-RPC call
#[async_trait]
pub trait JsonRpcCaller: Send + Sync {
    /// Call `method` with positional `params` and return the `result` member
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value>;
}

/// HTTP JSON-RPC client for the indexer
pub struct RpcClient {
    /// HTTP client
    client: Client,
    config: ClientConfig,
    /// Request ID counter
    request_id: AtomicU64,
}

impl RpcClient {
    /// Create a new RPC client
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            config,
            request_id: AtomicU64::new(1),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Build the envelope for the next request
    pub fn build_request(&self, method: &str, params: Vec<Value>) -> RpcRequest {
        RpcRequest::new(self.next_request_id(), method, params)
    }

    /// Send a request and return its decoded envelope
    pub async fn send(&self, request: &RpcRequest) -> Result<RpcResponse> {
        debug!(
            "RPC request to {}: {}",
            self.config.endpoint,
            truncate_json_for_logging(&json!(request))
        );

        // The project id header is intentionally absent.
        let response = self
            .client
            .post(&self.config.endpoint)
            .header(header::CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        let parsed = parse_response(&body);
        if !status.is_success() {
            // A JSON-RPC error riding on an HTTP error status is still the
            // server's answer.
            if let Ok(RpcResponse { error: Some(error), .. }) = &parsed {
                if !error.is_null() {
                    return Err(remote_error_from_value(error));
                }
            }
            return Err(ShrewError::Transport {
                status: Some(status.as_u16()),
                body: Some(body),
                message: format!("RPC request '{}' failed", request.method),
            });
        }

        let parsed = parsed?;
        debug!(
            "RPC response for {} (id {}): {}",
            request.method,
            request.id,
            truncate_json_for_logging(&parsed.result.clone().unwrap_or(Value::Null))
        );
        Ok(parsed)
    }

    /// Get the next request ID
    fn next_request_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::SeqCst)
    }
}

#[async_trait]
impl JsonRpcCaller for RpcClient {
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value> {
        let request = self.build_request(method, params);
        self.send(&request).await?.into_result()
    }
}

/// Pretty-print a value for debug logs, summarizing large arrays and strings
pub fn truncate_json_for_logging(value: &Value) -> String {
    let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    if pretty.len() <= MAX_LOG_SIZE {
        return pretty;
    }
    let summary = summarize_for_logging(value);
    serde_json::to_string_pretty(&summary).unwrap_or_else(|_| summary.to_string())
}

fn summarize_for_logging(value: &Value) -> Value {
    match value {
        Value::Array(items) if items.len() > 10 => json!({
            "_truncated": format!("Array with {} elements", items.len()),
            "first": summarize_for_logging(&items[0]),
        }),
        Value::Array(items) => Value::Array(items.iter().map(summarize_for_logging).collect()),
        Value::String(s) if s.len() > 256 => json!({
            "_truncated": format!("String with {} chars", s.len()),
            "prefix": s.chars().take(64).collect::<String>(),
        }),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), summarize_for_logging(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}
