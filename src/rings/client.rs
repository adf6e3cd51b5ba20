use crate::protocol::SendBackendMessageRequest;
use crate::{Error, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Rings node RPC methods this front-end calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    ConnectPeerViaHttp,
    ConnectWithDid,
    SendBackendMessage,
    NodeInfo,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::ConnectPeerViaHttp => "connectPeerViaHttp",
            Method::ConnectWithDid => "connectWithDid",
            Method::SendBackendMessage => "sendBackendMessage",
            Method::NodeInfo => "nodeInfo",
        }
    }
}

/// Generic request surface of the P2P client.
#[async_trait]
pub trait ControlChannel: Send + Sync {
    async fn request(&self, method: Method, params: Value) -> Result<Value>;
}

/// JSON-RPC 2.0 over HTTP against a Rings node.
pub struct RingsRpcClient {
    endpoint: String,
    http: reqwest::Client,
    next_id: AtomicU64,
}

impl RingsRpcClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            http,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ControlChannel for RingsRpcClient {
    async fn request(&self, method: Method, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method.as_str(),
            "params": params,
        });

        log::debug!("Rings request #{} {} -> {}", id, method.as_str(), self.endpoint);
        let response = self
            .http
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Connection(format!("{} request failed: {}", method.as_str(), e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::Connection(format!(
                "{} failed ({}): {}",
                method.as_str(),
                status,
                error_text
            )));
        }

        let reply: Value = response.json().await?;
        parse_rpc_reply(method, reply)
    }
}

fn parse_rpc_reply(method: Method, reply: Value) -> Result<Value> {
    if let Some(error) = reply.get("error").filter(|e| !e.is_null()) {
        let code = error.get("code").and_then(Value::as_i64).unwrap_or_default();
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        return Err(Error::Connection(format!(
            "{} rejected ({}): {}",
            method.as_str(),
            code,
            message
        )));
    }
    Ok(reply.get("result").cloned().unwrap_or(Value::Null))
}

/// Asks the local node to handshake with a helper node over HTTP.
pub async fn connect_peer_via_http(channel: &dyn ControlChannel, url: &str) -> Result<Value> {
    channel
        .request(Method::ConnectPeerViaHttp, json!({ "url": url }))
        .await
}

pub async fn connect_with_did(channel: &dyn ControlChannel, did: &str) -> Result<Value> {
    channel
        .request(Method::ConnectWithDid, json!({ "did": did }))
        .await
}

pub async fn send_backend_message(
    channel: &dyn ControlChannel,
    request: &SendBackendMessageRequest,
) -> Result<Value> {
    channel
        .request(Method::SendBackendMessage, serde_json::to_value(request)?)
        .await
}

pub async fn node_info(channel: &dyn ControlChannel) -> Result<Value> {
    channel.request(Method::NodeInfo, json!({})).await
}
