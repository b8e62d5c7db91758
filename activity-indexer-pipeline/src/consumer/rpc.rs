//! JSON-RPC event source paging `starknet_getEvents`.
use activity_indexer_shared::felt::normalize_felt;
use activity_indexer_shared::types::RawEvent;
use alloy::primitives::{keccak256, U256};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::consumer::{EventPage, EventPageRequest, EventSource};
use crate::errors::ConsumerError;

/// Selector of an event: keccak256 of its name truncated to 250 bits.
pub fn event_selector(event_name: &str) -> String {
    let mut bytes = keccak256(event_name.as_bytes()).0;
    bytes[0] &= 0x03;
    format!("0x{:x}", U256::from_be_bytes(bytes))
}

#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: &'a serde_json::Value,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    result: Option<EventsChunk>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct EventsChunk {
    events: Vec<EmittedEvent>,
    continuation_token: Option<String>,
}

#[derive(Deserialize)]
struct EmittedEvent {
    from_address: String,
    #[serde(default)]
    keys: Vec<String>,
    #[serde(default)]
    data: Vec<String>,
    block_number: Option<u64>,
    transaction_hash: String,
}

/// Production event source talking to a node's JSON-RPC endpoint.
pub struct RpcEventSource {
    url: String,
    client: ReqwestClient,
}

impl RpcEventSource {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            client: ReqwestClient::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Builds the `starknet_getEvents` params for one page.
pub fn get_events_params(request: &EventPageRequest) -> serde_json::Value {
    let mut filter = json!({
        "from_block": { "block_number": request.from_block },
        "to_block": "latest",
        "address": request.contract_address,
        "keys": [[event_selector(request.kind.event_name())]],
        "chunk_size": request.page_size,
    });
    if let Some(token) = &request.continuation_token {
        filter["continuation_token"] = json!(token);
    }
    json!({ "filter": filter })
}

#[async_trait]
impl EventSource for RpcEventSource {
    async fn fetch_page(&self, request: &EventPageRequest) -> Result<EventPage, ConsumerError> {
        let params = get_events_params(request);
        debug!(kind = %request.kind, contract = %request.contract_address, "Requesting events");

        let res = self
            .client
            .post(&self.url)
            .json(&JsonRpcRequest {
                jsonrpc: "2.0",
                id: 1,
                method: "starknet_getEvents",
                params: &params,
            })
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(ConsumerError::Transport(format!("unexpected status {status}")));
        }

        let response: JsonRpcResponse = res.json().await?;
        if let Some(error) = response.error {
            return Err(ConsumerError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        let chunk = response
            .result
            .ok_or_else(|| ConsumerError::MalformedResponse("missing result".to_string()))?;

        Ok(EventPage {
            events: chunk
                .events
                .into_iter()
                .map(|event| RawEvent {
                    kind: request.kind,
                    contract_address: normalize_felt(&event.from_address),
                    transaction_hash: normalize_felt(&event.transaction_hash),
                    block_number: event.block_number,
                    keys: event.keys,
                    data: event.data,
                })
                .collect(),
            continuation_token: chunk.continuation_token,
        })
    }
}
