//! MCP-specific message types layered on top of JSON-RPC 2.0

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};

/// Top-level MCP message, either side of the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum McpMessage {
    Request(JsonRpcRequest),
    Response(JsonRpcResponse),
}

impl McpMessage {
    pub fn is_request(&self) -> bool {
        matches!(self, McpMessage::Request(_))
    }

    pub fn is_response(&self) -> bool {
        matches!(self, McpMessage::Response(_))
    }

    pub fn id(&self) -> Option<&Value> {
        match self {
            McpMessage::Request(req) => req.id.as_ref(),
            McpMessage::Response(resp) => resp.id.as_ref(),
        }
    }
}

/// MCP method with typed parameters, used where callers want a single
/// enum to match on instead of a raw method string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum McpMethod {
    #[serde(rename = "initialize")]
    Initialize(InitializeParams),
    #[serde(rename = "initialized")]
    Initialized,
    #[serde(rename = "ping")]
    Ping,
    #[serde(rename = "tools/list")]
    ToolsList,
    #[serde(rename = "tools/call")]
    ToolsCall(ToolsCallParams),
    #[serde(untagged)]
    Custom { method: String, params: Option<Value> },
}

// === Initialize ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitializeParams {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    pub capabilities: ClientCapabilities,
    #[serde(rename = "clientInfo", skip_serializing_if = "Option::is_none")]
    pub client_info: Option<ClientInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitializeResult {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
    #[serde(flatten)]
    pub metadata: HashMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
    #[serde(flatten)]
    pub metadata: HashMap<String, Value>,
}

// === Tools ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolsListResult {
    pub tools: Vec<Tool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
    #[serde(flatten)]
    pub metadata: HashMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolsCallParams {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolsCallResult {
    pub content: Vec<ToolContent>,
    #[serde(default, rename = "isError")]
    pub is_error: bool,
    /// Structured machine-readable payload alongside the human-readable content blocks
    #[serde(default, rename = "structuredContent", skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ToolContent {
    #[serde(rename = "text")]
    Text { text: String },
}

// === Capabilities ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ClientCapabilities {
    #[serde(default)]
    pub experimental: HashMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ServerCapabilities {
    #[serde(default)]
    pub experimental: HashMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingCapability>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompts: Option<PromptsCapability>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourcesCapability>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolsCapability>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch: Option<BatchCapability>,
}

/// Unused surface, kept so the capability negotiation shape matches what
/// clients expect from an `initialize` response. This gateway never sets
/// `logging` or `resources`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingCapability {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptsCapability {
    #[serde(default, rename = "listChanged")]
    pub list_changed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourcesCapability {
    #[serde(default)]
    pub subscribe: bool,
    #[serde(default, rename = "listChanged")]
    pub list_changed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolsCapability {
    #[serde(default, rename = "listChanged")]
    pub list_changed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchCapability {
    #[serde(rename = "maxBatchSize")]
    pub max_batch_size: u32,
    #[serde(rename = "maxParallel")]
    pub max_parallel: u32,
}

// === Batch ===

/// A plain JSON-RPC batch: one security context, many independent requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRequest {
    pub items: Vec<JsonRpcRequest>,
    #[serde(default)]
    pub mode: Option<crate::server::BatchExecutionMode>,
    #[serde(default, rename = "maxParallel")]
    pub max_parallel: Option<usize>,
    /// Overall batch timeout in seconds
    #[serde(default)]
    pub timeout: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub results: Vec<BatchItemResult>,
    pub stats: BatchStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItemResult {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    #[serde(rename = "executionTimeMs")]
    pub execution_time_ms: u64,
    #[serde(default)]
    pub skipped: bool,
    #[serde(default, flatten)]
    pub metadata: HashMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchStats {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tool_serializes_with_input_schema_key() {
        let tool = Tool {
            name: "containers.list".to_string(),
            description: "List containers".to_string(),
            input_schema: json!({"type": "object"}),
            metadata: HashMap::new(),
        };
        let value = serde_json::to_value(&tool).unwrap();
        assert_eq!(value["inputSchema"]["type"], "object");
    }

    #[test]
    fn tools_call_result_roundtrip() {
        let result = ToolsCallResult {
            content: vec![ToolContent::Text { text: "ok".to_string() }],
            is_error: false,
            structured_content: Some(json!({"id": "abc"})),
        };
        let value = serde_json::to_value(&result).unwrap();
        let back: ToolsCallResult = serde_json::from_value(value).unwrap();
        assert_eq!(back, result);
    }
}
