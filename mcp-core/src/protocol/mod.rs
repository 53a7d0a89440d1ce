//! MCP protocol implementation including JSON-RPC 2.0 and MCP-specific message types

pub mod jsonrpc;
pub mod messages;

pub use jsonrpc::{JsonRpcError, JsonRpcErrorCode, JsonRpcRequest, JsonRpcResponse};
pub use messages::{
    BatchCapability, BatchItemResult, BatchRequest, BatchResult, BatchStats, ClientCapabilities,
    ClientInfo, InitializeParams, InitializeResult, McpMessage, McpMethod, PromptsCapability,
    ServerCapabilities, ServerInfo, Tool, ToolContent, ToolsCallParams, ToolsCallResult,
    ToolsCapability, ToolsListResult,
};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// MCP protocol version this server speaks by default
pub const MCP_PROTOCOL_VERSION: &str = "2025-03-26";

/// Protocol versions this server will negotiate with a client
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2024-11-05", "2025-03-26"];

/// Generate a fresh request/correlation id
pub fn generate_request_id() -> Value {
    Value::String(Uuid::new_v4().to_string())
}

/// Whether the given protocol version string is one the server supports
pub fn validate_protocol_version(version: &str) -> bool {
    SUPPORTED_PROTOCOL_VERSIONS.contains(&version)
}

/// Pick the protocol version to report back during initialize
pub fn get_protocol_version_for_client(client_version: &str) -> String {
    if SUPPORTED_PROTOCOL_VERSIONS.contains(&client_version) {
        client_version.to_string()
    } else {
        MCP_PROTOCOL_VERSION.to_string()
    }
}

/// Standard MCP methods this gateway understands
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StandardMethod {
    #[serde(rename = "initialize")]
    Initialize,
    #[serde(rename = "initialized")]
    Initialized,
    #[serde(rename = "ping")]
    Ping,
    #[serde(rename = "tools/list")]
    ToolsList,
    #[serde(rename = "tools/call")]
    ToolsCall,
    #[serde(rename = "batch")]
    Batch,
}

impl StandardMethod {
    /// Methods that may be called before `initialize` has completed
    pub fn requires_initialization(&self) -> bool {
        !matches!(self, StandardMethod::Initialize | StandardMethod::Initialized)
    }

    pub fn is_notification(&self) -> bool {
        matches!(self, StandardMethod::Initialized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negotiates_known_version() {
        assert_eq!(get_protocol_version_for_client("2024-11-05"), "2024-11-05");
        assert_eq!(get_protocol_version_for_client("bogus"), MCP_PROTOCOL_VERSION);
    }

    #[test]
    fn initialize_does_not_require_initialization() {
        assert!(!StandardMethod::Initialize.requires_initialization());
        assert!(StandardMethod::ToolsCall.requires_initialization());
    }
}
