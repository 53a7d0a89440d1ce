//! Canonical error kind taxonomy and translation into MCP-surfaced shapes.

use serde::Serialize;
use serde_json::{json, Value};

use mcp_core::protocol::{ToolContent, ToolsCallResult};

/// The small enumerated set of failure classes the gateway ever shows a
/// caller, independent of the underlying cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    Conflict,
    Forbidden,
    Unauthenticated,
    UnsupportedCapability,
    Timeout,
    Cancelled,
    UpstreamFailure,
    Unavailable,
    MethodNotFound,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "invalid-argument",
            ErrorKind::NotFound => "not-found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::Unauthenticated => "unauthenticated",
            ErrorKind::UnsupportedCapability => "unsupported-capability",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::UpstreamFailure => "upstream-failure",
            ErrorKind::Unavailable => "unavailable",
            ErrorKind::MethodNotFound => "method-not-found",
            ErrorKind::Internal => "internal",
        }
    }
}

/// A canonical error ready to be rendered into a `tools/call` result.
#[derive(Debug, Clone)]
pub struct GatewayError {
    pub kind: ErrorKind,
    pub message: String,
    pub details: Option<Value>,
}

impl GatewayError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Render as the `tools/call` result shape from the component design:
    /// `isError: true`, a text content block, and a `structuredContent`
    /// carrying `{kind, message, details?}`.
    pub fn into_tool_result(self) -> ToolsCallResult {
        let mut structured = json!({
            "kind": self.kind.as_str(),
            "message": self.message,
        });
        if let Some(details) = self.details {
            structured["details"] = details;
        }

        ToolsCallResult {
            content: vec![ToolContent::Text {
                text: self.message,
            }],
            is_error: true,
            structured_content: Some(structured),
        }
    }
}

impl From<docker_adapter::Error> for GatewayError {
    fn from(err: docker_adapter::Error) -> Self {
        use docker_adapter::Error as AdapterError;

        match err {
            AdapterError::NotFound(message) => GatewayError::new(ErrorKind::NotFound, message),
            AdapterError::Conflict(message) => GatewayError::new(ErrorKind::Conflict, message),
            AdapterError::Forbidden(message) => GatewayError::new(ErrorKind::Forbidden, message),
            AdapterError::Timeout(duration) => {
                GatewayError::new(ErrorKind::Timeout, format!("timed out after {duration:?}"))
            }
            AdapterError::UpstreamFailure(message) => {
                GatewayError::new(ErrorKind::UpstreamFailure, message)
            }
            AdapterError::Unavailable(message) => GatewayError::new(ErrorKind::Unavailable, message),
            AdapterError::UnsupportedCapability(message) => {
                GatewayError::new(ErrorKind::UnsupportedCapability, message)
            }
            AdapterError::InvalidArgument(message) => {
                GatewayError::new(ErrorKind::InvalidArgument, message)
            }
            AdapterError::Internal(message) => GatewayError::new(ErrorKind::Internal, message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_result_carries_kind_and_message() {
        let err = GatewayError::new(ErrorKind::Conflict, "stack already deployed");
        let result = err.into_tool_result();
        assert!(result.is_error);
        let structured = result.structured_content.unwrap();
        assert_eq!(structured["kind"], "conflict");
        assert_eq!(structured["message"], "stack already deployed");
    }

    #[test]
    fn test_docker_not_found_maps_to_not_found_kind() {
        let err: GatewayError = docker_adapter::Error::NotFound("no such container".to_string()).into();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[test]
    fn test_docker_timeout_maps_to_timeout_kind() {
        let err: GatewayError =
            docker_adapter::Error::Timeout(std::time::Duration::from_millis(50)).into();
        assert_eq!(err.kind, ErrorKind::Timeout);
    }
}
