//! Axum HTTP integration for the generic MCP dispatch loop
//!
//! This only covers the plain JSON-RPC request/response exchange over
//! `POST`. Session-based streaming transports are out of scope here; a
//! concrete server is free to add its own `GET`/SSE routes alongside
//! [`mcp_routes`].

use axum::{
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use std::collections::HashMap;
use tracing::debug;

use crate::{
    protocol::{JsonRpcRequest, JsonRpcResponse},
    security::{ClientContext, SecurityContext},
    server::{service::McpServer, McpServerState},
};

/// Handler state for MCP endpoints
pub trait McpHandlerState: Send + Sync + Clone + 'static {
    /// Server state implementation
    type ServerState: McpServerState;

    /// Get the MCP server instance
    fn mcp_server(&self) -> &McpServer<Self::ServerState>;

    /// Build a [`SecurityContext`] from the inbound request headers.
    ///
    /// The default implementation treats every caller as anonymous;
    /// concrete servers override this to bridge their own authenticator.
    fn create_security_context(&self, headers: &HeaderMap) -> SecurityContext {
        let user_agent = headers
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown");

        let client_context = ClientContext {
            user_agent: user_agent.to_string(),
            client_id: None,
            session_id: None,
            metadata: HashMap::new(),
        };

        SecurityContext {
            client: client_context,
            ..SecurityContext::anonymous()
        }
    }
}

/// Handle `POST` requests to the MCP endpoint (JSON-RPC request/response)
pub async fn mcp_post_handler<S>(
    State(state): State<S>,
    headers: HeaderMap,
    Json(request): Json<JsonRpcRequest>,
) -> impl IntoResponse
where
    S: McpHandlerState,
{
    debug!("MCP POST request: {} (id: {:?})", request.method, request.id);

    let security_context = state.create_security_context(&headers);
    let response = state.mcp_server().handle_request(request, security_context).await;

    Json(response).into_response()
}

/// Handle `GET` requests to the MCP endpoint. The core protocol has no
/// streaming transport, so this only ever reports method-not-allowed;
/// a concrete server can override by not mounting [`mcp_routes`] and
/// wiring its own `GET` route instead.
pub async fn mcp_get_handler<S>(State(_state): State<S>) -> impl IntoResponse
where
    S: McpHandlerState,
{
    (axum::http::StatusCode::METHOD_NOT_ALLOWED, "GET is not supported on the MCP endpoint")
}

/// Create the generic MCP routes for an Axum router
pub fn mcp_routes<S>() -> axum::Router<S>
where
    S: McpHandlerState,
{
    axum::Router::new()
        .route("/mcp", axum::routing::post(mcp_post_handler::<S>))
        .route("/mcp", axum::routing::get(mcp_get_handler::<S>))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        security::McpAuth,
        server::{config::McpServerConfig, registry::InMemoryToolRegistry},
        error::{McpResult},
    };

    #[derive(Clone)]
    struct TestHandlerState {
        server: McpServer<TestServerState>,
    }

    #[derive(Clone)]
    struct TestServerState {
        tools: InMemoryToolRegistry,
        auth: TestAuth,
    }

    #[derive(Clone)]
    struct TestAuth;

    #[async_trait::async_trait]
    impl McpAuth for TestAuth {
        async fn authenticate(&self, _client_info: &ClientContext) -> McpResult<SecurityContext> {
            Ok(SecurityContext::system())
        }

        async fn authorize(&self, _context: &SecurityContext, _resource: &str, _action: &str) -> bool {
            true
        }
    }

    impl crate::server::McpServerState for TestServerState {
        type ToolRegistry = InMemoryToolRegistry;
        type AuthManager = TestAuth;

        fn tool_registry(&self) -> &Self::ToolRegistry {
            &self.tools
        }

        fn auth_manager(&self) -> &Self::AuthManager {
            &self.auth
        }
    }

    impl McpHandlerState for TestHandlerState {
        type ServerState = TestServerState;

        fn mcp_server(&self) -> &McpServer<Self::ServerState> {
            &self.server
        }
    }

    #[tokio::test]
    async fn routes_mount_without_panicking() {
        let config = McpServerConfig::default();
        let state = TestServerState {
            tools: InMemoryToolRegistry::new(),
            auth: TestAuth,
        };
        let server = McpServer::new(config, state);
        let handler_state = TestHandlerState { server };

        let router = mcp_routes().with_state(handler_state);
        assert!(format!("{:?}", router).contains("Router"));
    }
}
