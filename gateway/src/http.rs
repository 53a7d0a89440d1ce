//! Axum wiring: the authenticated `/mcp` surface plus the two public
//! health endpoints, request-id stamping, and the request-size ceiling.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use uuid::Uuid;

use docker_adapter::DockerClient;
use mcp_core::{
    axum_integration::{mcp_routes, McpHandlerState},
    security::SecurityContext,
    server::McpServer,
};

use crate::auth::{require_auth, Authenticator};
use crate::config::GatewayConfig;
use crate::state::GatewayState;

const REQUEST_ID_HEADER: &str = "x-request-id";
const HEALTH_DEADLINE: Duration = Duration::from_secs(2);

#[derive(Clone)]
pub struct GatewayHandlerState {
    server: Arc<McpServer<GatewayState>>,
}

impl McpHandlerState for GatewayHandlerState {
    type ServerState = GatewayState;

    fn mcp_server(&self) -> &McpServer<Self::ServerState> {
        &self.server
    }

    /// Real authentication already happened in [`require_auth`], which
    /// runs as Axum middleware strictly before this handler is reached.
    /// Every request that gets here is treated as a fully trusted system
    /// caller so mcp-core's own initialization gate never blocks it.
    fn create_security_context(&self, _headers: &axum::http::HeaderMap) -> SecurityContext {
        SecurityContext::system()
    }
}

#[derive(Clone)]
struct HealthState {
    docker: Arc<DockerClient>,
}

async fn health_handler(State(state): State<HealthState>) -> impl IntoResponse {
    match state.docker.capabilities(HEALTH_DEADLINE).await {
        Ok(caps) => Json(json!({
            "status": "ok",
            "daemon_reachable": true,
            "swarm_manager": caps.swarm_manager,
        }))
        .into_response(),
        Err(_) => Json(json!({
            "status": "degraded",
            "daemon_reachable": false,
            "swarm_manager": false,
        }))
        .into_response(),
    }
}

async fn stamp_request_id(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    request.extensions_mut().insert(request_id.clone());

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

async fn fallback_not_found() -> impl IntoResponse {
    StatusCode::NOT_FOUND
}

pub fn build_router(
    server: Arc<McpServer<GatewayState>>,
    docker: Arc<DockerClient>,
    config: &GatewayConfig,
) -> Router {
    let handler_state = GatewayHandlerState { server };
    let authenticator = Authenticator::new(config.access_token.clone());

    let mcp = mcp_routes::<GatewayHandlerState>()
        .with_state(handler_state)
        .layer(middleware::from_fn_with_state(authenticator, require_auth))
        .layer(axum::extract::DefaultBodyLimit::max(config.max_request_bytes));

    let health = Router::new()
        .route("/mcp/health", get(health_handler))
        .route("/mcp/healthz", get(health_handler))
        .with_state(HealthState { docker });

    Router::new()
        .merge(mcp)
        .merge(health)
        .layer(middleware::from_fn(stamp_request_id))
        .fallback(fallback_not_found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docker_adapter::Capabilities;

    use crate::concurrency::Concurrency;
    use crate::registry::DockerToolRegistry;
    use mcp_core::server::McpServerConfig;

    fn router() -> Router {
        let docker = Arc::new(DockerClient::connect(Some("unix:///nonexistent.sock")).unwrap());
        let concurrency = Arc::new(Concurrency::new(8, 4));
        let config = Arc::new(GatewayConfig {
            access_token: "good".to_string(),
            ..GatewayConfig::default()
        });
        let tool_registry = Arc::new(DockerToolRegistry::new(
            Capabilities::engine_only(),
            Arc::clone(&docker),
            concurrency,
            Arc::clone(&config),
        ));
        let state = GatewayState::new(tool_registry, Arc::clone(&config));
        let server = Arc::new(McpServer::new(McpServerConfig::default(), state));
        build_router(server, docker, &config)
    }

    #[tokio::test]
    async fn test_health_endpoint_is_reachable_without_auth() {
        use tower::ServiceExt;

        let app = router();
        let request = axum::http::Request::builder()
            .uri("/mcp/healthz")
            .body(axum::body::Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_mcp_endpoint_rejects_missing_credential() {
        use tower::ServiceExt;

        let app = router();
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/mcp")
            .header("content-type", "application/json")
            .body(axum::body::Body::from("{}"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        use tower::ServiceExt;

        let app = router();
        let request = axum::http::Request::builder()
            .uri("/nonexistent")
            .body(axum::body::Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
