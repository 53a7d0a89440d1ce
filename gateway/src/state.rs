//! `GatewayState`: the concrete [`McpServerState`] wiring the Docker tool
//! registry and prompt catalog into mcp-core's dispatch loop, plus the
//! `prompts/list` / `prompts/get` custom-method seam.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use mcp_core::{
    error::{McpError, McpResult},
    protocol::{BatchCapability, PromptsCapability, ServerCapabilities, ServerInfo, ToolsCapability},
    security::{ClientContext, McpAuth, SecurityContext},
    server::McpServerState,
};

use crate::config::GatewayConfig;
use crate::prompts::PromptRegistry;
use crate::registry::DockerToolRegistry;

/// Authentication has already happened at the HTTP layer (see
/// [`crate::auth::Authenticator`]) before a request ever reaches the
/// mcp-core dispatch loop, so this manager is never actually consulted —
/// it exists only to satisfy `McpServerState::AuthManager`'s bound.
pub struct NoopAuthManager;

#[async_trait]
impl McpAuth for NoopAuthManager {
    async fn authenticate(&self, _client_info: &ClientContext) -> McpResult<SecurityContext> {
        Ok(SecurityContext::system())
    }

    async fn authorize(&self, _context: &SecurityContext, _resource: &str, _action: &str) -> bool {
        true
    }
}

#[derive(Clone)]
pub struct GatewayState {
    tool_registry: Arc<DockerToolRegistry>,
    prompt_registry: Arc<PromptRegistry>,
    auth_manager: Arc<NoopAuthManager>,
    config: Arc<GatewayConfig>,
}

impl GatewayState {
    pub fn new(tool_registry: Arc<DockerToolRegistry>, config: Arc<GatewayConfig>) -> Self {
        Self {
            tool_registry,
            prompt_registry: Arc::new(PromptRegistry::new()),
            auth_manager: Arc::new(NoopAuthManager),
            config,
        }
    }

    fn handle_prompts_list(&self) -> Value {
        let prompts: Vec<Value> = self
            .prompt_registry
            .list()
            .into_iter()
            .map(|p| {
                json!({
                    "name": p.name,
                    "title": p.title,
                    "description": p.description,
                    "arguments": p.arguments,
                })
            })
            .collect();

        json!({ "prompts": prompts })
    }

    fn handle_prompts_get(&self, params: Option<Value>) -> McpResult<Value> {
        let params = params.unwrap_or(Value::Null);
        let name = params.get("name").and_then(Value::as_str).ok_or_else(|| McpError::Validation {
            message: "prompts/get requires a 'name' argument".to_string(),
        })?;
        let arguments = params.get("arguments").cloned().unwrap_or(json!({}));

        let messages = self.prompt_registry.render(name, &arguments).map_err(|err| {
            McpError::ToolExecution {
                tool: name.to_string(),
                message: err.message,
            }
        })?;

        let content: Vec<Value> = messages
            .into_iter()
            .map(|m| json!({"role": m.role, "content": {"type": "text", "text": m.text}}))
            .collect();

        Ok(json!({ "description": name, "messages": content }))
    }
}

#[async_trait]
impl McpServerState for GatewayState {
    type ToolRegistry = DockerToolRegistry;
    type AuthManager = NoopAuthManager;

    fn tool_registry(&self) -> &Self::ToolRegistry {
        &self.tool_registry
    }

    fn auth_manager(&self) -> &Self::AuthManager {
        &self.auth_manager
    }

    fn server_info(&self) -> ServerInfo {
        ServerInfo {
            name: "mcp-docker-gateway".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            metadata: HashMap::new(),
        }
    }

    fn server_capabilities(&self) -> ServerCapabilities {
        ServerCapabilities {
            experimental: HashMap::new(),
            logging: None,
            prompts: Some(PromptsCapability { list_changed: false }),
            resources: None,
            tools: Some(ToolsCapability { list_changed: false }),
            batch: Some(BatchCapability {
                max_batch_size: 100,
                max_parallel: self.config.fanout_max_parallel as u32,
            }),
        }
    }

    async fn handle_custom_method(
        &self,
        method: &str,
        params: Option<Value>,
        _context: &SecurityContext,
    ) -> McpResult<Option<Value>> {
        match method {
            "prompts/list" => Ok(Some(self.handle_prompts_list())),
            "prompts/get" => self.handle_prompts_get(params).map(Some),
            other => Err(McpError::ToolNotFound { name: other.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docker_adapter::{Capabilities, DockerClient};

    use crate::concurrency::Concurrency;

    fn state() -> GatewayState {
        let docker = Arc::new(DockerClient::connect(Some("unix:///nonexistent.sock")).unwrap());
        let concurrency = Arc::new(Concurrency::new(8, 4));
        let config = Arc::new(GatewayConfig::default());
        let registry = Arc::new(DockerToolRegistry::new(
            Capabilities::engine_only(),
            docker,
            concurrency,
            Arc::clone(&config),
        ));
        GatewayState::new(registry, config)
    }

    #[tokio::test]
    async fn test_prompts_list_returns_catalog() {
        let state = state();
        let context = SecurityContext::system();
        let result = state
            .handle_custom_method("prompts/list", None, &context)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result["prompts"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_prompts_get_renders_named_prompt() {
        let state = state();
        let context = SecurityContext::system();
        let params = json!({"name": "diagnose_container", "arguments": {"container_id": "web-1"}});
        let result = state
            .handle_custom_method("prompts/get", Some(params), &context)
            .await
            .unwrap()
            .unwrap();
        let first = &result["messages"][0]["content"]["text"];
        assert!(first.as_str().unwrap().contains("web-1"));
    }

    #[tokio::test]
    async fn test_unknown_custom_method_is_tool_not_found() {
        let state = state();
        let context = SecurityContext::system();
        let result = state.handle_custom_method("nonexistent/method", None, &context).await;
        assert!(matches!(result, Err(McpError::ToolNotFound { .. })));
    }

    #[test]
    fn test_server_capabilities_advertise_prompts_and_tools() {
        let state = state();
        let caps = state.server_capabilities();
        assert!(caps.prompts.is_some());
        assert!(caps.tools.is_some());
    }
}
