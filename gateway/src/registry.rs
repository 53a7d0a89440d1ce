//! Tool Registry + Tool Executor: the catalog of tools filtered by the
//! daemon's actual capabilities, and the glue from a validated `tools/call`
//! to a handler invocation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use docker_adapter::{Capabilities, DockerClient};
use mcp_core::{
    error::{McpError, McpResult},
    protocol::{Tool, ToolContent, ToolsCallResult},
    security::SecurityContext,
    server::registry::{McpTool, ToolExecutionContext, ToolRegistry},
};

use crate::concurrency::Concurrency;
use crate::config::GatewayConfig;
use crate::error::{ErrorKind, GatewayError};
use crate::schema;
use crate::tools::{all_tool_specs, ToolContext, ToolSpec};

pub struct DockerToolRegistry {
    specs: HashMap<String, ToolSpec>,
    capabilities: Capabilities,
    docker: Arc<DockerClient>,
    concurrency: Arc<Concurrency>,
    config: Arc<GatewayConfig>,
}

impl DockerToolRegistry {
    pub fn new(
        capabilities: Capabilities,
        docker: Arc<DockerClient>,
        concurrency: Arc<Concurrency>,
        config: Arc<GatewayConfig>,
    ) -> Self {
        let specs = all_tool_specs()
            .into_iter()
            .map(|spec| (spec.name.to_string(), spec))
            .collect();

        Self {
            specs,
            capabilities,
            docker,
            concurrency,
            config,
        }
    }

    fn is_available(&self, spec: &ToolSpec) -> bool {
        spec.capabilities.iter().all(|cap| self.capabilities.satisfies(cap))
    }

    fn to_mcp_tool(&self, spec: &ToolSpec) -> McpTool {
        McpTool::new(spec.name, spec.description.clone(), spec.input_schema.clone(), "docker").public()
    }

    fn resolve_deadline(&self, arguments: &Value, default_deadline_ms: u64) -> Duration {
        let requested = arguments.get("timeout_ms").and_then(Value::as_u64);
        self.config.clamp_deadline(requested.or(Some(default_deadline_ms)))
    }
}

#[async_trait]
impl ToolRegistry for DockerToolRegistry {
    async fn list_tools(&self, _context: &SecurityContext) -> McpResult<Vec<Tool>> {
        let mut tools: Vec<Tool> = self
            .specs
            .values()
            .filter(|spec| self.is_available(spec))
            .map(|spec| self.to_mcp_tool(spec).tool)
            .collect();

        tools.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tools)
    }

    async fn get_tool(&self, name: &str, _context: &SecurityContext) -> McpResult<Option<McpTool>> {
        Ok(self
            .specs
            .get(name)
            .filter(|spec| self.is_available(spec))
            .map(|spec| self.to_mcp_tool(spec)))
    }

    async fn execute_tool(&self, name: &str, execution_context: ToolExecutionContext) -> McpResult<ToolsCallResult> {
        let spec = self.specs.get(name).ok_or_else(|| McpError::ToolNotFound {
            name: name.to_string(),
        })?;

        if !self.is_available(spec) {
            let err = GatewayError::new(
                ErrorKind::UnsupportedCapability,
                format!("tool '{name}' requires a capability this daemon does not have"),
            );
            return Ok(err.into_tool_result());
        }

        let arguments = execution_context.arguments.unwrap_or(Value::Null);
        let field_errors = schema::validate(&arguments, &spec.input_schema);
        if !field_errors.is_empty() {
            let details = serde_json::json!({
                "fields": field_errors
                    .iter()
                    .map(|e| serde_json::json!({"path": e.path, "kind": e.kind, "message": e.message}))
                    .collect::<Vec<_>>()
            });
            let err = GatewayError::new(ErrorKind::InvalidArgument, "argument validation failed")
                .with_details(details);
            return Ok(err.into_tool_result());
        }

        let deadline = self.resolve_deadline(&arguments, spec.default_deadline_ms);

        let permit = match self.concurrency.acquire(deadline).await {
            Ok(permit) => permit,
            Err(err) => return Ok(err.into_tool_result()),
        };

        let ctx = ToolContext {
            docker: Arc::clone(&self.docker),
            concurrency: Arc::clone(&self.concurrency),
            deadline,
        };

        let result = spec.handler.run(arguments, &ctx).await;
        drop(permit);

        match result {
            Ok(value) => {
                let text = serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
                Ok(ToolsCallResult {
                    content: vec![ToolContent::Text { text }],
                    is_error: false,
                    structured_content: Some(value),
                })
            }
            Err(err) => Ok(err.into_tool_result()),
        }
    }

    async fn can_access_tool(&self, name: &str, _context: &SecurityContext) -> bool {
        self.specs.get(name).map(|spec| self.is_available(spec)).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayConfig;

    fn registry_with(capabilities: Capabilities) -> DockerToolRegistry {
        let docker = Arc::new(DockerClient::connect(Some("unix:///nonexistent.sock")).unwrap());
        let concurrency = Arc::new(Concurrency::new(8, 4));
        let config = Arc::new(GatewayConfig::default());
        DockerToolRegistry::new(capabilities, docker, concurrency, config)
    }

    #[tokio::test]
    async fn test_engine_only_hides_swarm_tools() {
        let registry = registry_with(Capabilities::engine_only());
        let context = SecurityContext::system();
        let tools = registry.list_tools(&context).await.unwrap();
        assert!(tools.iter().any(|t| t.name == "list_containers"));
        assert!(!tools.iter().any(|t| t.name == "list_services"));
    }

    #[tokio::test]
    async fn test_tools_list_is_alphabetically_sorted() {
        let registry = registry_with(Capabilities {
            engine: true,
            swarm_manager: true,
            swarm_worker_or_manager: true,
        });
        let context = SecurityContext::system();
        let tools = registry.list_tools(&context).await.unwrap();
        let mut sorted = tools.clone();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(tools, sorted);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_tool_not_found() {
        let registry = registry_with(Capabilities::engine_only());
        let context = SecurityContext::system();
        let execution_context = ToolExecutionContext::new(context);
        let result = registry.execute_tool("no_such_tool", execution_context).await;
        assert!(matches!(result, Err(McpError::ToolNotFound { .. })));
    }

    #[tokio::test]
    async fn test_unsupported_capability_returns_is_error_result() {
        let registry = registry_with(Capabilities::engine_only());
        let context = SecurityContext::system();
        let execution_context = ToolExecutionContext::new(context).with_arguments(serde_json::json!({}));
        let result = registry.execute_tool("list_services", execution_context).await.unwrap();
        assert!(result.is_error);
        assert_eq!(result.structured_content.unwrap()["kind"], "unsupported-capability");
    }

    #[tokio::test]
    async fn test_invalid_arguments_return_is_error_result() {
        let registry = registry_with(Capabilities::engine_only());
        let context = SecurityContext::system();
        let execution_context =
            ToolExecutionContext::new(context).with_arguments(serde_json::json!({"bogus": true}));
        let result = registry.execute_tool("list_containers", execution_context).await.unwrap();
        assert!(result.is_error);
        assert_eq!(result.structured_content.unwrap()["kind"], "invalid-argument");
    }
}
