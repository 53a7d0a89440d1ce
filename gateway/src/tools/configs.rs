use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::{ErrorKind, GatewayError};
use crate::tools::{describe_deadline, ToolContext, ToolHandler, ToolSpec, MUTATING_DEADLINE_MS, SHORT_DEADLINE_MS};

struct ListConfigs;

#[async_trait]
impl ToolHandler for ListConfigs {
    async fn run(&self, _args: Value, ctx: &ToolContext) -> Result<Value, GatewayError> {
        let configs = ctx.docker.list_configs(ctx.deadline).await?;
        Ok(json!({ "configs": configs }))
    }
}

struct RemoveConfig;

#[async_trait]
impl ToolHandler for RemoveConfig {
    async fn run(&self, args: Value, ctx: &ToolContext) -> Result<Value, GatewayError> {
        let id = args
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| GatewayError::new(ErrorKind::InvalidArgument, "missing 'id'"))?;

        ctx.docker.remove_config(id, ctx.deadline).await?;
        Ok(json!({ "id": id, "removed": true }))
    }
}

pub fn specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: "list_configs",
            title: "List configs",
            description: describe_deadline("List swarm config objects", SHORT_DEADLINE_MS),
            input_schema: json!({
                "type": "object",
                "properties": {},
                "required": [],
                "additionalProperties": false
            }),
            capabilities: &["swarm-manager"],
            idempotent: true,
            default_deadline_ms: SHORT_DEADLINE_MS,
            handler: Arc::new(ListConfigs),
        },
        ToolSpec {
            name: "remove_config",
            title: "Remove a config",
            description: describe_deadline("Remove a swarm config object", MUTATING_DEADLINE_MS),
            input_schema: json!({
                "type": "object",
                "properties": {"id": {"type": "string", "minLength": 1}},
                "required": ["id"],
                "additionalProperties": false
            }),
            capabilities: &["swarm-manager"],
            idempotent: true,
            default_deadline_ms: MUTATING_DEADLINE_MS,
            handler: Arc::new(RemoveConfig),
        },
    ]
}
