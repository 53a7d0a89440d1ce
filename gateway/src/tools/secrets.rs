use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::{ErrorKind, GatewayError};
use crate::tools::{describe_deadline, ToolContext, ToolHandler, ToolSpec, MUTATING_DEADLINE_MS, SHORT_DEADLINE_MS};

struct ListSecrets;

#[async_trait]
impl ToolHandler for ListSecrets {
    async fn run(&self, _args: Value, ctx: &ToolContext) -> Result<Value, GatewayError> {
        let secrets = ctx.docker.list_secrets(ctx.deadline).await?;
        Ok(json!({ "secrets": secrets }))
    }
}

struct CreateSecret;

#[async_trait]
impl ToolHandler for CreateSecret {
    async fn run(&self, args: Value, ctx: &ToolContext) -> Result<Value, GatewayError> {
        let name = args
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| GatewayError::new(ErrorKind::InvalidArgument, "missing 'name'"))?;

        let data = args
            .get("data")
            .and_then(Value::as_str)
            .ok_or_else(|| GatewayError::new(ErrorKind::InvalidArgument, "missing 'data'"))?;

        let id = ctx.docker.create_secret(name, data.as_bytes(), ctx.deadline).await?;
        Ok(json!({ "id": id, "name": name }))
    }
}

struct RemoveSecret;

#[async_trait]
impl ToolHandler for RemoveSecret {
    async fn run(&self, args: Value, ctx: &ToolContext) -> Result<Value, GatewayError> {
        let id = args
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| GatewayError::new(ErrorKind::InvalidArgument, "missing 'id'"))?;

        ctx.docker.remove_secret(id, ctx.deadline).await?;
        Ok(json!({ "id": id, "removed": true }))
    }
}

pub fn specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: "list_secrets",
            title: "List secrets",
            description: describe_deadline("List swarm secret metadata, never secret payloads", SHORT_DEADLINE_MS),
            input_schema: json!({
                "type": "object",
                "properties": {},
                "required": [],
                "additionalProperties": false
            }),
            capabilities: &["swarm-manager"],
            idempotent: true,
            default_deadline_ms: SHORT_DEADLINE_MS,
            handler: Arc::new(ListSecrets),
        },
        ToolSpec {
            name: "create_secret",
            title: "Create a secret",
            description: describe_deadline("Create a swarm secret from an inline payload", MUTATING_DEADLINE_MS),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string", "minLength": 1},
                    "data": {"type": "string", "minLength": 1}
                },
                "required": ["name", "data"],
                "additionalProperties": false
            }),
            capabilities: &["swarm-manager"],
            idempotent: false,
            default_deadline_ms: MUTATING_DEADLINE_MS,
            handler: Arc::new(CreateSecret),
        },
        ToolSpec {
            name: "remove_secret",
            title: "Remove a secret",
            description: describe_deadline("Remove a swarm secret", MUTATING_DEADLINE_MS),
            input_schema: json!({
                "type": "object",
                "properties": {"id": {"type": "string", "minLength": 1}},
                "required": ["id"],
                "additionalProperties": false
            }),
            capabilities: &["swarm-manager"],
            idempotent: true,
            default_deadline_ms: MUTATING_DEADLINE_MS,
            handler: Arc::new(RemoveSecret),
        },
    ]
}
