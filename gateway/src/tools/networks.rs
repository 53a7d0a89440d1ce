use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::{ErrorKind, GatewayError};
use crate::tools::{describe_deadline, ToolContext, ToolHandler, ToolSpec, MUTATING_DEADLINE_MS, SHORT_DEADLINE_MS};

struct ListNetworks;

#[async_trait]
impl ToolHandler for ListNetworks {
    async fn run(&self, args: Value, ctx: &ToolContext) -> Result<Value, GatewayError> {
        let filters: HashMap<String, Vec<String>> = args
            .get("filters")
            .and_then(Value::as_object)
            .map(|obj| {
                obj.iter()
                    .filter_map(|(k, v)| {
                        let values: Vec<String> = v
                            .as_array()?
                            .iter()
                            .filter_map(|item| item.as_str().map(str::to_string))
                            .collect();
                        Some((k.clone(), values))
                    })
                    .collect()
            })
            .unwrap_or_default();

        let networks = ctx.docker.list_networks(filters, ctx.deadline).await?;
        Ok(json!({ "networks": networks }))
    }
}

struct CreateNetwork;

#[async_trait]
impl ToolHandler for CreateNetwork {
    async fn run(&self, args: Value, ctx: &ToolContext) -> Result<Value, GatewayError> {
        let name = args
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| GatewayError::new(ErrorKind::InvalidArgument, "missing 'name'"))?;
        let driver = args.get("driver").and_then(Value::as_str).unwrap_or("bridge");

        let id = ctx.docker.create_network(name, driver, ctx.deadline).await?;
        Ok(json!({ "id": id, "name": name }))
    }
}

struct RemoveNetwork;

#[async_trait]
impl ToolHandler for RemoveNetwork {
    async fn run(&self, args: Value, ctx: &ToolContext) -> Result<Value, GatewayError> {
        let id = args
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| GatewayError::new(ErrorKind::InvalidArgument, "missing 'id'"))?;

        ctx.docker.remove_network(id, ctx.deadline).await?;
        Ok(json!({ "id": id, "removed": true }))
    }
}

pub fn specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: "list_networks",
            title: "List networks",
            description: describe_deadline("List Docker networks", SHORT_DEADLINE_MS),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "filters": {"type": "object", "additionalProperties": {"type": "array", "items": {"type": "string"}}}
                },
                "required": [],
                "additionalProperties": false
            }),
            capabilities: &["engine"],
            idempotent: true,
            default_deadline_ms: SHORT_DEADLINE_MS,
            handler: Arc::new(ListNetworks),
        },
        ToolSpec {
            name: "create_network",
            title: "Create a network",
            description: describe_deadline("Create a Docker network", MUTATING_DEADLINE_MS),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string", "minLength": 1},
                    "driver": {"type": "string"}
                },
                "required": ["name"],
                "additionalProperties": false
            }),
            capabilities: &["engine"],
            idempotent: false,
            default_deadline_ms: MUTATING_DEADLINE_MS,
            handler: Arc::new(CreateNetwork),
        },
        ToolSpec {
            name: "remove_network",
            title: "Remove a network",
            description: describe_deadline("Remove a Docker network", MUTATING_DEADLINE_MS),
            input_schema: json!({
                "type": "object",
                "properties": {"id": {"type": "string", "minLength": 1}},
                "required": ["id"],
                "additionalProperties": false
            }),
            capabilities: &["engine"],
            idempotent: true,
            default_deadline_ms: MUTATING_DEADLINE_MS,
            handler: Arc::new(RemoveNetwork),
        },
    ]
}
