use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::{ErrorKind, GatewayError};
use crate::tools::{describe_deadline, ToolContext, ToolHandler, ToolSpec, MUTATING_DEADLINE_MS, SHORT_DEADLINE_MS};

struct ListVolumes;

#[async_trait]
impl ToolHandler for ListVolumes {
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

        let volumes = ctx.docker.list_volumes(filters, ctx.deadline).await?;
        Ok(json!({ "volumes": volumes }))
    }
}

struct CreateVolume;

#[async_trait]
impl ToolHandler for CreateVolume {
    async fn run(&self, args: Value, ctx: &ToolContext) -> Result<Value, GatewayError> {
        let name = args
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| GatewayError::new(ErrorKind::InvalidArgument, "missing 'name'"))?;
        let driver = args.get("driver").and_then(Value::as_str).unwrap_or("local");

        ctx.docker.create_volume(name, driver, ctx.deadline).await?;
        Ok(json!({ "name": name }))
    }
}

struct RemoveVolume;

#[async_trait]
impl ToolHandler for RemoveVolume {
    async fn run(&self, args: Value, ctx: &ToolContext) -> Result<Value, GatewayError> {
        let name = args
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| GatewayError::new(ErrorKind::InvalidArgument, "missing 'name'"))?;

        ctx.docker.remove_volume(name, ctx.deadline).await?;
        Ok(json!({ "name": name, "removed": true }))
    }
}

pub fn specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: "list_volumes",
            title: "List volumes",
            description: describe_deadline("List Docker volumes", SHORT_DEADLINE_MS),
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
            handler: Arc::new(ListVolumes),
        },
        ToolSpec {
            name: "create_volume",
            title: "Create a volume",
            description: describe_deadline("Create a Docker volume", MUTATING_DEADLINE_MS),
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
            handler: Arc::new(CreateVolume),
        },
        ToolSpec {
            name: "remove_volume",
            title: "Remove a volume",
            description: describe_deadline("Remove a Docker volume", MUTATING_DEADLINE_MS),
            input_schema: json!({
                "type": "object",
                "properties": {"name": {"type": "string", "minLength": 1}},
                "required": ["name"],
                "additionalProperties": false
            }),
            capabilities: &["engine"],
            idempotent: true,
            default_deadline_ms: MUTATING_DEADLINE_MS,
            handler: Arc::new(RemoveVolume),
        },
    ]
}
