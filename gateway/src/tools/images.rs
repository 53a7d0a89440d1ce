use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use docker_adapter::RegistryAuth;

use crate::error::{ErrorKind, GatewayError};
use crate::tools::{describe_deadline, ToolContext, ToolHandler, ToolSpec, LONG_DEADLINE_MS, SHORT_DEADLINE_MS};

struct ListImages;

#[async_trait]
impl ToolHandler for ListImages {
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

        let images = ctx.docker.list_images(filters, ctx.deadline).await?;
        Ok(json!({ "images": images }))
    }
}

struct PullImage;

#[async_trait]
impl ToolHandler for PullImage {
    async fn run(&self, args: Value, ctx: &ToolContext) -> Result<Value, GatewayError> {
        let reference = args
            .get("reference")
            .and_then(Value::as_str)
            .ok_or_else(|| GatewayError::new(ErrorKind::InvalidArgument, "missing 'reference'"))?;

        let auth = args.get("auth").and_then(|a| {
            let username = a.get("username")?.as_str()?.to_string();
            let password = a.get("password")?.as_str()?.to_string();
            let server_address = a.get("server_address").and_then(Value::as_str).map(str::to_string);
            Some(RegistryAuth { username, password, server_address })
        });

        let report = ctx.docker.pull_image(reference, auth, ctx.deadline).await?;
        Ok(serde_json::to_value(report).unwrap_or(Value::Null))
    }
}

pub fn specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: "list_images",
            title: "List images",
            description: describe_deadline("List images present on the Docker daemon", SHORT_DEADLINE_MS),
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
            handler: Arc::new(ListImages),
        },
        ToolSpec {
            name: "pull_image",
            title: "Pull an image",
            description: describe_deadline("Pull an image from a registry", LONG_DEADLINE_MS),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "reference": {"type": "string", "minLength": 1},
                    "auth": {
                        "type": "object",
                        "properties": {
                            "username": {"type": "string"},
                            "password": {"type": "string"},
                            "server_address": {"type": "string"}
                        },
                        "required": ["username", "password"],
                        "additionalProperties": false
                    }
                },
                "required": ["reference"],
                "additionalProperties": false
            }),
            capabilities: &["engine"],
            idempotent: true,
            default_deadline_ms: LONG_DEADLINE_MS,
            handler: Arc::new(PullImage),
        },
    ]
}
