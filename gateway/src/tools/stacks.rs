use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use docker_adapter::{ComposeDocument, ComposeService};

use crate::error::{ErrorKind, GatewayError};
use crate::tools::{describe_deadline, ToolContext, ToolHandler, ToolSpec, LONG_DEADLINE_MS, MUTATING_DEADLINE_MS};

fn compose_document_from_args(value: &Value) -> Result<ComposeDocument, GatewayError> {
    let services_obj = value
        .get("services")
        .and_then(Value::as_object)
        .ok_or_else(|| GatewayError::new(ErrorKind::InvalidArgument, "missing 'compose.services'"))?;

    let mut services = std::collections::HashMap::new();
    for (name, spec) in services_obj {
        let image = spec
            .get("image")
            .and_then(Value::as_str)
            .ok_or_else(|| GatewayError::new(ErrorKind::InvalidArgument, format!("service '{name}' missing 'image'")))?
            .to_string();

        let environment = spec
            .get("environment")
            .and_then(Value::as_array)
            .map(|a| a.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
            .unwrap_or_default();

        let replicas = spec.get("replicas").and_then(Value::as_u64);

        let labels = spec
            .get("labels")
            .and_then(Value::as_object)
            .map(|obj| {
                obj.iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect()
            })
            .unwrap_or_default();

        services.insert(name.clone(), ComposeService { image, environment, replicas, labels });
    }

    Ok(ComposeDocument { services })
}

struct DeployStack;

#[async_trait]
impl ToolHandler for DeployStack {
    async fn run(&self, args: Value, ctx: &ToolContext) -> Result<Value, GatewayError> {
        let name = args
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| GatewayError::new(ErrorKind::InvalidArgument, "missing 'name'"))?;

        let compose_value = args
            .get("compose")
            .ok_or_else(|| GatewayError::new(ErrorKind::InvalidArgument, "missing 'compose'"))?;

        let compose = compose_document_from_args(compose_value)?;

        let report = ctx.docker.deploy_stack(name, compose, ctx.deadline).await?;
        Ok(serde_json::to_value(report).unwrap_or(Value::Null))
    }
}

struct RemoveStack;

#[async_trait]
impl ToolHandler for RemoveStack {
    async fn run(&self, args: Value, ctx: &ToolContext) -> Result<Value, GatewayError> {
        let name = args
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| GatewayError::new(ErrorKind::InvalidArgument, "missing 'name'"))?;

        ctx.docker.remove_stack(name, ctx.deadline).await?;
        Ok(json!({ "name": name, "removed": true }))
    }
}

pub fn specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: "deploy_stack",
            title: "Deploy a stack",
            description: describe_deadline("Reconcile every service in a compose document against the swarm", LONG_DEADLINE_MS),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string", "minLength": 1},
                    "compose": {
                        "type": "object",
                        "properties": {
                            "services": {
                                "type": "object",
                                "additionalProperties": {
                                    "type": "object",
                                    "properties": {
                                        "image": {"type": "string", "minLength": 1},
                                        "environment": {"type": "array", "items": {"type": "string"}},
                                        "replicas": {"type": "integer", "minimum": 0},
                                        "labels": {"type": "object", "additionalProperties": {"type": "string"}}
                                    },
                                    "required": ["image"],
                                    "additionalProperties": false
                                }
                            }
                        },
                        "required": ["services"],
                        "additionalProperties": false
                    }
                },
                "required": ["name", "compose"],
                "additionalProperties": false
            }),
            capabilities: &["swarm-manager"],
            idempotent: true,
            default_deadline_ms: LONG_DEADLINE_MS,
            handler: Arc::new(DeployStack),
        },
        ToolSpec {
            name: "remove_stack",
            title: "Remove a stack",
            description: describe_deadline("Remove every service tagged with a stack's namespace", MUTATING_DEADLINE_MS),
            input_schema: json!({
                "type": "object",
                "properties": {"name": {"type": "string", "minLength": 1}},
                "required": ["name"],
                "additionalProperties": false
            }),
            capabilities: &["swarm-manager"],
            idempotent: true,
            default_deadline_ms: MUTATING_DEADLINE_MS,
            handler: Arc::new(RemoveStack),
        },
    ]
}
