use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use docker_adapter::ServiceSpecPatch;

use crate::error::{ErrorKind, GatewayError};
use crate::tools::{describe_deadline, ToolContext, ToolHandler, ToolSpec, MUTATING_DEADLINE_MS, SHORT_DEADLINE_MS};

struct ListServices;

#[async_trait]
impl ToolHandler for ListServices {
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

        let services = ctx.docker.list_services(filters, ctx.deadline).await?;
        Ok(json!({ "services": services }))
    }
}

struct ServiceScale;

#[async_trait]
impl ToolHandler for ServiceScale {
    async fn run(&self, args: Value, ctx: &ToolContext) -> Result<Value, GatewayError> {
        let service = args
            .get("service")
            .and_then(Value::as_str)
            .ok_or_else(|| GatewayError::new(ErrorKind::InvalidArgument, "missing 'service'"))?;

        let replicas = args
            .get("replicas")
            .and_then(Value::as_u64)
            .ok_or_else(|| GatewayError::new(ErrorKind::InvalidArgument, "missing 'replicas'"))?;

        ctx.docker.service_scale(service, replicas, ctx.deadline).await?;
        Ok(json!({ "service": service, "replicas": replicas }))
    }
}

struct ServiceUpdate;

#[async_trait]
impl ToolHandler for ServiceUpdate {
    async fn run(&self, args: Value, ctx: &ToolContext) -> Result<Value, GatewayError> {
        let service = args
            .get("service")
            .and_then(Value::as_str)
            .ok_or_else(|| GatewayError::new(ErrorKind::InvalidArgument, "missing 'service'"))?;

        let patch = ServiceSpecPatch {
            image: args.get("image").and_then(Value::as_str).map(str::to_string),
            env: args
                .get("env")
                .and_then(Value::as_array)
                .map(|a| a.iter().filter_map(|v| v.as_str().map(str::to_string)).collect()),
            labels: args.get("labels").and_then(Value::as_object).map(|obj| {
                obj.iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect()
            }),
            replicas: args.get("replicas").and_then(Value::as_u64),
        };

        ctx.docker.service_update(service, patch, ctx.deadline).await?;
        Ok(json!({ "service": service, "updated": true }))
    }
}

pub fn specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: "list_services",
            title: "List swarm services",
            description: describe_deadline("List services running on the swarm", SHORT_DEADLINE_MS),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "filters": {"type": "object", "additionalProperties": {"type": "array", "items": {"type": "string"}}}
                },
                "required": [],
                "additionalProperties": false
            }),
            capabilities: &["swarm-manager"],
            idempotent: true,
            default_deadline_ms: SHORT_DEADLINE_MS,
            handler: Arc::new(ListServices),
        },
        ToolSpec {
            name: "service_scale",
            title: "Scale a swarm service",
            description: describe_deadline("Change the desired replica count of a service", MUTATING_DEADLINE_MS),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "service": {"type": "string", "minLength": 1},
                    "replicas": {"type": "integer", "minimum": 0}
                },
                "required": ["service", "replicas"],
                "additionalProperties": false
            }),
            capabilities: &["swarm-manager"],
            idempotent: true,
            default_deadline_ms: MUTATING_DEADLINE_MS,
            handler: Arc::new(ServiceScale),
        },
        ToolSpec {
            name: "service_update",
            title: "Update a swarm service",
            description: describe_deadline("Patch a service's image, env, labels, or replica count", MUTATING_DEADLINE_MS),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "service": {"type": "string", "minLength": 1},
                    "image": {"type": "string"},
                    "env": {"type": "array", "items": {"type": "string"}},
                    "labels": {"type": "object", "additionalProperties": {"type": "string"}},
                    "replicas": {"type": "integer", "minimum": 0}
                },
                "required": ["service"],
                "additionalProperties": false
            }),
            capabilities: &["swarm-manager"],
            idempotent: false,
            default_deadline_ms: MUTATING_DEADLINE_MS,
            handler: Arc::new(ServiceUpdate),
        },
    ]
}
