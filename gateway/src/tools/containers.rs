use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use docker_adapter::{ExecOptions, LifecycleAction, LifecycleOptions, LogOptions};

use crate::error::{ErrorKind, GatewayError};
use crate::tools::{describe_deadline, ToolContext, ToolHandler, ToolSpec, SHORT_DEADLINE_MS, MUTATING_DEADLINE_MS};

fn filters_from_args(args: &Value) -> HashMap<String, Vec<String>> {
    args.get("filters")
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
        .unwrap_or_default()
}

struct ListContainers;

#[async_trait]
impl ToolHandler for ListContainers {
    async fn run(&self, args: Value, ctx: &ToolContext) -> Result<Value, GatewayError> {
        let all = args.get("all").and_then(Value::as_bool).unwrap_or(false);
        let limit = args.get("limit").and_then(Value::as_i64).map(|v| v as isize);
        let filters = filters_from_args(&args);

        let containers = ctx
            .docker
            .list_containers(filters, all, limit, ctx.deadline)
            .await?;

        Ok(json!({ "containers": containers }))
    }
}

struct GetContainer;

#[async_trait]
impl ToolHandler for GetContainer {
    async fn run(&self, args: Value, ctx: &ToolContext) -> Result<Value, GatewayError> {
        let id = args
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| GatewayError::new(ErrorKind::InvalidArgument, "missing 'id'"))?;

        let detail = ctx.docker.get_container(id, ctx.deadline).await?;
        Ok(serde_json::to_value(detail).unwrap_or(Value::Null))
    }
}

struct Lifecycle;

#[async_trait]
impl ToolHandler for Lifecycle {
    async fn run(&self, args: Value, ctx: &ToolContext) -> Result<Value, GatewayError> {
        let id = args
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| GatewayError::new(ErrorKind::InvalidArgument, "missing 'id'"))?;

        let action_str = args
            .get("action")
            .and_then(Value::as_str)
            .ok_or_else(|| GatewayError::new(ErrorKind::InvalidArgument, "missing 'action'"))?;

        let action = match action_str {
            "start" => LifecycleAction::Start,
            "stop" => LifecycleAction::Stop,
            "restart" => LifecycleAction::Restart,
            "pause" => LifecycleAction::Pause,
            "unpause" => LifecycleAction::Unpause,
            "kill" => LifecycleAction::Kill,
            "remove" => LifecycleAction::Remove,
            other => {
                return Err(GatewayError::new(
                    ErrorKind::InvalidArgument,
                    format!("unknown lifecycle action '{other}'"),
                ))
            }
        };

        let options = LifecycleOptions {
            signal: args.get("signal").and_then(Value::as_str).map(str::to_string),
            timeout_secs: args.get("timeout_secs").and_then(Value::as_i64),
            force: args.get("force").and_then(Value::as_bool),
        };

        ctx.docker.lifecycle(id, action, options, ctx.deadline).await?;
        Ok(json!({ "id": id, "action": action_str, "applied": true }))
    }
}

struct Logs;

#[async_trait]
impl ToolHandler for Logs {
    async fn run(&self, args: Value, ctx: &ToolContext) -> Result<Value, GatewayError> {
        let id = args
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| GatewayError::new(ErrorKind::InvalidArgument, "missing 'id'"))?;

        let options = LogOptions {
            tail: args.get("tail").and_then(Value::as_str).map(str::to_string),
            since: args.get("since").and_then(Value::as_i64),
            until: args.get("until").and_then(Value::as_i64),
            timestamps: args.get("timestamps").and_then(Value::as_bool),
        };

        let text = ctx.docker.logs(id, options, ctx.deadline).await?;
        Ok(json!({ "id": id, "logs": text }))
    }
}

struct Exec;

#[async_trait]
impl ToolHandler for Exec {
    async fn run(&self, args: Value, ctx: &ToolContext) -> Result<Value, GatewayError> {
        let id = args
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| GatewayError::new(ErrorKind::InvalidArgument, "missing 'id'"))?;

        let argv: Vec<String> = args
            .get("cmd")
            .and_then(Value::as_array)
            .ok_or_else(|| GatewayError::new(ErrorKind::InvalidArgument, "missing 'cmd'"))?
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect();

        let options = ExecOptions {
            user: args.get("user").and_then(Value::as_str).map(str::to_string),
            workdir: args.get("workdir").and_then(Value::as_str).map(str::to_string),
            env: args
                .get("env")
                .and_then(Value::as_array)
                .map(|a| a.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
                .unwrap_or_default(),
        };

        let report = ctx.docker.exec(id, argv, options, ctx.deadline).await?;
        Ok(serde_json::to_value(report).unwrap_or(Value::Null))
    }
}

pub fn specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: "list_containers",
            title: "List containers",
            description: describe_deadline("List containers on the Docker daemon", SHORT_DEADLINE_MS),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "all": {"type": "boolean"},
                    "limit": {"type": "integer", "minimum": 1},
                    "filters": {"type": "object", "additionalProperties": {"type": "array", "items": {"type": "string"}}}
                },
                "required": [],
                "additionalProperties": false
            }),
            capabilities: &["engine"],
            idempotent: true,
            default_deadline_ms: SHORT_DEADLINE_MS,
            handler: Arc::new(ListContainers),
        },
        ToolSpec {
            name: "get_container",
            title: "Inspect a container",
            description: describe_deadline("Return detailed state for one container", SHORT_DEADLINE_MS),
            input_schema: json!({
                "type": "object",
                "properties": {"id": {"type": "string", "minLength": 1}},
                "required": ["id"],
                "additionalProperties": false
            }),
            capabilities: &["engine"],
            idempotent: true,
            default_deadline_ms: SHORT_DEADLINE_MS,
            handler: Arc::new(GetContainer),
        },
        ToolSpec {
            name: "container_lifecycle",
            title: "Start, stop, restart, pause, unpause, kill, or remove a container",
            description: describe_deadline("Apply a lifecycle action to one container", MUTATING_DEADLINE_MS),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "id": {"type": "string", "minLength": 1},
                    "action": {"type": "string", "enum": ["start", "stop", "restart", "pause", "unpause", "kill", "remove"]},
                    "signal": {"type": "string"},
                    "timeout_secs": {"type": "integer", "minimum": 0},
                    "force": {"type": "boolean"}
                },
                "required": ["id", "action"],
                "additionalProperties": false
            }),
            capabilities: &["engine"],
            idempotent: false,
            default_deadline_ms: MUTATING_DEADLINE_MS,
            handler: Arc::new(Lifecycle),
        },
        ToolSpec {
            name: "container_logs",
            title: "Fetch container logs",
            description: describe_deadline("Return a bounded snapshot of a container's stdout/stderr", SHORT_DEADLINE_MS),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "id": {"type": "string", "minLength": 1},
                    "tail": {"type": "string"},
                    "since": {"type": "integer"},
                    "until": {"type": "integer"},
                    "timestamps": {"type": "boolean"}
                },
                "required": ["id"],
                "additionalProperties": false
            }),
            capabilities: &["engine"],
            idempotent: true,
            default_deadline_ms: SHORT_DEADLINE_MS,
            handler: Arc::new(Logs),
        },
        ToolSpec {
            name: "container_exec",
            title: "Run a command inside a container",
            description: describe_deadline("Execute a one-shot command and capture its output", MUTATING_DEADLINE_MS),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "id": {"type": "string", "minLength": 1},
                    "cmd": {"type": "array", "items": {"type": "string"}, "minItems": 1},
                    "user": {"type": "string"},
                    "workdir": {"type": "string"},
                    "env": {"type": "array", "items": {"type": "string"}}
                },
                "required": ["id", "cmd"],
                "additionalProperties": false
            }),
            capabilities: &["engine"],
            idempotent: false,
            default_deadline_ms: MUTATING_DEADLINE_MS,
            handler: Arc::new(Exec),
        },
    ]
}
