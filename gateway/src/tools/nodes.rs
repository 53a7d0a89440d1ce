use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::{ErrorKind, GatewayError};
use crate::tools::{describe_deadline, ToolContext, ToolHandler, ToolSpec, SHORT_DEADLINE_MS};

struct ListNodes;

#[async_trait]
impl ToolHandler for ListNodes {
    async fn run(&self, _args: Value, ctx: &ToolContext) -> Result<Value, GatewayError> {
        let nodes = ctx.docker.list_nodes(ctx.deadline).await?;
        Ok(json!({ "nodes": nodes }))
    }
}

struct NodeTasks;

#[async_trait]
impl ToolHandler for NodeTasks {
    async fn run(&self, args: Value, ctx: &ToolContext) -> Result<Value, GatewayError> {
        let node_id = args
            .get("node_id")
            .and_then(Value::as_str)
            .ok_or_else(|| GatewayError::new(ErrorKind::InvalidArgument, "missing 'node_id'"))?;

        let tasks = ctx.docker.node_tasks(node_id, ctx.deadline).await?;
        Ok(json!({ "tasks": tasks }))
    }
}

/// Fans out `node_stats` across every node named in `node_ids`, or every
/// node in the swarm when `node_ids` is omitted, bounded by the shared
/// fan-out parallelism ceiling. A per-node failure never hides the
/// others' results; the response carries a `partial` flag.
struct NodeStats;

#[async_trait]
impl ToolHandler for NodeStats {
    async fn run(&self, args: Value, ctx: &ToolContext) -> Result<Value, GatewayError> {
        let requested: Option<Vec<String>> = args.get("node_ids").and_then(Value::as_array).map(|items| {
            items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect()
        });

        let node_ids = match requested {
            Some(ids) if !ids.is_empty() => ids,
            Some(_) => {
                return Err(GatewayError::new(ErrorKind::InvalidArgument, "'node_ids' must not be empty"));
            }
            None => ctx
                .docker
                .list_nodes(ctx.deadline)
                .await?
                .into_iter()
                .map(|node| node.id)
                .collect(),
        };

        let docker = Arc::clone(&ctx.docker);
        let deadline = ctx.deadline;

        let aggregate = ctx
            .concurrency
            .fanout(
                node_ids,
                move |node_id| {
                    let docker = Arc::clone(&docker);
                    async move { docker.node_stats(&node_id, deadline).await.map_err(GatewayError::from) }
                },
                deadline,
            )
            .await;

        let stats: Vec<Value> = aggregate
            .successes
            .iter()
            .map(|(_, stat)| serde_json::to_value(stat).unwrap_or(Value::Null))
            .collect();

        Ok(json!({
            "stats": stats,
            "failures": aggregate.failures,
            "partial": aggregate.partial,
        }))
    }
}

pub fn specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: "list_nodes",
            title: "List swarm nodes",
            description: describe_deadline("List nodes participating in the swarm", SHORT_DEADLINE_MS),
            input_schema: json!({
                "type": "object",
                "properties": {},
                "required": [],
                "additionalProperties": false
            }),
            capabilities: &["swarm-worker-or-manager"],
            idempotent: true,
            default_deadline_ms: SHORT_DEADLINE_MS,
            handler: Arc::new(ListNodes),
        },
        ToolSpec {
            name: "node_tasks",
            title: "List tasks scheduled on a node",
            description: describe_deadline("List the tasks currently scheduled on one node", SHORT_DEADLINE_MS),
            input_schema: json!({
                "type": "object",
                "properties": {"node_id": {"type": "string", "minLength": 1}},
                "required": ["node_id"],
                "additionalProperties": false
            }),
            capabilities: &["swarm-manager"],
            idempotent: true,
            default_deadline_ms: SHORT_DEADLINE_MS,
            handler: Arc::new(NodeTasks),
        },
        ToolSpec {
            name: "node_stats",
            title: "Collect stats across swarm nodes",
            description: describe_deadline(
                "Fan out a task-count aggregate across a set of nodes, or every node in the swarm if 'node_ids' is omitted",
                SHORT_DEADLINE_MS,
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "node_ids": {"type": "array", "items": {"type": "string"}, "minItems": 1}
                },
                "required": [],
                "additionalProperties": false
            }),
            capabilities: &["swarm-manager"],
            idempotent: true,
            default_deadline_ms: SHORT_DEADLINE_MS,
            handler: Arc::new(NodeStats),
        },
    ]
}
