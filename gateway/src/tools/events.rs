use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use docker_adapter::EventFilters;

use crate::error::GatewayError;
use crate::tools::{describe_deadline, ToolContext, ToolHandler, ToolSpec, SHORT_DEADLINE_MS};

struct Events;

#[async_trait]
impl ToolHandler for Events {
    async fn run(&self, args: Value, ctx: &ToolContext) -> Result<Value, GatewayError> {
        let event_type = args.get("event_type").and_then(Value::as_str).map(str::to_string);
        let labels: HashMap<String, String> = args
            .get("labels")
            .and_then(Value::as_object)
            .map(|obj| {
                obj.iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect()
            })
            .unwrap_or_default();

        let filters = EventFilters { event_type, labels };
        let events = ctx.docker.events(filters, ctx.deadline).await?;
        Ok(json!({ "events": events }))
    }
}

pub fn specs() -> Vec<ToolSpec> {
    vec![ToolSpec {
        name: "docker_events",
        title: "Collect a bounded window of Docker events",
        description: describe_deadline(
            "Collect events emitted by the daemon until the deadline elapses; this is a bounded snapshot, not a live stream",
            SHORT_DEADLINE_MS,
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "event_type": {"type": "string"},
                "labels": {"type": "object", "additionalProperties": {"type": "string"}}
            },
            "required": [],
            "additionalProperties": false
        }),
        capabilities: &["engine"],
        idempotent: true,
        default_deadline_ms: SHORT_DEADLINE_MS,
        handler: Arc::new(Events),
    }]
}
