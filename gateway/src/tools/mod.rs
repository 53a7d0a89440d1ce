//! Tool definitions and handlers, one module per Docker resource domain.
//!
//! Each tool is a `ToolHandler` implementation paired with the metadata
//! the Tool Registry needs (name, schema, required capability, default
//! deadline). Handlers are pure functions over `(validated-args, adapter,
//! ctx)`: they never reach back into the registry or router.

pub mod configs;
pub mod containers;
pub mod events;
pub mod images;
pub mod networks;
pub mod nodes;
pub mod secrets;
pub mod services;
pub mod stacks;
pub mod volumes;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::concurrency::Concurrency;
use crate::error::GatewayError;
use docker_adapter::DockerClient;

/// Everything a handler needs to reach the Docker daemon and respect its
/// deadline and concurrency budget.
pub struct ToolContext {
    pub docker: Arc<DockerClient>,
    pub concurrency: Arc<Concurrency>,
    pub deadline: Duration,
}

/// Common interface every tool implements: `run` over validated arguments,
/// returning the JSON value placed under `structuredContent`.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn run(&self, args: Value, ctx: &ToolContext) -> Result<Value, GatewayError>;
}

/// Short read/list/inspect tools default to 10s.
pub const SHORT_DEADLINE_MS: u64 = 10_000;
/// `pull_image` and `deploy_stack` default to 120s.
pub const LONG_DEADLINE_MS: u64 = 120_000;
/// All other mutating tools default to 30s.
pub const MUTATING_DEADLINE_MS: u64 = 30_000;

pub struct ToolSpec {
    pub name: &'static str,
    pub title: &'static str,
    pub description: String,
    pub input_schema: Value,
    pub capabilities: &'static [&'static str],
    pub idempotent: bool,
    pub default_deadline_ms: u64,
    pub handler: Arc<dyn ToolHandler>,
}

/// Assemble the full tool catalog. Order is not significant here; the
/// registry sorts alphabetically by name before exposing it.
pub fn all_tool_specs() -> Vec<ToolSpec> {
    let mut specs = Vec::new();
    specs.extend(containers::specs());
    specs.extend(images::specs());
    specs.extend(services::specs());
    specs.extend(nodes::specs());
    specs.extend(stacks::specs());
    specs.extend(networks::specs());
    specs.extend(volumes::specs());
    specs.extend(secrets::specs());
    specs.extend(configs::specs());
    specs.extend(events::specs());
    specs
}

pub(crate) fn describe_deadline(description: &str, deadline_ms: u64) -> String {
    format!("{description} (default timeout {}s)", deadline_ms / 1000)
}
