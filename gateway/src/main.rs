//! CLI entrypoint: parse flags, assemble the layered configuration,
//! connect to the Docker daemon, probe its capabilities, build the
//! filtered tool registry, and serve `/mcp` until a shutdown signal.

mod auth;
mod concurrency;
mod config;
mod error;
mod http;
mod prompts;
mod registry;
mod schema;
mod state;
mod tools;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::{CliOverrides, ConfigLoader, GatewayConfig, LogFormat};
use docker_adapter::DockerClient;
use mcp_core::server::{McpServer, McpServerConfig};

const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(2);
const STARTUP_PROBE_DEADLINE: Duration = Duration::from_secs(5);

/// MCP gateway exposing Docker Engine and Swarm management to LM clients.
#[derive(Debug, Parser)]
#[command(name = "mcp-docker-gateway", version)]
struct Cli {
    /// Path to a YAML configuration file.
    #[arg(long)]
    config: Option<String>,

    /// Address to bind the HTTP listener to, e.g. "0.0.0.0:8000".
    #[arg(long)]
    listen_addr: Option<String>,

    /// Docker daemon endpoint, e.g. "unix:///var/run/docker.sock".
    #[arg(long)]
    docker_host: Option<String>,

    /// Log verbosity filter, e.g. "info", "debug", "gateway=debug".
    #[arg(long)]
    log_level: Option<String>,

    /// Log output format: "compact" or "json".
    #[arg(long)]
    log_format: Option<String>,
}

fn init_tracing(config: &GatewayConfig) {
    let env_filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| {
        eprintln!("invalid log level '{}', falling back to info", config.log_level);
        EnvFilter::new("info")
    });

    let subscriber = tracing_subscriber::fmt().with_env_filter(env_filter);
    match &config.log_format {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Compact => subscriber.compact().init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, starting graceful shutdown"),
        _ = terminate => info!("received SIGTERM, starting graceful shutdown"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let overrides = CliOverrides {
        config_path: cli.config.clone(),
        listen_addr: cli.listen_addr.clone(),
        docker_host: cli.docker_host.clone(),
        log_level: cli.log_level.clone(),
        log_format: cli.log_format.clone(),
    };

    let config = ConfigLoader::load(&overrides).context("failed to assemble gateway configuration")?;
    init_tracing(&config);

    info!(listen_addr = %config.listen_addr, "starting mcp-docker-gateway");

    let docker = Arc::new(
        DockerClient::connect(config.docker_host.as_deref()).context("failed to connect to Docker daemon")?,
    );

    let capabilities = docker
        .capabilities(STARTUP_PROBE_DEADLINE)
        .await
        .context("failed to probe Docker daemon capabilities")?;
    info!(?capabilities, "probed Docker daemon capabilities");

    if !capabilities.swarm_manager {
        warn!("daemon is not a swarm manager; swarm-manager tools will be hidden from the catalog");
    }

    let concurrency = Arc::new(concurrency::Concurrency::new(
        config.max_concurrent_docker_calls,
        config.fanout_max_parallel,
    ));
    let config = Arc::new(config);

    let tool_registry = Arc::new(registry::DockerToolRegistry::new(
        capabilities,
        Arc::clone(&docker),
        concurrency,
        Arc::clone(&config),
    ));

    let gateway_state = state::GatewayState::new(tool_registry, Arc::clone(&config));
    let server = Arc::new(McpServer::new(McpServerConfig::default(), gateway_state));

    let app = http::build_router(server, Arc::clone(&docker), &config);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;

    info!(listen_addr = %config.listen_addr, "mcp-docker-gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server exited with an error")?;

    tokio::time::sleep(SHUTDOWN_GRACE_PERIOD).await;
    docker.shutdown().await;
    info!("mcp-docker-gateway shutdown complete");

    Ok(())
}
