use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

mod backend;
mod config;
mod error;
mod format;
mod mcp;
mod models;
mod resolver;
mod retriever;
mod tools;

use crate::backend::BackendClient;
use crate::config::{LegacyEnv, ServiceConfig, Transport, load_config};
use crate::mcp::McpState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    init_logging();

    info!("Starting SimDoc MCP service v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(LegacyEnv::from_env())?;

    info!(
        backend_url = %config.backend.base_url,
        timeout_secs = config.backend.timeout_secs,
        transport = %config.mcp.transport,
        "Configuration loaded"
    );

    // One client for the whole process, shared by every tool call
    let backend = Arc::new(BackendClient::new(&config.backend)?);
    probe_backend(&backend).await;

    let state = Arc::new(McpState::new(backend.clone()));

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
        }
        signal_token.cancel();
    });

    let served = match config.mcp.transport {
        Transport::Sse => serve_sse(&config, state, shutdown).await,
        Transport::Stdio => mcp::serve_stdio(state, shutdown).await,
    };

    backend.close();
    info!("Backend client closed");

    served?;
    Ok(())
}

/// Log backend reachability; the server starts either way
async fn probe_backend(backend: &BackendClient) {
    match backend.check_health().await {
        Ok(health) => {
            info!(
                base_url = %backend.base_url(),
                status = health.status.as_deref().unwrap_or("unknown"),
                "Backend connection successful"
            );
            info!(
                simulators = ?health.simulator_names(),
                "Simulators available"
            );
        }
        Err(e) => {
            error!(base_url = %backend.base_url(), error = %e, "Backend connection failed");
            warn!("Server will start but tools may not work until backend is available");
        }
    }
}

async fn serve_sse(
    config: &ServiceConfig,
    state: Arc<McpState>,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let app = mcp::mcp_router(state, &config.mcp.path, shutdown.clone());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!(path = %config.mcp.path, "Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}

fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let format = fmt::format()
        .with_target(true)
        .with_thread_ids(true)
        .compact();

    // RUST_LOG wins; otherwise LOG_LEVEL (default info) for our crate
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match std::env::var("LOG_LEVEL").map(|l| l.to_lowercase()) {
            Ok(l) if l == "warning" => "warn".to_string(),
            Ok(l) if l == "critical" => "error".to_string(),
            Ok(l) => l,
            Err(_) => "info".to_string(),
        };
        EnvFilter::try_new(format!("simdoc_service={}", level))
            .unwrap_or_else(|_| EnvFilter::new("simdoc_service=info"))
    });

    // stdout belongs to the stdio transport
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .event_format(format)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}
