//! Process entry: flags, logging and transport selection.

pub mod error;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use clap::Parser;
use rmcp::{ServiceExt, transport::stdio};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::EtapiConfig;
use crate::etapi::{TriliumClient, install_crypto_provider};
use crate::mcp::{TriliumServer, create_mcp_service};
use error::{AppError, AppResult};

#[derive(Parser, Debug)]
#[command(name = "trilium-mcp")]
#[command(author, version, about = "MCP server for Trilium's ETAPI", long_about = None)]
pub struct Cli {
    /// Trilium ETAPI base URL, e.g. http://localhost:8080/etapi
    #[arg(long, env = "TRILIUM_ETAPI_URL")]
    pub etapi_url: Option<String>,

    /// ETAPI token (Trilium: Options > ETAPI)
    #[arg(long, env = "TRILIUM_ETAPI_TOKEN", hide_env_values = true)]
    pub etapi_token: Option<String>,

    /// Serve Streamable HTTP on this address (at /mcp) instead of stdio
    #[arg(long, value_name = "ADDR")]
    pub http: Option<SocketAddr>,
}

/// Initialize tracing subscriber with env filter
///
/// Logs go to stderr: stdout carries the protocol in stdio mode.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trilium_mcp=info,tower_http=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .init();
}

/// Parse flags, validate configuration and serve until the client goes away.
pub async fn run() -> AppResult<()> {
    // .env only fills variables that are not already set
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_tracing();

    let config = EtapiConfig::new(cli.etapi_url, cli.etapi_token)?;
    install_crypto_provider();
    let client = Arc::new(TriliumClient::new(&config)?);
    info!(base_url = config.base_url(), "Connecting to Trilium ETAPI");

    match cli.http {
        Some(addr) => serve_http(addr, client).await,
        None => serve_stdio(client).await,
    }
}

async fn serve_stdio(client: Arc<TriliumClient>) -> AppResult<()> {
    let service = TriliumServer::new(client)
        .serve(stdio())
        .await
        .map_err(|e| AppError::Transport {
            message: e.to_string(),
        })?;
    info!("Serving MCP over stdio");

    service.waiting().await.map_err(|e| AppError::Transport {
        message: e.to_string(),
    })?;
    info!("MCP client disconnected, shutting down");
    Ok(())
}

async fn serve_http(addr: SocketAddr, client: Arc<TriliumClient>) -> AppResult<()> {
    let ct = CancellationToken::new();
    let app = Router::new()
        .nest_service("/mcp", create_mcp_service(client, ct.clone()))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("MCP server listening on http://{}/mcp", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
            ct.cancel();
        })
        .await?;
    Ok(())
}
