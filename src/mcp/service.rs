//! MCP Streamable HTTP service creation
//!
//! This module provides functions to create the MCP service
//! that can be integrated with an Axum router.

use std::sync::Arc;

use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
};
use tokio_util::sync::CancellationToken;

use crate::etapi::TriliumClient;

use super::server::TriliumServer;

/// Create MCP Streamable HTTP service
///
/// This function creates a StreamableHttpService that can be nested into an Axum router.
/// Every session gets its own [`TriliumServer`]; all of them share `client`.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use axum::Router;
/// use tokio_util::sync::CancellationToken;
/// # use trilium_mcp::config::EtapiConfig;
/// # use trilium_mcp::etapi::TriliumClient;
/// # use trilium_mcp::mcp::create_mcp_service;
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let config = EtapiConfig::new(Some("http://localhost:8080/etapi".into()), Some("token".into()))?;
///
/// let client = Arc::new(TriliumClient::new(&config)?);
/// let ct = CancellationToken::new();
/// let mcp_service = create_mcp_service(client, ct);
///
/// let app: Router = Router::new().nest_service("/mcp", mcp_service);
/// # Ok(())
/// # }
/// ```
pub fn create_mcp_service(
    client: Arc<TriliumClient>,
    cancellation_token: CancellationToken,
) -> StreamableHttpService<TriliumServer, LocalSessionManager> {
    // Returns io::Error to match rmcp's expected factory signature
    let service_factory = move || -> Result<TriliumServer, std::io::Error> {
        Ok(TriliumServer::new(Arc::clone(&client)))
    };

    let config = StreamableHttpServerConfig::default()
        .with_stateful_mode(true)
        .with_cancellation_token(cancellation_token);

    StreamableHttpService::new(
        service_factory,
        LocalSessionManager::default().into(),
        config,
    )
}
