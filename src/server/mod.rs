pub mod routes;

pub use routes::create_router;

use crate::config::Config;
use crate::error::{HiveProbeError, Result};
use crate::invoker::ToolInvoker;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Shared, read-only state for request handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub invoker: ToolInvoker,
}

impl AppState {
    pub fn new(config: Config, invoker: ToolInvoker) -> Self {
        Self {
            config: Arc::new(config),
            invoker,
        }
    }
}

/// Serves the upload endpoint until Ctrl+C.
///
/// Each request stages, searches and cleans up its own files. Requests do not
/// share staging directories, so concurrent uploads are independent.
pub async fn serve(config: Config, invoker: ToolInvoker) -> Result<()> {
    let addr: SocketAddr = config
        .server
        .listen
        .parse()
        .map_err(|e| HiveProbeError::Server {
            message: format!("invalid listen address '{}': {}", config.server.listen, e),
        })?;

    let app = create_router(AppState::new(config, invoker));

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| HiveProbeError::Server {
            message: format!("failed to bind {}: {}", addr, e),
        })?;

    info!("hiveprobe {} listening on http://{}", crate::version_info(), addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| HiveProbeError::Server {
            message: e.to_string(),
        })?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C; serving until killed");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
