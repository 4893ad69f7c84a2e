//! ServerBuilder for assembling and serving the HTTP application

use axum::Router;
use tokio::net::TcpListener;

use super::router::build_router;
use super::state::AppState;
use crate::config::{AppConfig, ConfigError};
use crate::core::store::StoreError;

/// Errors raised while starting or running the server
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("server I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Builder for the HTTP server
///
/// Uses the configured storage backend unless a state is supplied.
///
/// # Example
///
/// ```ignore
/// ServerBuilder::new(AppConfig::load()?)
///     .serve()
///     .await?;
/// ```
pub struct ServerBuilder {
    config: AppConfig,
    state: Option<AppState>,
}

impl ServerBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Serve over pre-built state, e.g. stores shared with a test
    pub fn with_state(mut self, state: AppState) -> Self {
        self.state = Some(state);
        self
    }

    /// Build the router
    pub async fn build(self) -> Result<Router, ServerError> {
        let state = match self.state {
            Some(state) => state,
            None => AppState::from_config(self.config).await?,
        };
        Ok(build_router(state)?)
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the configured address
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    pub async fn serve(self) -> Result<(), ServerError> {
        let addr = self.config.server.address();
        let app = self.build().await?;
        let listener = TcpListener::bind(&addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageBackend;

    fn config() -> AppConfig {
        let mut config = AppConfig::default();
        config.token.secret = "test-secret".into();
        config
    }

    #[tokio::test]
    async fn test_build_with_default_memory_backend() {
        assert!(ServerBuilder::new(config()).build().await.is_ok());
    }

    #[tokio::test]
    async fn test_bad_gate_header_fails_build() {
        let mut config = config();
        config.token.header = "not a header".into();
        let err = ServerBuilder::new(config).build().await.unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[cfg(not(feature = "mongodb_backend"))]
    #[tokio::test]
    async fn test_mongodb_backend_requires_feature() {
        let mut config = config();
        config.storage.backend = StorageBackend::Mongodb;
        let err = ServerBuilder::new(config).build().await.unwrap_err();
        assert!(matches!(err, ServerError::Store(_)));
    }
}
