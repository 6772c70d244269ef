//! Study API server with graceful shutdown

use axum::{middleware, Router};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower_http::services::{ServeDir, ServeFile};

use crate::error::ApiError;
use crate::middleware::{
    body_limit_layer, cors_layer, request_id_middleware, security_headers_middleware,
    timeout_middleware, tracing_middleware,
};
use crate::routes::api_router;
use crate::state::AppState;
use stance_core::ThesisCatalog;
use stance_llm::{ConfigError, LlmConfig, Metrics, ModelAdapter};
use stance_persist::{SqliteBackend, StorageBackend, StudyStore};
use stance_runtime::{Explorer, OpenAIFactory, StudyOrchestrator};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server address
    pub addr: SocketAddr,
    /// Request timeout
    pub timeout: Duration,
    /// Max request body size (bytes)
    pub max_body_size: usize,
    /// Comma-separated CORS origins
    pub cors_origins: Option<String>,
    /// Built frontend to serve for unmatched GET paths
    pub frontend_dir: Option<PathBuf>,
    /// SQLite URL for study records
    pub database_url: String,
    pub llm: LlmConfig,
}

impl ServerConfig {
    /// Create from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let llm = LlmConfig::from_lookup(&lookup)?;
        let database_url = non_empty("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?;

        // Hosting platforms hand out PORT; STANCE_PORT wins when both are set
        let port: u16 = match non_empty("STANCE_PORT").or_else(|| non_empty("PORT")) {
            Some(p) => p
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("port must be a number, got {p}")))?,
            None => 8080,
        };

        let timeout_secs: u64 = match non_empty("STANCE_TIMEOUT_SECS") {
            Some(t) => t.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("STANCE_TIMEOUT_SECS must be a number, got {t}"))
            })?,
            None => 120,
        };

        Ok(Self {
            addr: SocketAddr::from(([0, 0, 0, 0], port)),
            timeout: Duration::from_secs(timeout_secs),
            max_body_size: 1024 * 1024,
            cors_origins: non_empty("STANCE_CORS_ORIGINS"),
            frontend_dir: non_empty("STANCE_FRONTEND_DIR").map(PathBuf::from),
            database_url,
            llm,
        })
    }
}

/// Study API server
pub struct StanceServer {
    config: ServerConfig,
    app_state: AppState,
}

impl StanceServer {
    /// Connect storage and build the provider stack
    pub async fn new(config: ServerConfig) -> Result<Self, ApiError> {
        let metrics = Arc::new(Metrics::new());

        let db: Arc<dyn StorageBackend> = Arc::new(
            SqliteBackend::new(&config.database_url)
                .await
                .map_err(|e| ApiError::Internal(format!("DB Init failed: {}", e)))?,
        );
        let store = Arc::new(StudyStore::new(db));

        let provider = config.llm.build_provider();
        tracing::info!(
            provider = provider.name(),
            model = provider.model(),
            "Model provider configured"
        );
        let adapter = ModelAdapter::new(provider).with_metrics(metrics.clone());
        let catalog = Arc::new(ThesisCatalog::builtin());
        tracing::info!(theses = catalog.len(), "Thesis catalog loaded");

        let orchestrator =
            Arc::new(StudyOrchestrator::new(catalog, adapter).with_metrics(metrics.clone()));
        let explorer = Arc::new(Explorer::new(Arc::new(OpenAIFactory::new(
            config.llm.base_url.clone(),
        ))));

        let app_state = AppState::new(orchestrator, explorer, store, metrics);
        Ok(Self { config, app_state })
    }

    /// Assemble a server from prebuilt state
    pub fn with_state(config: ServerConfig, app_state: AppState) -> Self {
        Self { config, app_state }
    }

    /// Get the configured router
    pub fn router(&self) -> Router {
        let mut app = api_router(self.app_state.clone());

        if let Some(dir) = &self.config.frontend_dir {
            let index = ServeFile::new(dir.join("index.html"));
            app = app.fallback_service(ServeDir::new(dir).fallback(index));
        }

        // Apply middleware layers (order matters - bottom to top execution)
        app.layer(middleware::from_fn(security_headers_middleware))
            .layer(body_limit_layer(self.config.max_body_size))
            .layer(middleware::from_fn_with_state(
                self.config.timeout,
                timeout_middleware,
            ))
            .layer(cors_layer(self.config.cors_origins.as_deref()))
            .layer(middleware::from_fn(tracing_middleware))
            .layer(middleware::from_fn(request_id_middleware))
    }

    /// Run the server with graceful shutdown
    pub async fn run(self) -> Result<(), ApiError> {
        let app = self.router();
        let addr = self.config.addr;

        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Study API listening on http://{}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

        self.app_state.store().backend().close().await;
        if let Some(orchestrator) = self.app_state.into_orchestrator() {
            orchestrator.dispose();
        }
        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}

/// Initialize tracing subscriber
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stance_api=debug,tower_http=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("DATABASE_URL", "sqlite::memory:"),
        ]))
        .unwrap();
        assert_eq!(config.addr.port(), 8080);
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert_eq!(config.llm.model, "gpt-4-turbo");
        assert!(config.frontend_dir.is_none());
    }

    #[test]
    fn test_platform_port_fallback() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("PORT", "3000"),
        ]))
        .unwrap();
        assert_eq!(config.addr.port(), 3000);

        let config = ServerConfig::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("PORT", "3000"),
            ("STANCE_PORT", "9000"),
        ]))
        .unwrap();
        assert_eq!(config.addr.port(), 9000);
    }

    #[test]
    fn test_missing_required_values() {
        let err = ServerConfig::from_lookup(lookup(&[("DATABASE_URL", "sqlite::memory:")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref v) if v == "OPENAI_API_KEY"));

        let err = ServerConfig::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-test")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref v) if v == "DATABASE_URL"));
    }

    #[test]
    fn test_invalid_port() {
        let err = ServerConfig::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("STANCE_PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
