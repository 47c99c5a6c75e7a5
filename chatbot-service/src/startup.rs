//! Application startup and lifecycle management.

use crate::config::{ChatbotConfig, StoreBackend};
use crate::handlers;
use crate::services::{ChatbotDb, ChatbotStore, InMemoryChatbotStore};
use axum::{middleware::from_fn, routing::get, Router};
use service_core::error::AppError;
use service_core::middleware::{metrics_middleware, request_id_middleware, REQUEST_ID_HEADER};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ChatbotConfig,
    /// `None` when no database is configured; chatbot endpoints then answer 500.
    pub store: Option<Arc<dyn ChatbotStore>>,
}

impl AppState {
    pub fn store(&self) -> Result<&Arc<dyn ChatbotStore>, AppError> {
        self.store.as_ref().ok_or(AppError::DatabaseNotConfigured)
    }
}

/// Resolve the configured store. Missing or unusable Mongo settings leave the
/// service running without one.
pub async fn connect_store(config: &ChatbotConfig) -> Option<Arc<dyn ChatbotStore>> {
    match config.store.backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory chatbot store");
            let store: Arc<dyn ChatbotStore> = Arc::new(InMemoryChatbotStore::new());
            Some(store)
        }
        StoreBackend::Mongo => {
            let Some((uri, database)) = config.store.mongo_settings() else {
                tracing::warn!("DATABASE_URL or DATABASE_NAME not set, running without a database");
                return None;
            };

            let db = match ChatbotDb::connect(uri, database).await {
                Ok(db) => db,
                Err(e) => {
                    tracing::error!("Failed to connect to MongoDB: {}", e);
                    return None;
                }
            };

            if let Err(e) = db.initialize_indexes().await {
                tracing::warn!("Failed to initialize database indexes: {}", e);
            }

            let store: Arc<dyn ChatbotStore> = Arc::new(db);
            Some(store)
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/api/hello", get(handlers::hello))
        .route("/test", get(handlers::test_database))
        .route(
            "/api/chatbot",
            get(handlers::get_chatbot)
                .post(handlers::upsert_chatbot)
                .put(handlers::upsert_chatbot),
        )
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: ChatbotConfig) -> Result<Self, AppError> {
        let store = connect_store(&config).await;
        Self::with_store(config, store).await
    }

    /// Build the application around an already constructed store.
    pub async fn with_store(
        config: ChatbotConfig,
        store: Option<Arc<dyn ChatbotStore>>,
    ) -> Result<Self, AppError> {
        // Port 0 binds a random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Chatbot service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            state: AppState { config, store },
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);

        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
