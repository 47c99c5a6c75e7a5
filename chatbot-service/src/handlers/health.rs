use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::dtos::{DiagnosticsResponse, MessageResponse};
use crate::services::get_metrics;
use crate::startup::AppState;
use service_core::error::AppError;

const MAX_COLLECTIONS_REPORTED: usize = 10;
const MAX_ERROR_CHARS: usize = 50;

pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::new("Hello from the chatbot config service!"))
}

pub async fn hello() -> Json<MessageResponse> {
    Json(MessageResponse::new("Hello from the backend API!"))
}

/// Reports whether the database is configured and answering. Never fails:
/// store errors are folded into the `database` text.
#[tracing::instrument(skip(state))]
pub async fn test_database(State(state): State<AppState>) -> Json<DiagnosticsResponse> {
    let mut response = DiagnosticsResponse {
        backend: "✅ Running".to_string(),
        database: "❌ Not Available".to_string(),
        database_url: presence(state.config.store.url.is_some()),
        database_name: presence(state.config.store.database.is_some()),
        connection_status: "Not Connected".to_string(),
        collections: Vec::new(),
    };

    if let Some(store) = &state.store {
        response.database = "✅ Available".to_string();
        response.connection_status = "Connected".to_string();

        match store.list_collection_names().await {
            Ok(mut collections) => {
                collections.truncate(MAX_COLLECTIONS_REPORTED);
                response.collections = collections;
                response.database = "✅ Connected & Working".to_string();
            }
            Err(e) => {
                tracing::warn!("Database diagnostics failed: {}", e);
                response.database = format!("⚠️  Connected but Error: {}", truncate(&e.to_string()));
            }
        }
    }

    Json(response)
}

fn presence(set: bool) -> String {
    let label = if set { "✅ Set" } else { "❌ Not Set" };
    label.to_string()
}

fn truncate(message: &str) -> String {
    message.chars().take(MAX_ERROR_CHARS).collect()
}

/// Liveness: the process is up. Database state is informational only.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = match &state.store {
        Some(store) => match store.health_check().await {
            Ok(()) => "ok",
            Err(_) => "unavailable",
        },
        None => "not_configured",
    };

    Json(json!({
        "status": "ok",
        "service": state.config.service_name,
        "version": env!("CARGO_PKG_VERSION"),
        "database": database,
    }))
}

/// Readiness: only ready to serve chatbot requests once the store answers.
pub async fn readiness_check(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    let Some(store) = &state.store else {
        return Err(AppError::ServiceUnavailable);
    };

    store.health_check().await.map_err(|e| {
        tracing::warn!("Readiness check failed: {}", e);
        AppError::ServiceUnavailable
    })?;

    Ok(StatusCode::OK)
}

pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}
