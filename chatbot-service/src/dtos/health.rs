use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Best-effort report of the backend and its database, served by `GET /test`.
#[derive(Debug, Serialize, Deserialize)]
pub struct DiagnosticsResponse {
    pub backend: String,
    pub database: String,
    pub database_url: String,
    pub database_name: String,
    pub connection_status: String,
    pub collections: Vec<String>,
}
