#![allow(dead_code)]

use async_trait::async_trait;
use chatbot_service::config::{ChatbotConfig, Environment, StoreBackend, StoreConfig};
use chatbot_service::models::{Chatbot, ChatbotFields};
use chatbot_service::services::{ChatbotStore, InMemoryChatbotStore, UpsertOutcome};
use chatbot_service::startup::Application;
use serde_json::Value;
use service_core::config::Config as CoreConfig;
use service_core::error::AppError;
use std::sync::Arc;

pub fn test_config(backend: StoreBackend) -> ChatbotConfig {
    ChatbotConfig {
        common: CoreConfig { port: 0 }, // Random port for testing
        environment: Environment::Dev,
        service_name: "chatbot-service".to_string(),
        log_level: "info".to_string(),
        otlp_endpoint: None,
        store: StoreConfig {
            backend,
            url: None,
            database: None,
        },
    }
}

/// Store whose every operation fails with a database error carrying `message`.
pub struct FailingStore {
    pub message: String,
}

impl FailingStore {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }

    fn error(&self) -> AppError {
        AppError::DatabaseError(anyhow::anyhow!(self.message.clone()))
    }
}

#[async_trait]
impl ChatbotStore for FailingStore {
    async fn find_by_owner(&self, _user_email: &str) -> Result<Option<Chatbot>, AppError> {
        Err(self.error())
    }

    async fn upsert(
        &self,
        _user_email: &str,
        _fields: ChatbotFields,
    ) -> Result<UpsertOutcome, AppError> {
        Err(self.error())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Err(self.error())
    }

    async fn list_collection_names(&self) -> Result<Vec<String>, AppError> {
        Err(self.error())
    }
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Spawn the service backed by a fresh in-memory store.
    pub async fn spawn() -> Self {
        let store: Arc<dyn ChatbotStore> = Arc::new(InMemoryChatbotStore::new());
        Self::spawn_with(test_config(StoreBackend::Memory), Some(store)).await
    }

    /// Spawn the service with no database configured.
    pub async fn spawn_without_store() -> Self {
        Self::spawn_with(test_config(StoreBackend::Mongo), None).await
    }

    /// Spawn the service backed by a store that always errors.
    pub async fn spawn_failing(message: &str) -> Self {
        let store: Arc<dyn ChatbotStore> = Arc::new(FailingStore::new(message));
        Self::spawn_with(test_config(StoreBackend::Mongo), Some(store)).await
    }

    pub async fn spawn_with(config: ChatbotConfig, store: Option<Arc<dyn ChatbotStore>>) -> Self {
        let app = Application::with_store(config, store)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            client,
        }
    }

    pub async fn get_chatbot(&self, user_email: &str) -> reqwest::Response {
        self.client
            .get(format!("{}/api/chatbot", self.address))
            .query(&[("user_email", user_email)])
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_chatbot(&self, body: &Value) -> reqwest::Response {
        self.client
            .post(format!("{}/api/chatbot", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }
}
