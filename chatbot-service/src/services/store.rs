use crate::models::{Chatbot, ChatbotFields};
use async_trait::async_trait;
use service_core::error::AppError;

/// Result of an upsert: the stored record and whether this write inserted it.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertOutcome {
    pub chatbot: Chatbot,
    pub created: bool,
}

/// Access to persisted chatbot configurations, keyed by owner email.
#[async_trait]
pub trait ChatbotStore: Send + Sync {
    /// Most recently updated configuration for `user_email`, if any.
    async fn find_by_owner(&self, user_email: &str) -> Result<Option<Chatbot>, AppError>;

    /// Merge `fields` into the owner's configuration, creating it with schema
    /// defaults on first write.
    async fn upsert(
        &self,
        user_email: &str,
        fields: ChatbotFields,
    ) -> Result<UpsertOutcome, AppError>;

    async fn health_check(&self) -> Result<(), AppError>;

    async fn list_collection_names(&self) -> Result<Vec<String>, AppError>;
}
