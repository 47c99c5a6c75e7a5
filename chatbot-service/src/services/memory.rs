use super::database::CHATBOT_COLLECTION;
use super::store::{ChatbotStore, UpsertOutcome};
use crate::models::{Chatbot, ChatbotFields};
use async_trait::async_trait;
use chrono::Utc;
use service_core::error::AppError;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Process-local store for running without MongoDB and for tests.
#[derive(Clone, Default)]
pub struct InMemoryChatbotStore {
    chatbots: Arc<RwLock<HashMap<String, Chatbot>>>,
}

impl InMemoryChatbotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.chatbots.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.chatbots.read().await.is_empty()
    }
}

#[async_trait]
impl ChatbotStore for InMemoryChatbotStore {
    async fn find_by_owner(&self, user_email: &str) -> Result<Option<Chatbot>, AppError> {
        Ok(self.chatbots.read().await.get(user_email).cloned())
    }

    async fn upsert(
        &self,
        user_email: &str,
        fields: ChatbotFields,
    ) -> Result<UpsertOutcome, AppError> {
        let now = Utc::now();
        let mut chatbots = self.chatbots.write().await;

        let outcome = match chatbots.get_mut(user_email) {
            Some(existing) => {
                existing.apply(fields, now);
                UpsertOutcome {
                    chatbot: existing.clone(),
                    created: false,
                }
            }
            None => {
                let chatbot = Chatbot::new(user_email.to_string(), fields, now);
                chatbots.insert(user_email.to_string(), chatbot.clone());
                UpsertOutcome {
                    chatbot,
                    created: true,
                }
            }
        };

        Ok(outcome)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn list_collection_names(&self) -> Result<Vec<String>, AppError> {
        if self.is_empty().await {
            Ok(Vec::new())
        } else {
            Ok(vec![CHATBOT_COLLECTION.to_string()])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_GREETING_MESSAGE;
    use std::time::Duration;

    #[tokio::test]
    async fn first_upsert_creates_one_record_with_defaults() {
        let store = InMemoryChatbotStore::new();

        let outcome = store
            .upsert("owner@example.com", ChatbotFields::default())
            .await
            .unwrap();
        let chatbot = outcome.chatbot;

        assert!(outcome.created);
        assert_eq!(store.len().await, 1);
        assert!(chatbot.id.is_some());
        assert_eq!(chatbot.greeting_message, DEFAULT_GREETING_MESSAGE);
        assert_eq!(chatbot.auto_replies.len(), 3);
        assert_eq!(chatbot.created_at, chatbot.updated_at);
    }

    #[tokio::test]
    async fn second_upsert_mutates_same_record() {
        let store = InMemoryChatbotStore::new();
        let first = store
            .upsert("owner@example.com", ChatbotFields::default())
            .await
            .unwrap()
            .chatbot;

        tokio::time::sleep(Duration::from_millis(5)).await;

        let outcome = store
            .upsert(
                "owner@example.com",
                ChatbotFields {
                    greeting_message: Some("Hello again".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let second = outcome.chatbot;

        assert!(!outcome.created);
        assert_eq!(store.len().await, 1);
        assert_eq!(second.id, first.id);
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at > first.updated_at);
        assert_eq!(second.greeting_message, "Hello again");
        assert_eq!(second.auto_replies, first.auto_replies);
    }

    #[tokio::test]
    async fn find_by_owner_returns_what_was_written() {
        let store = InMemoryChatbotStore::new();
        assert!(store.find_by_owner("owner@example.com").await.unwrap().is_none());

        let written = store
            .upsert(
                "owner@example.com",
                ChatbotFields {
                    is_active: Some(false),
                    webhook_url: Some(Some("https://hooks.example.com/a".into())),
                    auto_replies: Some(vec!["One".into(), "Two".into()]),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .chatbot;

        let read = store.find_by_owner("owner@example.com").await.unwrap();
        assert_eq!(read, Some(written));
        assert!(store.find_by_owner("other@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_within_the_same_instant_is_not_a_create() {
        let store = InMemoryChatbotStore::new();
        store
            .upsert("owner@example.com", ChatbotFields::default())
            .await
            .unwrap();

        let outcome = store
            .upsert("owner@example.com", ChatbotFields::default())
            .await
            .unwrap();
        assert!(!outcome.created);
    }

    #[tokio::test]
    async fn owners_are_isolated() {
        let store = InMemoryChatbotStore::new();
        store
            .upsert("a@example.com", ChatbotFields::default())
            .await
            .unwrap();
        store
            .upsert("b@example.com", ChatbotFields::default())
            .await
            .unwrap();

        assert_eq!(store.len().await, 2);
        assert_eq!(
            store.list_collection_names().await.unwrap(),
            vec!["chatbot".to_string()]
        );
    }
}
