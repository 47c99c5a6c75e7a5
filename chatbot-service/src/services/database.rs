use super::store::{ChatbotStore, UpsertOutcome};
use crate::models::{
    default_auto_replies, default_greeting_message, default_is_active, Chatbot, ChatbotFields,
};
use async_trait::async_trait;
use chrono::Utc;
use mongodb::{
    bson::{doc, oid::ObjectId, Bson, DateTime as BsonDateTime, Document},
    options::{FindOneAndUpdateOptions, FindOneOptions, IndexOptions, ReturnDocument},
    Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;

pub const CHATBOT_COLLECTION: &str = "chatbot";

#[derive(Clone)]
pub struct ChatbotDb {
    client: MongoClient,
    db: Database,
}

impl ChatbotDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(database = %database, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to create MongoDB client: {}", e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "MongoDB client ready");
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for chatbot-service");

        let chatbots = self.chatbots();

        // One configuration per owner
        let user_email_index = IndexModel::builder()
            .keys(doc! { "user_email": 1 })
            .options(
                IndexOptions::builder()
                    .name("user_email_unique".to_string())
                    .unique(true)
                    .build(),
            )
            .build();

        chatbots
            .create_index(user_email_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create user_email index: {}", e);
                AppError::from(e)
            })?;
        tracing::info!("Created unique index on chatbot.user_email");

        let updated_index = IndexModel::builder()
            .keys(doc! { "updated_at": -1 })
            .options(
                IndexOptions::builder()
                    .name("updated_at_idx".to_string())
                    .build(),
            )
            .build();

        chatbots
            .create_index(updated_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create updated_at index: {}", e);
                AppError::from(e)
            })?;
        tracing::info!("Created index on chatbot.updated_at");

        Ok(())
    }

    pub fn chatbots(&self) -> Collection<Chatbot> {
        self.db.collection(CHATBOT_COLLECTION)
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }
}

/// Split supplied fields into the `$set` and `$setOnInsert` halves of an
/// upsert. A field appears in exactly one of the two documents. `id` only
/// lands on insert, so seeing it come back marks the write as a create.
fn upsert_update(fields: ChatbotFields, id: ObjectId, now: BsonDateTime) -> Document {
    let mut set = doc! { "updated_at": now };
    let mut set_on_insert = doc! { "_id": id, "created_at": now };

    match fields.is_active {
        Some(is_active) => set.insert("is_active", is_active),
        None => set_on_insert.insert("is_active", default_is_active()),
    };
    match fields.webhook_url {
        Some(webhook_url) => set.insert("webhook_url", webhook_url),
        None => set_on_insert.insert("webhook_url", Bson::Null),
    };
    match fields.greeting_message {
        Some(greeting_message) => set.insert("greeting_message", greeting_message),
        None => set_on_insert.insert("greeting_message", default_greeting_message()),
    };
    match fields.auto_replies {
        Some(auto_replies) => set.insert("auto_replies", auto_replies),
        None => set_on_insert.insert("auto_replies", default_auto_replies()),
    };

    doc! { "$set": set, "$setOnInsert": set_on_insert }
}

#[async_trait]
impl ChatbotStore for ChatbotDb {
    #[tracing::instrument(skip(self))]
    async fn find_by_owner(&self, user_email: &str) -> Result<Option<Chatbot>, AppError> {
        let options = FindOneOptions::builder()
            .sort(doc! { "updated_at": -1 })
            .build();

        self.chatbots()
            .find_one(doc! { "user_email": user_email }, options)
            .await
            .map_err(|e| {
                tracing::error!("Failed to look up chatbot config: {}", e);
                AppError::from(e)
            })
    }

    #[tracing::instrument(skip(self, fields))]
    async fn upsert(
        &self,
        user_email: &str,
        fields: ChatbotFields,
    ) -> Result<UpsertOutcome, AppError> {
        let insert_id = ObjectId::new();
        let update = upsert_update(fields, insert_id, BsonDateTime::from_chrono(Utc::now()));
        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();

        let chatbot = self
            .chatbots()
            .find_one_and_update(doc! { "user_email": user_email }, update, options)
            .await
            .map_err(|e| {
                tracing::error!("Failed to upsert chatbot config: {}", e);
                AppError::from(e)
            })?;

        let chatbot = chatbot.ok_or_else(|| {
            AppError::DatabaseError(anyhow::anyhow!(
                "upsert for {} returned no document",
                user_email
            ))
        })?;

        Ok(UpsertOutcome {
            created: chatbot.id == Some(insert_id),
            chatbot,
        })
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }

    async fn list_collection_names(&self) -> Result<Vec<String>, AppError> {
        Ok(self.db.list_collection_names(None).await?)
    }
}
