use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

pub const DEFAULT_GREETING_MESSAGE: &str = "Hi! I'm your WhatsApp AI assistant.";

pub const DEFAULT_AUTO_REPLIES: [&str; 3] = [
    "What's your order number?",
    "We'll get back to you shortly.",
    "Thank you for contacting us!",
];

pub fn default_is_active() -> bool {
    true
}

pub fn default_greeting_message() -> String {
    DEFAULT_GREETING_MESSAGE.to_string()
}

pub fn default_auto_replies() -> Vec<String> {
    DEFAULT_AUTO_REPLIES.iter().map(|s| s.to_string()).collect()
}

/// A persisted chatbot configuration. One document per `user_email`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chatbot {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_email: String,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default = "default_greeting_message")]
    pub greeting_message: String,
    #[serde(default = "default_auto_replies")]
    pub auto_replies: Vec<String>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied by an upsert. `None` leaves the stored value alone;
/// for `webhook_url`, `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatbotFields {
    pub is_active: Option<bool>,
    pub webhook_url: Option<Option<String>>,
    pub greeting_message: Option<String>,
    pub auto_replies: Option<Vec<String>>,
}

impl Chatbot {
    /// Build a new record from `fields`, filling anything missing with the
    /// schema defaults.
    pub fn new(user_email: String, fields: ChatbotFields, now: DateTime<Utc>) -> Self {
        Self {
            id: Some(ObjectId::new()),
            user_email,
            is_active: fields.is_active.unwrap_or_else(default_is_active),
            webhook_url: fields.webhook_url.flatten(),
            greeting_message: fields
                .greeting_message
                .unwrap_or_else(default_greeting_message),
            auto_replies: fields.auto_replies.unwrap_or_else(default_auto_replies),
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge `fields` into this record and bump `updated_at`.
    pub fn apply(&mut self, fields: ChatbotFields, now: DateTime<Utc>) {
        if let Some(is_active) = fields.is_active {
            self.is_active = is_active;
        }
        if let Some(webhook_url) = fields.webhook_url {
            self.webhook_url = webhook_url;
        }
        if let Some(greeting_message) = fields.greeting_message {
            self.greeting_message = greeting_message;
        }
        if let Some(auto_replies) = fields.auto_replies {
            self.auto_replies = auto_replies;
        }
        self.updated_at = now;
    }
}
