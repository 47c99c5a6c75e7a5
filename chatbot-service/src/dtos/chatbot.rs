use crate::models::{
    default_auto_replies, default_greeting_message, default_is_active, Chatbot, ChatbotFields,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidateUrl, ValidationError, ValidationErrors};

pub const MAX_AUTO_REPLY_LENGTH: usize = 500;

/// Query of `GET /api/chatbot`. Any non-empty owner key is accepted; unknown
/// owners read the defaults.
#[derive(Debug, Deserialize, Validate)]
pub struct ChatbotQuery {
    #[validate(length(min = 1, message = "user_email must not be empty"))]
    pub user_email: String,
}

/// Body of `POST /api/chatbot`. Only `user_email` is required; omitted
/// fields keep their stored value, or the schema default on first write.
#[derive(Debug, Deserialize, Validate)]
pub struct UpsertChatbotRequest {
    #[validate(email(message = "Invalid email address"))]
    pub user_email: String,
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub webhook_url: Option<Option<String>>,
    #[validate(length(
        min = 1,
        max = 1000,
        message = "Greeting message must be between 1 and 1000 characters"
    ))]
    pub greeting_message: Option<String>,
    #[validate(length(max = 20, message = "At most 20 auto replies are allowed"))]
    pub auto_replies: Option<Vec<String>>,
}

// Distinguishes `"webhook_url": null` (clear) from an absent key (keep).
fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl UpsertChatbotRequest {
    /// Derived field checks plus the ones the derive cannot express:
    /// webhook URL syntax and per-entry auto reply length.
    pub fn validate_request(&self) -> Result<(), ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        if let Some(Some(url)) = &self.webhook_url {
            if !url.validate_url() {
                errors.add(
                    "webhook_url",
                    invalid("url", "Webhook URL must be a valid URL"),
                );
            }
        }

        if let Some(replies) = &self.auto_replies {
            let out_of_range = replies.iter().any(|reply| {
                let len = reply.chars().count();
                len == 0 || len > MAX_AUTO_REPLY_LENGTH
            });
            if out_of_range {
                errors.add(
                    "auto_replies",
                    invalid(
                        "length",
                        "Each auto reply must be between 1 and 500 characters",
                    ),
                );
            }
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn into_parts(self) -> (String, ChatbotFields) {
        (
            self.user_email,
            ChatbotFields {
                is_active: self.is_active,
                webhook_url: self.webhook_url,
                greeting_message: self.greeting_message,
                auto_replies: self.auto_replies,
            },
        )
    }
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// Wire shape of a chatbot configuration. `_id` and the timestamps are
/// absent on a synthesized default that has never been stored.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatbotResponse {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_email: String,
    pub is_active: bool,
    pub webhook_url: Option<String>,
    pub greeting_message: String,
    pub auto_replies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl ChatbotResponse {
    pub fn defaults_for(user_email: String) -> Self {
        Self {
            id: None,
            user_email,
            is_active: default_is_active(),
            webhook_url: None,
            greeting_message: default_greeting_message(),
            auto_replies: default_auto_replies(),
            created_at: None,
            updated_at: None,
        }
    }
}

impl From<Chatbot> for ChatbotResponse {
    fn from(chatbot: Chatbot) -> Self {
        Self {
            id: chatbot.id.map(|id| id.to_hex()),
            user_email: chatbot.user_email,
            is_active: chatbot.is_active,
            webhook_url: chatbot.webhook_url,
            greeting_message: chatbot.greeting_message,
            auto_replies: chatbot.auto_replies,
            created_at: Some(chatbot.created_at.to_rfc3339()),
            updated_at: Some(chatbot.updated_at.to_rfc3339()),
        }
    }
}
