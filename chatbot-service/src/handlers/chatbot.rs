use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use validator::Validate;

use crate::dtos::{ChatbotQuery, ChatbotResponse, UpsertChatbotRequest};
use crate::services::metrics::{record_default_served, record_upsert};
use crate::startup::AppState;
use service_core::error::AppError;

/// `GET /api/chatbot?user_email=...`
///
/// Owners without a stored configuration get the schema defaults; nothing is
/// persisted on read.
#[tracing::instrument(skip(state, query))]
pub async fn get_chatbot(
    State(state): State<AppState>,
    query: Result<Query<ChatbotQuery>, QueryRejection>,
) -> Result<Json<ChatbotResponse>, AppError> {
    let Query(query) = query?;
    query.validate()?;

    let store = state.store()?;

    match store.find_by_owner(&query.user_email).await? {
        Some(chatbot) => Ok(Json(chatbot.into())),
        None => {
            tracing::debug!("No chatbot config stored, serving defaults");
            record_default_served();
            Ok(Json(ChatbotResponse::defaults_for(query.user_email)))
        }
    }
}

/// `POST /api/chatbot` and `PUT /api/chatbot`
#[tracing::instrument(skip(state, payload))]
pub async fn upsert_chatbot(
    State(state): State<AppState>,
    payload: Result<Json<UpsertChatbotRequest>, JsonRejection>,
) -> Result<Json<ChatbotResponse>, AppError> {
    let Json(request) = payload?;
    request.validate_request()?;

    let store = state.store()?;

    let (user_email, fields) = request.into_parts();
    let outcome = store.upsert(&user_email, fields).await?;

    record_upsert(outcome.created);
    tracing::info!(
        chatbot_id = ?outcome.chatbot.id,
        created = outcome.created,
        "Chatbot config saved"
    );

    Ok(Json(outcome.chatbot.into()))
}
