pub mod chatbot;
pub mod health;

pub use chatbot::{ChatbotQuery, ChatbotResponse, UpsertChatbotRequest};
pub use health::{DiagnosticsResponse, MessageResponse};
