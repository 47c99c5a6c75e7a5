pub mod chatbot;

pub use chatbot::{
    default_auto_replies, default_greeting_message, default_is_active, Chatbot, ChatbotFields,
    DEFAULT_AUTO_REPLIES, DEFAULT_GREETING_MESSAGE,
};
