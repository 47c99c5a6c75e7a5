pub mod chatbot;
pub mod health;

pub use chatbot::{get_chatbot, upsert_chatbot};
pub use health::{health_check, hello, metrics_endpoint, readiness_check, root, test_database};
