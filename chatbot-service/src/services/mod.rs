pub mod database;
pub mod memory;
pub mod metrics;
pub mod store;

pub use database::ChatbotDb;
pub use memory::InMemoryChatbotStore;
pub use metrics::{get_metrics, init_metrics};
pub use store::{ChatbotStore, UpsertOutcome};
