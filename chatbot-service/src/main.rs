use chatbot_service::config::ChatbotConfig;
use chatbot_service::services::init_metrics;
use chatbot_service::startup::Application;
use service_core::error::AppError;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Load configuration - fail fast if invalid
    let config = ChatbotConfig::load()?;

    init_tracing(
        &config.service_name,
        &config.log_level,
        config.otlp_endpoint.as_deref(),
    );

    init_metrics()?;

    tracing::info!(
        service = %config.service_name,
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.environment,
        store = ?config.store.backend,
        "Starting chatbot service"
    );

    let app = Application::build(config).await?;
    app.run_until_stopped().await?;

    tracing::info!("Service shutdown complete");
    Ok(())
}
