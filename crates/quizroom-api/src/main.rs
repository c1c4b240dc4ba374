//! Quizroom API server entry point.

use std::sync::Arc;

use quizroom_api::config::AppConfig;
use quizroom_api::error::AppError;
use quizroom_api::state::AppState;
use quizroom_api::transport::{LogTransport, WebhookTransport};
use quizroom_api::{build_router, telemetry};
use quizroom_core::clock::SystemClock;
use quizroom_engine::{MessagingTransport, QuizEngine};
use quizroom_mechanics::MechanicRegistry;
use quizroom_store::MemoryRepository;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    let provider = telemetry::init(config.otlp_endpoint.as_deref())?;

    info!("Starting Quizroom API server");

    let transport: Arc<dyn MessagingTransport> = match &config.bot_webhook_url {
        Some(url) => {
            info!(url = %url, "Delivering prompts through the bot bridge");
            Arc::new(WebhookTransport::new(url.clone())?)
        }
        None => {
            warn!("BOT_WEBHOOK_URL not set, prompts are only logged");
            Arc::new(LogTransport)
        }
    };

    let engine = Arc::new(QuizEngine::new(
        Arc::new(MemoryRepository::new()),
        Arc::new(SystemClock),
        Arc::new(MechanicRegistry::standard()),
        transport,
        config.engine_settings(),
    ));

    if let Some(report) = engine.load_scenario().await? {
        info!(
            path = %report.path.display(),
            steps = report.step_count,
            digest = %report.digest,
            "Scenario ready"
        );
    }

    let app = build_router(AppState::new(engine));

    let addr = config.socket_addr()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    telemetry::shutdown(provider);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
