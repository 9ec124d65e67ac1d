//! Shopkeep API server entry point.

use std::sync::Arc;

use shopkeep_api::config::ApiConfig;
use shopkeep_api::error::AppError;
use shopkeep_api::routes;
use shopkeep_api::state::AppState;
use shopkeep_api::telemetry;
use shopkeep_core::clock::SystemClock;
use shopkeep_core::notify::Notifier;
use shopkeep_core::profile::ProfileRepository;
use shopkeep_gateways::llm::OpenAiCompatibleClient;
use shopkeep_gateways::sms::{LogOnlyNotifier, TwilioSmsNotifier};
use shopkeep_progression::domain::titles::TitleTable;
use shopkeep_store::memory::InMemoryProfileRepository;
use shopkeep_store::pg_profile_repository::PgProfileRepository;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = ApiConfig::from_env()?;
    let telemetry = telemetry::init(config.otlp_endpoint.as_deref())?;

    info!("Starting Shopkeep API server");

    let profiles: Arc<dyn ProfileRepository> = match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(database_url)
                .await?;
            let repository = PgProfileRepository::new(pool);
            repository.ensure_schema().await?;
            Arc::new(repository)
        }
        None => {
            warn!("DATABASE_URL not set, profiles are kept in memory and lost on restart");
            Arc::new(InMemoryProfileRepository::new())
        }
    };

    let notifier: Arc<dyn Notifier> = match &config.sms {
        Some(sms) => Arc::new(TwilioSmsNotifier::new(&sms.base_url, sms.credentials.clone())),
        None => {
            warn!("SMS credentials not set, outbound texts are only logged");
            Arc::new(LogOnlyNotifier)
        }
    };

    let titles = match &config.title_table_path {
        Some(path) => {
            let yaml = tokio::fs::read_to_string(path).await?;
            TitleTable::from_yaml_str(&yaml).map_err(|e| AppError::Config(e.to_string()))?
        }
        None => TitleTable::default(),
    };

    let generator = Arc::new(OpenAiCompatibleClient::new(
        &config.llm.base_url,
        &config.llm.model,
        config.llm.api_key.clone(),
        config.llm.timeout,
    ));

    let app_state = AppState::new(Arc::new(SystemClock), profiles, generator, notifier, titles);

    // TODO: Replace CorsLayer::permissive() with the kiosk origin once it is served from a fixed host.
    let app = routes::router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let addr = config.bind_addr()?;
    info!(%addr, model = %config.llm.model, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    telemetry.shutdown();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "could not listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
