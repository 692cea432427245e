use async_openai::{config::OpenAIConfig, Client};
use std::sync::Arc;
use text_to_audio_backend::controllers::{audio::AudioController, history::HistoryController};
use text_to_audio_backend::domain::conversion::{ConversionService, VoiceCatalog};
use text_to_audio_backend::domain::history::HistoryService;
use text_to_audio_backend::infrastructure::audio::{AudioStorage, ChainedAudioMerger};
use text_to_audio_backend::infrastructure::config::{Config, LogFormat};
use text_to_audio_backend::infrastructure::db::{check_connection, create_pool, run_migrations};
use text_to_audio_backend::infrastructure::http::start_http_server;
use text_to_audio_backend::infrastructure::repositories::{
    OpenAiTtsRepository, PgHistoryRepository,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        environment = ?config.environment,
        "Starting text-to-audio backend on {}:{}",
        config.host,
        config.port
    );

    // Create database connection pool
    let pool = create_pool(&config.database_url).await?;
    tracing::info!("Database connection pool created");

    check_connection(&pool).await?;
    run_migrations(&pool).await?;
    tracing::info!("Database connection verified and migrations applied");

    let voices = match &config.voices_file {
        Some(path) => VoiceCatalog::from_json_file(path)?,
        None => VoiceCatalog::builtin(),
    };
    tracing::info!(
        voices = voices.list().len(),
        source = config.voices_file.as_deref().unwrap_or("builtin"),
        "Voice catalog loaded"
    );

    let storage = AudioStorage::new(&config.audio_dir);
    storage.ensure_dir().await?;
    tracing::info!(audio_dir = %storage.dir().display(), "Audio storage ready");

    let merger = ChainedAudioMerger::from_config(&config);
    tracing::info!(
        strategies = ?merger.strategies(),
        "Audio merge strategies configured"
    );
    if merger.strategies().is_empty() {
        tracing::warn!(
            "Audio merging is disabled, multi-part conversions will have no merged file"
        );
    }

    let openai_client =
        Client::with_config(OpenAIConfig::new().with_api_key(&config.openai_api_key));

    let pool = Arc::new(pool);
    let config = Arc::new(config);

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Instantiate repositories (inject db pool and provider client)
    tracing::info!("Instantiating repositories...");
    let history_repo = Arc::new(PgHistoryRepository::new(pool.clone()));
    let tts_repo = Arc::new(OpenAiTtsRepository::new(
        Arc::new(openai_client),
        config.openai_tts_model.clone(),
    ));

    // 2. Instantiate services (inject repositories)
    tracing::info!("Instantiating services...");
    let storage = Arc::new(storage);
    let conversion_service = Arc::new(ConversionService::new(
        tts_repo,
        history_repo.clone(),
        Arc::new(merger),
        storage.clone(),
        Arc::new(voices),
        config.max_chunk_chars,
    ));
    let history_service = Arc::new(HistoryService::new(history_repo));

    // 3. Instantiate controllers (inject services)
    tracing::info!("Instantiating controllers...");
    let audio_controller = Arc::new(AudioController::new(conversion_service, storage));
    let history_controller = Arc::new(HistoryController::new(history_service));

    // Start HTTP server with all routes
    start_http_server(pool, config, audio_controller, history_controller).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "text_to_audio_backend=debug,tower_http=debug".into())
    };

    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(filter())
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter())
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
