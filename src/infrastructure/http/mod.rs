use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue},
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::{
        predicate::{NotForContentType, Predicate},
        CompressionLayer, DefaultPredicate,
    },
    cors::CorsLayer,
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::infrastructure::config::Config;
use crate::infrastructure::db::DbPool;
use crate::{
    controllers::{audio::AudioController, health, history::HistoryController},
    infrastructure::identity::{
        client_identity_middleware, rate_limit_middleware, request_id_middleware, RateLimiter,
    },
};

/// JSON bodies above this size are rejected with 413
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Headers added to every response unless a handler already set them
pub const SECURITY_HEADERS: &[(&str, &str)] = &[
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "SAMEORIGIN"),
    ("referrer-policy", "no-referrer"),
    ("x-dns-prefetch-control", "off"),
    ("x-download-options", "noopen"),
    ("x-permitted-cross-domain-policies", "none"),
    ("cross-origin-opener-policy", "same-origin"),
    ("origin-agent-cluster", "?1"),
    ("strict-transport-security", "max-age=15552000; includeSubDomains"),
    ("x-xss-protection", "0"),
];

fn with_security_headers(router: Router) -> Router {
    SECURITY_HEADERS.iter().fold(router, |router, &(name, value)| {
        router.layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        ))
    })
}

/// Build the application router with every route and layer
pub fn build_router(
    pool: Arc<DbPool>,
    trust_proxy: bool,
    rate_limiter: Arc<RateLimiter>,
    audio_controller: Arc<AudioController>,
    history_controller: Arc<HistoryController>,
) -> Router {
    let audio_routes = Router::new()
        .route("/api/audio/voices", get(AudioController::list_voices))
        .route("/api/audio/convert", post(AudioController::convert))
        .route("/api/audio/:filename", get(AudioController::serve_audio))
        .with_state(audio_controller);

    let history_routes = Router::new()
        .route(
            "/api/history",
            get(HistoryController::list).delete(HistoryController::delete_all),
        )
        .route("/api/history/stats", get(HistoryController::stats))
        .route("/api/history/:id", delete(HistoryController::delete_one))
        .with_state(history_controller);

    let router = Router::new()
        .route("/api/health", get(health::health))
        .route("/api/health/ready", get(health::health_ready))
        .with_state(pool)
        .merge(audio_routes)
        .merge(history_routes)
        // identity must be resolved before the limiter counts the request
        .layer(middleware::from_fn_with_state(
            rate_limiter,
            rate_limit_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            trust_proxy,
            client_identity_middleware,
        ))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        // mp3 is already compressed
        .layer(CompressionLayer::new().compress_when(
            DefaultPredicate::new().and(NotForContentType::const_new("audio/")),
        ))
        .layer(CorsLayer::permissive());

    with_security_headers(router)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server with all routes configured
pub async fn start_http_server(
    pool: Arc<DbPool>,
    config: Arc<Config>,
    audio_controller: Arc<AudioController>,
    history_controller: Arc<HistoryController>,
) -> Result<(), Box<dyn std::error::Error>> {
    let rate_limiter = Arc::new(RateLimiter::from_config(&config));

    let app = build_router(
        pool,
        config.trust_proxy,
        rate_limiter,
        audio_controller,
        history_controller,
    );

    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
