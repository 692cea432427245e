use async_trait::async_trait;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use test_context::AsyncTestContext;
use testcontainers::{clients::Cli, Container};
use testcontainers_modules::postgres::Postgres;
use text_to_audio_backend::{
    controllers::{audio::AudioController, history::HistoryController},
    domain::{
        conversion::{ConversionService, VoiceCatalog},
        history::HistoryService,
    },
    infrastructure::{
        audio::{AudioStorage, ChainedAudioMerger, MergeStrategy},
        http::build_router,
        identity::RateLimiter,
        repositories::{PgHistoryRepository, ProviderError, TtsRepository},
    },
};
use tokio::net::TcpListener;
use uuid::Uuid;

pub mod db_pool;

use api_client::TestClient;
use db_pool::{DatabasePool, PooledDatabase};
use fixtures::TestFixtures;

/// Inputs containing this marker make the fake provider fail
pub const PROVIDER_FAILURE_MARKER: &str = "#provider-failure#";

/// Bytes the fake provider returns per call: two seconds of estimated audio
pub const FAKE_AUDIO_BYTES: usize = 32_000;

pub const TEST_MAX_CHUNK_CHARS: usize = 4000;

const DEFAULT_RATE_LIMIT: u32 = 10_000;

static DOCKER: Lazy<Cli> = Lazy::new(Cli::default);

static SHARED_CONTAINER: Lazy<SharedContainer> = Lazy::new(SharedContainer::new);

static DB_POOL: Lazy<DatabasePool> = Lazy::new(|| DatabasePool::new(SHARED_CONTAINER.port));

/// Shared container that lives for the duration of all tests
struct SharedContainer {
    _container: Container<'static, Postgres>,
    port: u16,
}

impl SharedContainer {
    fn new() -> Self {
        let container = DOCKER.run(Postgres::default());
        let port = container.get_host_port_ipv4(5432);

        println!("🐳 Started shared PostgreSQL container on port {}", port);

        Self {
            _container: container,
            port,
        }
    }
}

/// In-process speech provider. Records every call.
#[derive(Default)]
pub struct FakeTtsRepository {
    calls: Mutex<Vec<(String, String)>>,
}

impl FakeTtsRepository {
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl TtsRepository for FakeTtsRepository {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, ProviderError> {
        let call = {
            let mut calls = self.calls.lock();
            calls.push((text.to_string(), voice.to_string()));
            calls.len()
        };

        if text.contains(PROVIDER_FAILURE_MARKER) {
            return Err(ProviderError::new("Incorrect API key provided"));
        }

        Ok(vec![call as u8; FAKE_AUDIO_BYTES])
    }
}

pub struct TestContext {
    pub client: TestClient,
    pub fixtures: TestFixtures,
    pub tts: Arc<FakeTtsRepository>,
    pub audio_dir: PathBuf,
    _db: PooledDatabase,
}

impl TestContext {
    /// Start an app whose rate limiter allows `max_requests` per window
    pub async fn start(max_requests: u32) -> Self {
        // byte concatenation keeps merging deterministic without ffmpeg
        Self::start_with(max_requests, vec![MergeStrategy::ByteConcat]).await
    }

    /// Start an app merging with `merge_strategies`; an empty list means
    /// every merge fails
    pub async fn start_with(max_requests: u32, merge_strategies: Vec<MergeStrategy>) -> Self {
        let pooled_db = DB_POOL
            .get_database()
            .await
            .expect("Failed to get database from pool");

        let audio_dir = std::env::temp_dir().join(format!("tta-e2e-{}", Uuid::new_v4().simple()));
        let tts = Arc::new(FakeTtsRepository::default());

        let pool = Arc::new(pooled_db.pool.clone());
        let storage = Arc::new(AudioStorage::new(&audio_dir));
        let history_repo = Arc::new(PgHistoryRepository::new(pool.clone()));

        let conversion_service = Arc::new(ConversionService::new(
            tts.clone(),
            history_repo.clone(),
            Arc::new(ChainedAudioMerger::new(merge_strategies)),
            storage.clone(),
            Arc::new(VoiceCatalog::builtin()),
            TEST_MAX_CHUNK_CHARS,
        ));
        let history_service = Arc::new(HistoryService::new(history_repo));

        let app = build_router(
            pool,
            true,
            Arc::new(RateLimiter::new(
                max_requests,
                std::time::Duration::from_secs(900),
            )),
            Arc::new(AudioController::new(conversion_service, storage)),
            Arc::new(HistoryController::new(history_service)),
        );

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind listener");
        let addr = listener.local_addr().expect("Failed to get local addr");
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });

        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Self {
            client: TestClient::new(&base_url),
            fixtures: TestFixtures::new(pooled_db.pool.clone()),
            tts,
            audio_dir,
            _db: pooled_db,
        }
    }
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        Self::start(DEFAULT_RATE_LIMIT)
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async move {
            let _ = tokio::fs::remove_dir_all(&self.audio_dir).await;
        }
    }
}

/// Text of `sentences` sentences, each exactly 100 characters long
pub fn long_text(sentences: usize) -> String {
    let sentence = format!("{}.", "a".repeat(99));
    vec![sentence; sentences].join(" ")
}

/// File name part of an `/api/audio/<file>` url
pub fn file_name_of(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}
