pub mod history_repository;
pub mod openai_tts_repository;
pub mod tts_repository;

pub use history_repository::{HistoryRepository, PgHistoryRepository};
pub use openai_tts_repository::OpenAiTtsRepository;
pub use tts_repository::{ProviderError, TtsRepository};
