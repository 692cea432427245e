use async_trait::async_trait;

/// Failure reported by a speech-synthesis provider
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ProviderError {
    /// Upstream HTTP status, when the failure came with one
    pub status: Option<u16>,
    pub message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }
}

/// Repository for TTS synthesis operations.
/// Abstracts the underlying TTS provider (OpenAI, ElevenLabs, etc.)
///
/// Implementations render exactly the text they are given: chunking, voice
/// styling and merging happen in the conversion service.
#[async_trait]
pub trait TtsRepository: Send + Sync {
    /// Synthesize one chunk of text with a provider-native voice
    ///
    /// Returns MP3 audio bytes
    ///
    /// # Errors
    /// Returns `ProviderError` carrying the upstream message on any transport
    /// or provider-side failure (invalid voice, quota, timeout)
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, ProviderError>;
}
