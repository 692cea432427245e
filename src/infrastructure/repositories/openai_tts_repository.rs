use super::tts_repository::{ProviderError, TtsRepository};
use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{CreateSpeechRequest, SpeechModel, SpeechResponseFormat, Voice},
    Client,
};
use async_trait::async_trait;
use std::sync::Arc;

/// OpenAI TTS implementation of TTS repository
pub struct OpenAiTtsRepository {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
}

impl OpenAiTtsRepository {
    pub fn new(client: Arc<Client<OpenAIConfig>>, model: String) -> Self {
        Self { client, model }
    }

    fn speech_model(&self) -> SpeechModel {
        match self.model.as_str() {
            "tts-1" => SpeechModel::Tts1,
            "tts-1-hd" => SpeechModel::Tts1Hd,
            other => SpeechModel::Other(other.to_string()),
        }
    }

    fn provider_voice(voice: &str) -> Result<Voice, ProviderError> {
        match voice.to_lowercase().as_str() {
            "alloy" => Ok(Voice::Alloy),
            "echo" => Ok(Voice::Echo),
            "fable" => Ok(Voice::Fable),
            "onyx" => Ok(Voice::Onyx),
            "nova" => Ok(Voice::Nova),
            "shimmer" => Ok(Voice::Shimmer),
            other => Err(ProviderError::new(format!(
                "Voice '{}' is not supported by OpenAI",
                other
            ))),
        }
    }
}

#[async_trait]
impl TtsRepository for OpenAiTtsRepository {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, ProviderError> {
        let start_time = std::time::Instant::now();
        let preview: String = text.chars().take(200).collect();

        tracing::info!(
            model = %self.model,
            voice = voice,
            text_length = text.chars().count(),
            text_preview = %preview,
            "Calling OpenAI TTS API"
        );

        let request = CreateSpeechRequest {
            model: self.speech_model(),
            input: text.to_string(),
            voice: Self::provider_voice(voice)?,
            response_format: Some(SpeechResponseFormat::Mp3),
            speed: None, // Defaults to 1.0
        };

        let response = self.client.audio().speech(request).await.map_err(|e| {
            let error = provider_error(e);
            tracing::error!(
                error = %error,
                status = ?error.status,
                model = %self.model,
                voice = voice,
                text_length = text.len(),
                "OpenAI TTS API call failed"
            );
            error
        })?;

        let audio_bytes = response.bytes.to_vec();
        let duration = start_time.elapsed();

        tracing::info!(
            provider = "openai",
            model = %self.model,
            voice = voice,
            latency_ms = duration.as_millis(),
            audio_size_bytes = audio_bytes.len(),
            "OpenAI TTS audio received"
        );

        Ok(audio_bytes)
    }
}

/// Keep the provider's own message; transport failures also carry the
/// response status when there was one
fn provider_error(err: OpenAIError) -> ProviderError {
    match err {
        OpenAIError::ApiError(api_error) => ProviderError::new(api_error.message),
        OpenAIError::Reqwest(reqwest_error) => ProviderError {
            status: reqwest_error.status().map(|s| s.as_u16()),
            message: reqwest_error.to_string(),
        },
        other => ProviderError::new(other.to_string()),
    }
}
