use super::chunker::split_into_chunks;
use super::error::ConversionServiceError;
use super::voices::VoiceCatalog;
use crate::domain::history::NewConversionRecord;
use crate::infrastructure::audio::{estimate_duration_secs, AudioMerger, AudioStorage, MergeOutcome};
use crate::infrastructure::repositories::{HistoryRepository, TtsRepository};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

/// One rendered chunk of a conversion
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSegment {
    /// 1-based position in the conversion
    pub index: usize,
    pub text: String,
    pub file_name: String,
    pub path: PathBuf,
    pub duration: i32,
}

/// Single artifact spanning every segment
#[derive(Debug, Clone, PartialEq)]
pub struct MergedArtifact {
    pub file_name: String,
    pub path: PathBuf,
    pub outcome: MergeOutcome,
}

#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub segments: Vec<AudioSegment>,
    pub merged: Option<MergedArtifact>,
    pub voice: String,
    pub text: String,
    pub original_length: usize,
}

impl ConversionResult {
    /// Sum of per-segment estimates, whether or not a merge happened
    pub fn total_duration(&self) -> i64 {
        self.segments.iter().map(|s| i64::from(s.duration)).sum()
    }
}

pub struct ConversionService {
    tts_repo: Arc<dyn TtsRepository>,
    history_repo: Arc<dyn HistoryRepository>,
    merger: Arc<dyn AudioMerger>,
    storage: Arc<AudioStorage>,
    voices: Arc<VoiceCatalog>,
    max_chunk_chars: usize,
}

impl ConversionService {
    pub fn new(
        tts_repo: Arc<dyn TtsRepository>,
        history_repo: Arc<dyn HistoryRepository>,
        merger: Arc<dyn AudioMerger>,
        storage: Arc<AudioStorage>,
        voices: Arc<VoiceCatalog>,
        max_chunk_chars: usize,
    ) -> Self {
        Self {
            tts_repo,
            history_repo,
            merger,
            storage,
            voices,
            max_chunk_chars,
        }
    }

    pub fn voices(&self) -> &VoiceCatalog {
        &self.voices
    }
}

#[async_trait]
pub trait ConversionServiceApi: Send + Sync {
    /// Convert text to speech on behalf of `owner_key`
    ///
    /// This operation:
    /// - Validates text and voice
    /// - Splits the text into provider-sized chunks
    /// - Synthesizes and stores every chunk, in order
    /// - Merges the segments when there is more than one (never fatal)
    /// - Records one history entry per segment
    ///
    /// Any synthesis or storage failure aborts the whole conversion. Segment
    /// files already written stay on disk.
    async fn convert(
        &self,
        owner_key: &str,
        text: &str,
        voice: &str,
    ) -> Result<ConversionResult, ConversionServiceError>;
}

#[async_trait]
impl ConversionServiceApi for ConversionService {
    async fn convert(
        &self,
        owner_key: &str,
        text: &str,
        voice: &str,
    ) -> Result<ConversionResult, ConversionServiceError> {
        let start_time = std::time::Instant::now();

        // 1. Validate
        if text.trim().is_empty() {
            return Err(ConversionServiceError::Invalid("Text is required".to_string()));
        }
        let resolved = self
            .voices
            .resolve(voice)
            .ok_or_else(|| ConversionServiceError::Invalid("Invalid voice selected".to_string()))?;

        // 2. Chunk
        let chunks = split_into_chunks(text, self.max_chunk_chars);
        tracing::info!(
            owner_key = owner_key,
            voice = voice,
            base_voice = resolved.base_voice,
            styled = resolved.style_prefix.is_some(),
            text_length = text.chars().count(),
            chunk_count = chunks.len(),
            "Text split into chunks"
        );

        self.storage
            .ensure_dir()
            .await
            .map_err(|e| ConversionServiceError::Storage(e.to_string()))?;

        // 3. Synthesize and store each chunk, strictly in order
        let stem = AudioStorage::new_artifact_stem();
        let mut segments = Vec::with_capacity(chunks.len());

        for (position, chunk) in chunks.iter().enumerate() {
            let index = position + 1;
            let audio = self
                .tts_repo
                .synthesize(&resolved.apply(chunk), resolved.base_voice)
                .await
                .map_err(|e| {
                    tracing::error!(
                        owner_key = owner_key,
                        chunk_index = index,
                        chunk_count = chunks.len(),
                        status = ?e.status,
                        error = %e,
                        "Chunk synthesis failed, aborting conversion"
                    );
                    ConversionServiceError::Provider(e.message)
                })?;

            let file_name = AudioStorage::part_file_name(&stem, index);
            let path = self
                .storage
                .write(&file_name, &audio)
                .await
                .map_err(|e| ConversionServiceError::Storage(e.to_string()))?;

            tracing::debug!(
                chunk_index = index,
                audio_size = audio.len(),
                file_name = %file_name,
                "Chunk synthesized and stored"
            );

            segments.push(AudioSegment {
                index,
                text: chunk.clone(),
                file_name,
                path,
                duration: estimate_duration_secs(audio.len()),
            });
        }

        // 4. Merge, degrading silently on failure
        let merged = if segments.len() > 1 {
            self.merge_segments(&stem, &segments).await
        } else {
            None
        };

        // 5. Record one history entry per segment, all or nothing
        let records = segments
            .iter()
            .map(|segment| {
                NewConversionRecord::new(
                    &segment.text,
                    voice,
                    AudioStorage::record_url(&segment.file_name),
                    segment.duration,
                    owner_key,
                )
            })
            .collect();
        self.history_repo
            .insert_many(records)
            .await
            .map_err(|e| ConversionServiceError::Storage(e.to_string()))?;

        let result = ConversionResult {
            segments,
            merged,
            voice: voice.to_string(),
            text: text.to_string(),
            original_length: text.chars().count(),
        };

        tracing::info!(
            owner_key = owner_key,
            voice = voice,
            parts = result.segments.len(),
            merged = result.merged.is_some(),
            total_duration = result.total_duration(),
            latency_ms = start_time.elapsed().as_millis(),
            "Conversion completed"
        );

        Ok(result)
    }
}

impl ConversionService {
    async fn merge_segments(
        &self,
        stem: &str,
        segments: &[AudioSegment],
    ) -> Option<MergedArtifact> {
        let file_name = AudioStorage::merged_file_name(stem);
        let path = self.storage.path_for(&file_name);
        let inputs: Vec<PathBuf> = segments.iter().map(|s| s.path.clone()).collect();

        let outcome = self.merger.merge(&inputs, &path).await;
        if !outcome.is_success() {
            tracing::warn!(
                segments = segments.len(),
                outcome = ?outcome,
                "Merged audio unavailable, returning individual parts only"
            );
            return None;
        }

        Some(MergedArtifact {
            file_name,
            path,
            outcome,
        })
    }
}
