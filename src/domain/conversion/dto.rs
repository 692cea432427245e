use super::service::{AudioSegment, ConversionResult};
use super::voices::VoiceInfo;
use crate::infrastructure::audio::AudioStorage;
use serde::{Deserialize, Serialize};

/// Request for POST /api/audio/convert
#[derive(Debug, Serialize, Deserialize)]
pub struct ConvertRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
}

/// Response for GET /api/audio/voices
#[derive(Debug, Serialize, Deserialize)]
pub struct VoicesResponse {
    pub voices: Vec<VoiceInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioFileResponse {
    pub url: String,
    pub duration: i64,
    pub text: String,
}

/// Response for POST /api/audio/convert
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertResponse {
    pub success: bool,
    pub audio_files: Vec<AudioFileResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged_audio_file: Option<AudioFileResponse>,
    pub total_duration: i64,
    pub total_parts: usize,
    pub voice: String,
    pub text: String,
    pub original_length: usize,
}

impl From<&AudioSegment> for AudioFileResponse {
    fn from(segment: &AudioSegment) -> Self {
        Self {
            url: AudioStorage::public_url(&segment.file_name),
            duration: i64::from(segment.duration),
            text: preview(&segment.text),
        }
    }
}

impl From<ConversionResult> for ConvertResponse {
    fn from(result: ConversionResult) -> Self {
        let text = preview(&result.text);
        let total_duration = result.total_duration();

        Self {
            success: true,
            audio_files: result.segments.iter().map(AudioFileResponse::from).collect(),
            merged_audio_file: result.merged.as_ref().map(|merged| {
                AudioFileResponse {
                    url: AudioStorage::public_url(&merged.file_name),
                    duration: total_duration,
                    text: text.clone(),
                }
            }),
            total_duration,
            total_parts: result.segments.len(),
            voice: result.voice,
            text,
            original_length: result.original_length,
        }
    }
}

const RESPONSE_PREVIEW_CHARS: usize = 100;

/// First 100 characters, with `...` appended when cut
pub fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(RESPONSE_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
