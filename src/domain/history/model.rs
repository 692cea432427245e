use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Characters of segment text kept on a history record
pub const TEXT_PREVIEW_CHARS: usize = 200;

/// One synthesized segment, as persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRecord {
    pub id: Uuid,
    pub text: String,
    pub voice: String,
    pub audio_url: String,
    pub duration: i32,
    pub owner_key: String,
    pub created_at: DateTime<Utc>,
}

/// Record data before an id and timestamp are assigned
#[derive(Debug, Clone, PartialEq)]
pub struct NewConversionRecord {
    pub text: String,
    pub voice: String,
    pub audio_url: String,
    pub duration: i32,
    pub owner_key: String,
}

impl NewConversionRecord {
    /// Build a record, trimming and truncating the segment text to the stored
    /// preview length
    pub fn new(
        text: &str,
        voice: impl Into<String>,
        audio_url: impl Into<String>,
        duration: i32,
        owner_key: impl Into<String>,
    ) -> Self {
        Self {
            text: text.trim().chars().take(TEXT_PREVIEW_CHARS).collect(),
            voice: voice.into(),
            audio_url: audio_url.into(),
            duration,
            owner_key: owner_key.into(),
        }
    }
}

/// Per-voice conversion count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct VoiceCount {
    pub voice: String,
    pub count: i64,
}

/// Count and duration totals over an owner's records
#[derive(Debug, Clone, Copy, PartialEq, Default, FromRow)]
pub struct HistoryTotals {
    pub total_conversions: i64,
    pub total_duration: i64,
    pub average_duration: f64,
}
