use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Voices the provider renders natively
pub const PROVIDER_VOICES: &[&str] = &["alloy", "echo", "fable", "onyx", "nova", "shimmer"];

pub const DEFAULT_VOICE: &str = "alloy";

/// Directive prepended to the input for Indian-accent voices. Best effort:
/// the provider has no style parameter and may speak the directive aloud.
const INDIAN_ACCENT_PREFIX: &str = "[Speak in a warm Indian English accent] ";

/// Directive prepended to the input for Hindi-tone voices. Best effort, same
/// caveat as the accent directive.
const HINDI_TONE_PREFIX: &str = "[Speak with a natural Hindi tone and intonation] ";

/// One selectable voice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    /// Provider-native voice that renders this one
    pub base_voice: String,
    /// Best-effort stylistic directive sent as part of the input text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_prefix: Option<String>,
}

impl VoiceDefinition {
    fn native(id: &str, name: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            category: "standard".to_string(),
            base_voice: id.to_string(),
            style_prefix: None,
        }
    }

    fn derived(
        id: &str,
        name: &str,
        description: &str,
        category: &str,
        base_voice: &str,
        style_prefix: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            category: category.to_string(),
            base_voice: base_voice.to_string(),
            style_prefix: Some(style_prefix.to_string()),
        }
    }
}

/// Public shape of a voice for `GET /voices`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
}

impl From<&VoiceDefinition> for VoiceInfo {
    fn from(voice: &VoiceDefinition) -> Self {
        Self {
            id: voice.id.clone(),
            name: voice.name.clone(),
            description: voice.description.clone(),
            category: voice.category.clone(),
        }
    }
}

/// Provider voice plus optional directive a voice id resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVoice<'a> {
    pub base_voice: &'a str,
    pub style_prefix: Option<&'a str>,
}

impl ResolvedVoice<'_> {
    /// Text actually sent to the provider for one chunk
    pub fn apply(&self, chunk: &str) -> String {
        match self.style_prefix {
            Some(prefix) => format!("{prefix}{chunk}"),
            None => chunk.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum VoiceCatalogError {
    #[error("failed to read voice catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse voice catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid voice catalog: {0}")]
    Invalid(String),
}

/// The closed set of voices, loaded once at start-up
#[derive(Debug, Clone)]
pub struct VoiceCatalog {
    voices: Vec<VoiceDefinition>,
    index: HashMap<String, usize>,
}

impl VoiceCatalog {
    pub fn new(voices: Vec<VoiceDefinition>) -> Result<Self, VoiceCatalogError> {
        if voices.is_empty() {
            return Err(VoiceCatalogError::Invalid("no voices defined".to_string()));
        }

        let mut index = HashMap::with_capacity(voices.len());
        for (position, voice) in voices.iter().enumerate() {
            if !PROVIDER_VOICES.contains(&voice.base_voice.as_str()) {
                return Err(VoiceCatalogError::Invalid(format!(
                    "voice '{}' uses unknown base voice '{}'",
                    voice.id, voice.base_voice
                )));
            }
            if index.insert(voice.id.clone(), position).is_some() {
                return Err(VoiceCatalogError::Invalid(format!(
                    "duplicate voice id '{}'",
                    voice.id
                )));
            }
        }

        Ok(Self { voices, index })
    }

    /// Load a catalog from a JSON array of voice definitions
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, VoiceCatalogError> {
        let contents = std::fs::read_to_string(path)?;
        let voices: Vec<VoiceDefinition> = serde_json::from_str(&contents)?;
        Self::new(voices)
    }

    pub fn builtin() -> Self {
        let voices = builtin_voices();
        let index = voices
            .iter()
            .enumerate()
            .map(|(position, voice)| (voice.id.clone(), position))
            .collect();
        Self { voices, index }
    }

    pub fn get(&self, id: &str) -> Option<&VoiceDefinition> {
        self.index.get(id).map(|&position| &self.voices[position])
    }

    /// Resolve a voice id to the provider voice and directive that render it
    pub fn resolve(&self, id: &str) -> Option<ResolvedVoice<'_>> {
        self.get(id).map(|voice| ResolvedVoice {
            base_voice: &voice.base_voice,
            style_prefix: voice.style_prefix.as_deref(),
        })
    }

    pub fn list(&self) -> Vec<VoiceInfo> {
        self.voices.iter().map(VoiceInfo::from).collect()
    }
}

fn builtin_voices() -> Vec<VoiceDefinition> {
    vec![
        VoiceDefinition::native("alloy", "Alloy", "Clear and professional"),
        VoiceDefinition::native("echo", "Echo", "Warm and friendly"),
        VoiceDefinition::native("fable", "Fable", "Storytelling voice"),
        VoiceDefinition::native("onyx", "Onyx", "Deep and authoritative"),
        VoiceDefinition::native("nova", "Nova", "Bright and energetic"),
        VoiceDefinition::native("shimmer", "Shimmer", "Soft and melodic"),
        // Indian accent
        VoiceDefinition::derived(
            "priya",
            "Priya",
            "Friendly Indian English accent",
            "indian-accent",
            "nova",
            INDIAN_ACCENT_PREFIX,
        ),
        VoiceDefinition::derived(
            "meera",
            "Meera",
            "Calm Indian English accent",
            "indian-accent",
            "shimmer",
            INDIAN_ACCENT_PREFIX,
        ),
        VoiceDefinition::derived(
            "anjali",
            "Anjali",
            "Clear Indian English accent",
            "indian-accent",
            "alloy",
            INDIAN_ACCENT_PREFIX,
        ),
        VoiceDefinition::derived(
            "kavya",
            "Kavya",
            "Expressive Indian English accent",
            "indian-accent",
            "fable",
            INDIAN_ACCENT_PREFIX,
        ),
        VoiceDefinition::derived(
            "diya",
            "Diya",
            "Bright Indian English accent",
            "indian-accent",
            "nova",
            INDIAN_ACCENT_PREFIX,
        ),
        VoiceDefinition::derived(
            "zara",
            "Zara",
            "Warm Indian English accent",
            "indian-accent",
            "echo",
            INDIAN_ACCENT_PREFIX,
        ),
        // Hindi tone
        VoiceDefinition::derived(
            "neha",
            "Neha",
            "Gentle Hindi tone",
            "hindi-tone",
            "shimmer",
            HINDI_TONE_PREFIX,
        ),
        VoiceDefinition::derived(
            "isha",
            "Isha",
            "Energetic Hindi tone",
            "hindi-tone",
            "nova",
            HINDI_TONE_PREFIX,
        ),
        VoiceDefinition::derived(
            "riya",
            "Riya",
            "Soft Hindi tone",
            "hindi-tone",
            "shimmer",
            HINDI_TONE_PREFIX,
        ),
        VoiceDefinition::derived(
            "aisha",
            "Aisha",
            "Melodic Hindi tone",
            "hindi-tone",
            "fable",
            HINDI_TONE_PREFIX,
        ),
        VoiceDefinition::derived(
            "maya",
            "Maya",
            "Confident Hindi tone",
            "hindi-tone",
            "alloy",
            HINDI_TONE_PREFIX,
        ),
        VoiceDefinition::derived(
            "sana",
            "Sana",
            "Warm Hindi tone",
            "hindi-tone",
            "echo",
            HINDI_TONE_PREFIX,
        ),
    ]
}
