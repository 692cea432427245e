use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub log_format: LogFormat,
    // OpenAI TTS
    pub openai_api_key: String,
    pub openai_tts_model: String,
    pub max_chunk_chars: usize,
    // Audio artifacts
    pub audio_dir: String,
    pub merge_enabled: bool,
    pub ffmpeg_path: String,
    pub merge_fallback: bool,
    pub merge_timeout_secs: u64,
    pub voices_file: Option<String>,
    // Edge protection
    pub rate_limit_max_requests: u32,
    pub rate_limit_window_secs: u64,
    pub trust_proxy: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let config = Config {
            database_url: env::var("DATABASE_URL")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()?,
            environment: match env::var("ENVIRONMENT").as_deref() {
                Ok("production") => Environment::Production,
                _ => Environment::Development,
            },
            log_format: match env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            openai_api_key: env::var("OPENAI_API_KEY")?,
            openai_tts_model: env::var("OPENAI_TTS_MODEL").unwrap_or_else(|_| "tts-1".to_string()),
            max_chunk_chars: env::var("TTS_MAX_CHUNK_CHARS")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()?,
            audio_dir: env::var("AUDIO_DIR").unwrap_or_else(|_| "public/audio".to_string()),
            merge_enabled: parse_flag("AUDIO_MERGE_ENABLED", true),
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            merge_fallback: parse_flag("AUDIO_MERGE_FALLBACK", false),
            merge_timeout_secs: env::var("AUDIO_MERGE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()?,
            voices_file: env::var("VOICES_FILE").ok().filter(|s| !s.is_empty()),
            rate_limit_max_requests: env::var("RATE_LIMIT_MAX_REQUESTS")
                .unwrap_or_else(|_| "100".to_string())
                .parse()?,
            rate_limit_window_secs: env::var("RATE_LIMIT_WINDOW_SECS")
                .unwrap_or_else(|_| "900".to_string())
                .parse()?,
            trust_proxy: parse_flag("TRUST_PROXY", false),
        };

        if config.max_chunk_chars == 0 {
            return Err("TTS_MAX_CHUNK_CHARS must be greater than zero".into());
        }

        Ok(config)
    }
}

fn parse_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .map(|s| matches!(s.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(default)
}
