use chrono::Utc;
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Public route prefix audio files are served under
pub const PUBLIC_AUDIO_PREFIX: &str = "/api/audio";

/// Prefix stored on history records
pub const RECORD_AUDIO_PREFIX: &str = "/audio";

/// Flat directory of rendered audio artifacts.
///
/// Files are named `audio_<millis>_<random>_partN.mp3` for segments and
/// `audio_<millis>_<random>_merged.mp3` for merged output.
#[derive(Debug, Clone)]
pub struct AudioStorage {
    dir: PathBuf,
}

impl AudioStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure_dir(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Unique stem shared by every artifact of one conversion
    pub fn new_artifact_stem() -> String {
        let random = Uuid::new_v4().simple().to_string();
        format!("audio_{}_{}", Utc::now().timestamp_millis(), &random[..9])
    }

    /// File name for segment `index` (1-based)
    pub fn part_file_name(stem: &str, index: usize) -> String {
        format!("{stem}_part{index}.mp3")
    }

    pub fn merged_file_name(stem: &str) -> String {
        format!("{stem}_merged.mp3")
    }

    pub fn public_url(file_name: &str) -> String {
        format!("{PUBLIC_AUDIO_PREFIX}/{file_name}")
    }

    pub fn record_url(file_name: &str) -> String {
        format!("{RECORD_AUDIO_PREFIX}/{file_name}")
    }

    /// Only plain file names inside the artifact directory are addressable
    pub fn is_valid_file_name(file_name: &str) -> bool {
        !file_name.is_empty()
            && !file_name.contains(['/', '\\'])
            && !file_name.contains("..")
            && !file_name.starts_with('.')
    }

    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    pub async fn write(&self, file_name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let path = self.path_for(file_name);
        tokio::fs::write(&path, bytes).await?;
        Ok(path)
    }

    /// Read an artifact, `None` when the name is invalid or the file is missing
    pub async fn read(&self, file_name: &str) -> io::Result<Option<Vec<u8>>> {
        if !Self::is_valid_file_name(file_name) {
            return Ok(None);
        }

        match tokio::fs::read(self.path_for(file_name)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Playback length estimate from encoded size: one second per 16000 bytes,
/// rounded up. Not derived from decoding.
pub fn estimate_duration_secs(byte_size: usize) -> i32 {
    i32::try_from(byte_size.div_ceil(16_000)).unwrap_or(i32::MAX)
}
