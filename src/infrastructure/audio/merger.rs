//! Joining of segment files into one playable artifact.
//!
//! Merging is an ordered list of strategies: the external muxing tool first,
//! raw byte concatenation as a degraded fallback. The outcome says which
//! one produced the file, or why none did.

use crate::infrastructure::config::Config;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Lossless concat through ffmpeg's concat demuxer
    Ffmpeg { binary: String, timeout: Duration },
    /// Segment bytes appended in order. Playable for plain MP3 streams, not
    /// guaranteed in general.
    ByteConcat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The muxing tool produced the output
    Merged,
    /// Only the byte-concatenation fallback succeeded
    MergedFallback,
    /// No strategy produced the output
    MergeFailed(String),
}

impl MergeOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, MergeOutcome::MergeFailed(_))
    }
}

#[async_trait]
pub trait AudioMerger: Send + Sync {
    /// Merge `inputs`, in order, into `output`
    async fn merge(&self, inputs: &[PathBuf], output: &Path) -> MergeOutcome;
}

pub struct ChainedAudioMerger {
    strategies: Vec<MergeStrategy>,
}

impl ChainedAudioMerger {
    pub fn new(strategies: Vec<MergeStrategy>) -> Self {
        Self { strategies }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut strategies = Vec::new();
        if config.merge_enabled {
            strategies.push(MergeStrategy::Ffmpeg {
                binary: config.ffmpeg_path.clone(),
                timeout: Duration::from_secs(config.merge_timeout_secs),
            });
        }
        if config.merge_fallback {
            strategies.push(MergeStrategy::ByteConcat);
        }
        Self::new(strategies)
    }

    pub fn strategies(&self) -> &[MergeStrategy] {
        &self.strategies
    }
}

#[async_trait]
impl AudioMerger for ChainedAudioMerger {
    async fn merge(&self, inputs: &[PathBuf], output: &Path) -> MergeOutcome {
        if self.strategies.is_empty() {
            return MergeOutcome::MergeFailed("no merge strategy configured".to_string());
        }

        let mut failures = Vec::new();

        for strategy in &self.strategies {
            let result = match strategy {
                MergeStrategy::Ffmpeg { binary, timeout } => {
                    merge_with_ffmpeg(binary, *timeout, inputs, output).await
                }
                MergeStrategy::ByteConcat => concat_bytes(inputs, output).await,
            };

            match result {
                Ok(()) => {
                    let outcome = match strategy {
                        MergeStrategy::Ffmpeg { .. } => MergeOutcome::Merged,
                        MergeStrategy::ByteConcat => MergeOutcome::MergedFallback,
                    };
                    tracing::info!(
                        segments = inputs.len(),
                        output = %output.display(),
                        outcome = ?outcome,
                        "Audio segments merged"
                    );
                    return outcome;
                }
                Err(reason) => {
                    tracing::warn!(
                        strategy = ?strategy,
                        error = %reason,
                        "Audio merge strategy failed"
                    );
                    // never leave a half-written file behind for the next strategy
                    let _ = tokio::fs::remove_file(output).await;
                    failures.push(reason);
                }
            }
        }

        MergeOutcome::MergeFailed(failures.join("; "))
    }
}

/// Quote a path for an ffmpeg concat list entry
fn concat_list_entry(path: &Path) -> String {
    let escaped = path.display().to_string().replace('\'', r"'\''");
    format!("file '{escaped}'\n")
}

async fn merge_with_ffmpeg(
    binary: &str,
    timeout_duration: Duration,
    inputs: &[PathBuf],
    output: &Path,
) -> Result<(), String> {
    let list_path = output.with_extension("txt");
    let mut list = String::new();
    for input in inputs {
        let absolute = tokio::fs::canonicalize(input)
            .await
            .map_err(|e| format!("failed to resolve {}: {e}", input.display()))?;
        list.push_str(&concat_list_entry(&absolute));
    }

    let mut list_file = tokio::fs::File::create(&list_path)
        .await
        .map_err(|e| format!("failed to create concat list: {e}"))?;
    list_file
        .write_all(list.as_bytes())
        .await
        .map_err(|e| format!("failed to write concat list: {e}"))?;
    list_file
        .flush()
        .await
        .map_err(|e| format!("failed to write concat list: {e}"))?;
    drop(list_file);

    let result = run_ffmpeg(binary, timeout_duration, &list_path, output).await;
    let _ = tokio::fs::remove_file(&list_path).await;
    result
}

async fn run_ffmpeg(
    binary: &str,
    timeout_duration: Duration,
    list_path: &Path,
    output: &Path,
) -> Result<(), String> {
    let child = Command::new(binary)
        .args(["-y", "-hide_banner", "-loglevel", "error"])
        .args(["-f", "concat", "-safe", "0", "-i"])
        .arg(list_path)
        .args(["-c", "copy"])
        .arg(output)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| format!("failed to spawn {binary}: {e}"))?;

    let result = timeout(timeout_duration, child.wait_with_output())
        .await
        .map_err(|_| format!("{binary} timed out after {timeout_duration:?}"))?
        .map_err(|e| format!("{binary} execution failed: {e}"))?;

    if !result.status.success() {
        let code = result.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&result.stderr);
        return Err(format!("{binary} exited with code {code}: {}", stderr.trim()));
    }

    Ok(())
}

async fn concat_bytes(inputs: &[PathBuf], output: &Path) -> Result<(), String> {
    let mut merged = Vec::new();
    for input in inputs {
        let bytes = tokio::fs::read(input)
            .await
            .map_err(|e| format!("failed to read {}: {e}", input.display()))?;
        merged.extend(bytes);
    }

    tokio::fs::write(output, merged)
        .await
        .map_err(|e| format!("failed to write {}: {e}", output.display()))
}
