pub mod merger;
pub mod storage;

pub use merger::{AudioMerger, ChainedAudioMerger, MergeOutcome, MergeStrategy};
pub use storage::{estimate_duration_secs, AudioStorage};
