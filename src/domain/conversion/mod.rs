pub mod chunker;
pub mod dto;
pub mod error;
pub mod service;
pub mod voices;

pub use chunker::split_into_chunks;
pub use dto::{AudioFileResponse, ConvertRequest, ConvertResponse, VoicesResponse};
pub use error::ConversionServiceError;
pub use service::{
    AudioSegment, ConversionResult, ConversionService, ConversionServiceApi, MergedArtifact,
};
pub use voices::{VoiceCatalog, VoiceDefinition, VoiceInfo, DEFAULT_VOICE};
