use crate::error::AppError;

/// Message returned to clients for any failed conversion
pub const CONVERSION_FAILED: &str = "Failed to convert text to audio";

#[derive(Debug, thiserror::Error)]
pub enum ConversionServiceError {
    #[error("{0}")]
    Invalid(String),
    #[error("provider error: {0}")]
    Provider(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<ConversionServiceError> for AppError {
    fn from(err: ConversionServiceError) -> Self {
        match err {
            ConversionServiceError::Invalid(msg) => AppError::BadRequest(msg),
            ConversionServiceError::Provider(details)
            | ConversionServiceError::Storage(details) => AppError::ExternalService {
                message: CONVERSION_FAILED.to_string(),
                details,
            },
        }
    }
}
