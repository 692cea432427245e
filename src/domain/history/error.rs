use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum HistoryServiceError {
    #[error("conversion not found")]
    NotFound,
    /// Storage failure; `message` is what the client sees
    #[error("{message}: {details}")]
    Dependency {
        message: &'static str,
        details: String,
    },
}

impl HistoryServiceError {
    pub(crate) fn dependency(message: &'static str) -> impl FnOnce(AppError) -> Self {
        move |err| {
            tracing::error!(error = %err, "{}", message);
            HistoryServiceError::Dependency {
                message,
                details: err.to_string(),
            }
        }
    }
}

impl From<HistoryServiceError> for AppError {
    fn from(err: HistoryServiceError) -> Self {
        match err {
            HistoryServiceError::NotFound => AppError::NotFound("Conversion not found".to_string()),
            HistoryServiceError::Dependency { message, .. } => {
                AppError::Internal(message.to_string())
            }
        }
    }
}
