use super::error::HistoryServiceError;
use super::model::{ConversionRecord, VoiceCount};
use crate::domain::shared::pagination::{PageRequest, Pagination};
use crate::infrastructure::repositories::HistoryRepository;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Response for GET /api/history
#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryPage {
    pub history: Vec<ConversionRecord>,
    pub pagination: Pagination,
}

/// Response for GET /api/history/stats
#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStats {
    pub total_conversions: i64,
    pub total_duration: i64,
    pub average_duration: f64,
    pub voice_stats: Vec<VoiceCount>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteConversionResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClearHistoryResponse {
    pub success: bool,
    pub message: String,
}

pub struct HistoryService {
    history_repo: Arc<dyn HistoryRepository>,
}

impl HistoryService {
    pub fn new(history_repo: Arc<dyn HistoryRepository>) -> Self {
        Self { history_repo }
    }
}

/// Every operation only ever sees records owned by `owner_key`
#[async_trait]
pub trait HistoryServiceApi: Send + Sync {
    async fn list(
        &self,
        owner_key: &str,
        voice: Option<&str>,
        page: PageRequest,
    ) -> Result<HistoryPage, HistoryServiceError>;

    async fn stats(&self, owner_key: &str) -> Result<HistoryStats, HistoryServiceError>;

    /// `id` is taken raw from the path; anything that is not a known id is
    /// reported as not found
    async fn delete_one(
        &self,
        owner_key: &str,
        id: &str,
    ) -> Result<DeleteConversionResponse, HistoryServiceError>;

    async fn delete_all(
        &self,
        owner_key: &str,
    ) -> Result<ClearHistoryResponse, HistoryServiceError>;
}

#[async_trait]
impl HistoryServiceApi for HistoryService {
    async fn list(
        &self,
        owner_key: &str,
        voice: Option<&str>,
        page: PageRequest,
    ) -> Result<HistoryPage, HistoryServiceError> {
        let voice = voice.filter(|v| !v.is_empty());

        let history = self
            .history_repo
            .find_by_owner(owner_key, voice, page.limit, page.offset())
            .await
            .map_err(HistoryServiceError::dependency("Failed to fetch history"))?;
        let total = self
            .history_repo
            .count_by_owner(owner_key, voice)
            .await
            .map_err(HistoryServiceError::dependency("Failed to fetch history"))?;

        Ok(HistoryPage {
            history,
            pagination: Pagination::new(page, total),
        })
    }

    async fn stats(&self, owner_key: &str) -> Result<HistoryStats, HistoryServiceError> {
        let totals = self
            .history_repo
            .totals(owner_key)
            .await
            .map_err(HistoryServiceError::dependency("Failed to fetch statistics"))?;
        let voice_stats = self
            .history_repo
            .voice_counts(owner_key)
            .await
            .map_err(HistoryServiceError::dependency("Failed to fetch statistics"))?;

        Ok(HistoryStats {
            total_conversions: totals.total_conversions,
            total_duration: totals.total_duration,
            average_duration: totals.average_duration,
            voice_stats,
        })
    }

    async fn delete_one(
        &self,
        owner_key: &str,
        id: &str,
    ) -> Result<DeleteConversionResponse, HistoryServiceError> {
        let id = Uuid::parse_str(id).map_err(|_| HistoryServiceError::NotFound)?;

        let deleted = self
            .history_repo
            .delete_one(owner_key, id)
            .await
            .map_err(HistoryServiceError::dependency("Failed to delete conversion"))?;

        if !deleted {
            return Err(HistoryServiceError::NotFound);
        }

        tracing::info!(owner_key = owner_key, conversion_id = %id, "Conversion deleted");

        Ok(DeleteConversionResponse {
            success: true,
            message: "Conversion deleted successfully".to_string(),
        })
    }

    async fn delete_all(
        &self,
        owner_key: &str,
    ) -> Result<ClearHistoryResponse, HistoryServiceError> {
        let deleted = self
            .history_repo
            .delete_all(owner_key)
            .await
            .map_err(HistoryServiceError::dependency("Failed to clear history"))?;

        tracing::info!(owner_key = owner_key, deleted = deleted, "History cleared");

        Ok(ClearHistoryResponse {
            success: true,
            message: format!("Deleted {deleted} conversions"),
        })
    }
}
