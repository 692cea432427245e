use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    domain::{
        history::{
            ClearHistoryResponse, DeleteConversionResponse, HistoryPage, HistoryService,
            HistoryServiceApi, HistoryStats,
        },
        shared::pagination::PageRequest,
    },
    error::AppResult,
    infrastructure::identity::ClientIdentity,
};

/// Query for GET /api/history
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub voice: Option<String>,
}

pub struct HistoryController {
    history_service: Arc<HistoryService>,
}

impl HistoryController {
    pub fn new(history_service: Arc<HistoryService>) -> Self {
        Self { history_service }
    }

    /// GET /api/history - Caller's conversions, newest first
    pub async fn list(
        State(controller): State<Arc<HistoryController>>,
        Extension(identity): Extension<ClientIdentity>,
        query: Result<Query<HistoryQuery>, QueryRejection>,
    ) -> AppResult<Json<HistoryPage>> {
        let Query(query) = query?;
        let page = PageRequest::new(query.page, query.limit);
        let history = controller
            .history_service
            .list(identity.as_str(), query.voice.as_deref(), page)
            .await?;
        Ok(Json(history))
    }

    /// GET /api/history/stats
    pub async fn stats(
        State(controller): State<Arc<HistoryController>>,
        Extension(identity): Extension<ClientIdentity>,
    ) -> AppResult<Json<HistoryStats>> {
        let stats = controller.history_service.stats(identity.as_str()).await?;
        Ok(Json(stats))
    }

    /// DELETE /api/history/:id
    pub async fn delete_one(
        State(controller): State<Arc<HistoryController>>,
        Extension(identity): Extension<ClientIdentity>,
        Path(id): Path<String>,
    ) -> AppResult<Json<DeleteConversionResponse>> {
        let response = controller
            .history_service
            .delete_one(identity.as_str(), &id)
            .await?;
        Ok(Json(response))
    }

    /// DELETE /api/history - Clear the caller's history
    pub async fn delete_all(
        State(controller): State<Arc<HistoryController>>,
        Extension(identity): Extension<ClientIdentity>,
    ) -> AppResult<Json<ClearHistoryResponse>> {
        let response = controller
            .history_service
            .delete_all(identity.as_str())
            .await?;
        Ok(Json(response))
    }
}
