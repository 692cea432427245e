use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use std::sync::Arc;

use crate::{
    domain::conversion::{
        ConversionService, ConversionServiceApi, ConvertRequest, ConvertResponse, VoicesResponse,
        DEFAULT_VOICE,
    },
    error::{AppError, AppResult},
    infrastructure::{audio::AudioStorage, identity::ClientIdentity},
};

pub struct AudioController {
    conversion_service: Arc<ConversionService>,
    storage: Arc<AudioStorage>,
}

impl AudioController {
    pub fn new(conversion_service: Arc<ConversionService>, storage: Arc<AudioStorage>) -> Self {
        Self {
            conversion_service,
            storage,
        }
    }

    /// GET /api/audio/voices - List selectable voices
    pub async fn list_voices(
        State(controller): State<Arc<AudioController>>,
    ) -> Json<VoicesResponse> {
        Json(VoicesResponse {
            voices: controller.conversion_service.voices().list(),
        })
    }

    /// POST /api/audio/convert - Convert text to audio
    pub async fn convert(
        State(controller): State<Arc<AudioController>>,
        Extension(identity): Extension<ClientIdentity>,
        payload: Result<Json<ConvertRequest>, JsonRejection>,
    ) -> AppResult<Json<ConvertResponse>> {
        let Json(request) = payload?;
        let text = request.text.unwrap_or_default();
        let voice = request
            .voice
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_VOICE.to_string());

        let result = controller
            .conversion_service
            .convert(identity.as_str(), &text, &voice)
            .await?;

        Ok(Json(ConvertResponse::from(result)))
    }

    /// GET /api/audio/:filename - Serve a rendered audio file
    pub async fn serve_audio(
        State(controller): State<Arc<AudioController>>,
        Path(file_name): Path<String>,
    ) -> AppResult<Response> {
        let bytes = controller
            .storage
            .read(&file_name)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to read audio file: {e}")))?
            .ok_or_else(|| AppError::NotFound("Audio file not found".to_string()))?;

        let mut response = (StatusCode::OK, Body::from(bytes)).into_response();
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static("audio/mpeg"));
        response.headers_mut().insert(
            header::CONTENT_DISPOSITION,
            HeaderValue::from_static("inline"),
        );

        Ok(response)
    }
}
