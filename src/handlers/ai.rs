// handlers/ai.rs - /ai handlers (prompt analysis, transcription, sample data)

use axum::{extract::State, Extension, Json};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::error::{ApiError, ApiResult};
use crate::middleware::OptionalUser;
use crate::schemas::{
    AnalyzePromptRequest, AnalyzePromptResponse, GenerateDataRequest, GenerateDataResponse, TranscribeAudioRequest,
    TranscribeAudioResponse,
};
use crate::state::AppState;

/// POST /ai/analyze-prompt
pub async fn analyze_prompt(
    State(state): State<AppState>,
    Extension(caller): Extension<OptionalUser>,
    Json(request): Json<AnalyzePromptRequest>,
) -> ApiResult<Json<AnalyzePromptResponse>> {
    tracing::debug!(
        "Analyzing prompt (language={}, user={:?})",
        request.language,
        caller.0.as_ref().map(|u| u.id.as_str())
    );

    let analysis = state.ai.analyze_prompt(&request.prompt).await.map_err(|e| {
        tracing::error!("Prompt analysis failed: {}", e);
        ApiError::internal_server_error(format!("AI analysis failed: {}", e))
    })?;

    Ok(Json(AnalyzePromptResponse { success: true, analysis }))
}

/// POST /ai/transcribe-audio
pub async fn transcribe_audio(
    State(state): State<AppState>,
    Json(request): Json<TranscribeAudioRequest>,
) -> ApiResult<Json<TranscribeAudioResponse>> {
    let audio = BASE64
        .decode(request.audio_base64.trim())
        .map_err(|_| ApiError::bad_request("Invalid base64 audio data"))?;
    if audio.is_empty() {
        return Err(ApiError::bad_request("Audio data is empty"));
    }

    let text = state
        .ai
        .transcribe_audio(audio, request.mime_type.as_deref())
        .await
        .map_err(|e| {
            tracing::error!("Transcription failed: {}", e);
            ApiError::internal_server_error(format!("Transcription failed: {}", e))
        })?;

    Ok(Json(TranscribeAudioResponse { text }))
}

/// POST /ai/generate-data
pub async fn generate_data(
    State(state): State<AppState>,
    Json(request): Json<GenerateDataRequest>,
) -> ApiResult<Json<GenerateDataResponse>> {
    let data = state
        .ai
        .generate_data(&request.description, request.data_points, request.chart_type.as_deref())
        .await
        .map_err(|e| {
            tracing::error!("Data generation failed: {}", e);
            ApiError::internal_server_error(format!("Data generation failed: {}", e))
        })?;

    Ok(Json(data))
}
