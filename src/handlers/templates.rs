// handlers/templates.rs - /templates handlers

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::error::{ApiError, ApiResult};
use crate::middleware::OptionalUser;
use crate::schemas::TemplateResponse;
use crate::state::AppState;

/// GET /templates
pub async fn list(
    State(state): State<AppState>,
    Extension(viewer): Extension<OptionalUser>,
) -> ApiResult<Json<Vec<TemplateResponse>>> {
    let is_pro = viewer.is_pro();
    let templates = state.store.get_all_templates().await?;
    Ok(Json(templates.into_iter().map(|t| TemplateResponse::for_viewer(t, is_pro)).collect()))
}

/// GET /templates/public
pub async fn list_public(
    State(state): State<AppState>,
    Extension(viewer): Extension<OptionalUser>,
) -> ApiResult<Json<Vec<TemplateResponse>>> {
    let is_pro = viewer.is_pro();
    let templates = state.store.get_public_templates().await?;
    Ok(Json(templates.into_iter().map(|t| TemplateResponse::for_viewer(t, is_pro)).collect()))
}

/// GET /templates/:template_id
pub async fn get(
    State(state): State<AppState>,
    Extension(viewer): Extension<OptionalUser>,
    Path(template_id): Path<String>,
) -> ApiResult<Json<TemplateResponse>> {
    let template = state
        .store
        .get_template_by_id(&template_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Template not found"))?;

    Ok(Json(TemplateResponse::for_viewer(template, viewer.is_pro())))
}
