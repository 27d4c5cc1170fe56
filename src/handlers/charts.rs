// handlers/charts.rs - /chart generation, listing and deletion handlers

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Utc;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::schemas::{ChartDeleteResponse, ChartGenerateRequest, ChartGenerateResponse, ChartResponse, NewChart};
use crate::state::AppState;

/// POST /chart/generate - Generate a chart from a template and input data
///
/// Checks run in order: the free-tier quota (403), the template (404), then
/// premium access (403). Without a `chart_type` the template's own type is
/// sent to the generator. The chart is stored and the user's count bumped
/// only after generation succeeds.
///
/// Expected Input:
/// ```json
/// { "template_id": "uuid", "data": { "labels": ["Jan"], "values": [1] }, "chart_type": "bar" }
/// ```
pub async fn generate(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Json(request): Json<ChartGenerateRequest>,
) -> ApiResult<Json<ChartGenerateResponse>> {
    let limit = state.config.charts.free_chart_limit;
    if !user.is_pro() && user.chart_count >= limit {
        return Err(ApiError::forbidden(format!(
            "Free users can only generate {} charts. Upgrade to Pro for unlimited charts.",
            limit
        )));
    }

    let template = state
        .store
        .get_template_by_id(&request.template_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Template not found"))?;

    if template.is_premium && !user.is_pro() {
        return Err(ApiError::forbidden("This template requires a Pro subscription"));
    }

    let chart_type = request
        .chart_type
        .clone()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| template.chart_type.clone());

    let generated = state
        .ai
        .generate_chart(&chart_type, &request.data)
        .await
        .map_err(|e| {
            tracing::error!("Chart generation failed for user {}: {}", user.id, e);
            ApiError::internal_server_error(format!("Chart generation failed: {}", e))
        })?;

    let chart = state
        .store
        .create_chart(NewChart {
            user_id: user.id.clone(),
            template_id: request.template_id.clone(),
            input_data: Value::Object(request.data),
            result_visual: Some(generated.chart_config.to_string()),
            result_code: Some(generated.jsx.clone()),
        })
        .await?;

    if let Err(e) = state.store.update_user_chart_count(&user.id, user.chart_count + 1).await {
        tracing::warn!("Failed to update chart count for {}: {}", user.id, e);
    }
    tracing::info!("Generated {} chart {} for user {}", chart_type, chart.id, user.id);

    Ok(Json(ChartGenerateResponse {
        id: chart.id,
        chart_config: generated.chart_config,
        jsx: generated.jsx,
        svg: generated.svg,
        description: generated.description,
        created_at: chart.created_at.unwrap_or_else(Utc::now).to_rfc3339(),
    }))
}

/// GET /chart/user/:user_id
pub async fn list_for_user(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<ChartResponse>>> {
    if user.id != user_id {
        return Err(ApiError::forbidden("You can only view your own charts"));
    }

    let charts = state.store.get_charts_by_user(&user_id).await?;
    Ok(Json(charts.into_iter().map(ChartResponse::from).collect()))
}

/// GET /chart/:chart_id
pub async fn get(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(chart_id): Path<String>,
) -> ApiResult<Json<ChartResponse>> {
    let chart = state
        .store
        .get_chart_by_id(&chart_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Chart not found"))?;

    if chart.user_id != user.id {
        return Err(ApiError::forbidden("You can only view your own charts"));
    }

    Ok(Json(ChartResponse::from(chart)))
}

/// DELETE /chart/:chart_id
///
/// Owner only. The chart count is decremented but never goes below zero.
pub async fn delete(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(chart_id): Path<String>,
) -> ApiResult<Json<ChartDeleteResponse>> {
    let chart = state
        .store
        .get_chart_by_id(&chart_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Chart not found"))?;

    if chart.user_id != user.id {
        return Err(ApiError::forbidden("You can only delete your own charts"));
    }

    let deleted = match state.store.delete_chart(&chart_id).await {
        Ok(deleted) => deleted,
        Err(e) => {
            tracing::error!("Failed to delete chart {}: {}", chart_id, e);
            false
        }
    };
    if !deleted {
        return Err(ApiError::internal_server_error("Failed to delete chart"));
    }

    let remaining = (user.chart_count - 1).max(0);
    if let Err(e) = state.store.update_user_chart_count(&user.id, remaining).await {
        tracing::warn!("Failed to update chart count for {}: {}", user.id, e);
    }

    Ok(Json(ChartDeleteResponse { success: true, message: "Chart deleted successfully".to_string() }))
}
