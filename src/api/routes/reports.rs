//! Report Routes
//!
//! - GET /api/v1/reports/:account_id - Campaign performance report

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use std::sync::Arc;

use crate::api::dto::ReportResponse;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;

/// GET /api/v1/reports/:account_id
///
/// Computes the report fresh on every request.
pub async fn get_report(
    State(state): State<Arc<AppState>>,
    Path(account_id): Path<String>,
) -> ApiResult<Json<ReportResponse>> {
    if account_id.trim().is_empty() {
        return Err(ApiError::Validation("account_id is required".to_string()));
    }

    let account = state.klaviyo.get_account(&account_id).await?;

    let generated_at = Utc::now();
    let rows = state.reports.build_report(generated_at).await?;

    tracing::info!(
        account_id = %account.id,
        campaigns = rows.len(),
        "Served campaign report"
    );

    Ok(Json(ReportResponse::new(
        account,
        generated_at,
        rows,
        &state.config.currency_symbol,
    )))
}
