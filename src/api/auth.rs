//! Access key check for the report endpoints

use axum::{
    extract::{Query, Request, State},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;

use super::error::ApiError;
use super::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AccessKeyQuery {
    pub api_key: Option<String>,
}

/// Reject requests whose `api_key` query parameter is missing or wrong
pub async fn require_access_key(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AccessKeyQuery>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    match query.api_key {
        Some(key) if !state.config.access_key.is_empty() && key == state.config.access_key => {
            Ok(next.run(request).await)
        }
        _ => Err(ApiError::Unauthorized),
    }
}
