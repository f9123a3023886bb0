//! Account Routes
//!
//! - GET /api/v1/accounts - Accounts visible to the Klaviyo key, with report links

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::{AccountDto, AccountsResponse};
use crate::api::error::ApiResult;
use crate::api::state::AppState;

/// GET /api/v1/accounts
///
/// Only one Klaviyo key is configured, so only reports for that key's own
/// account will succeed even if more accounts are listed.
pub async fn list_accounts(State(state): State<Arc<AppState>>) -> ApiResult<Json<AccountsResponse>> {
    let accounts = state.klaviyo.list_accounts().await?;

    let accounts = accounts
        .into_iter()
        .map(|account| AccountDto::new(account, &state.config.access_key))
        .collect();

    Ok(Json(AccountsResponse { accounts }))
}
