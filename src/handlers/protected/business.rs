use axum::{extract::State, Json};
use serde::Serialize;

use crate::database::models::{Business, PublicAccount};
use crate::middleware::auth::CurrentAccount;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::provisioning::BusinessDetails;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProvisionResponse {
    pub message: String,
    pub business: Business,
    pub user: PublicAccount,
}

/// POST /business - Provision the caller's business: create the tenant
/// database, apply its schema, register the business and upgrade the account.
pub async fn create(
    State(state): State<AppState>,
    axum::Extension(CurrentAccount(account)): axum::Extension<CurrentAccount>,
    Json(details): Json<BusinessDetails>,
) -> ApiResult<ProvisionResponse> {
    let (business, user) = state
        .provisioning
        .provision_business(&account, details)
        .await?;

    Ok(ApiResponse::created(ProvisionResponse {
        message: "Business created successfully".to_string(),
        business,
        user,
    }))
}

/// POST /business/my - The caller's business record, or null.
pub async fn my(
    State(state): State<AppState>,
    axum::Extension(CurrentAccount(account)): axum::Extension<CurrentAccount>,
) -> ApiResult<Option<Business>> {
    let business = state.provisioning.my_business(&account).await?;
    Ok(ApiResponse::success(business))
}
