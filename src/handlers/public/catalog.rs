use axum::extract::{Path, State};

use crate::database::models::{BusinessPublicInfo, DiscoveryProduct, PublicProduct};
use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /products/public/all-random - Cross-tenant discovery feed.
pub async fn discovery_feed(State(state): State<AppState>) -> ApiResult<Vec<DiscoveryProduct>> {
    let feed = state.catalog.discovery_feed().await?;
    Ok(ApiResponse::success(feed))
}

/// GET /products/public/business/:tenant - One tenant's public catalog.
pub async fn business_catalog(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
) -> ApiResult<Vec<PublicProduct>> {
    let products = state.catalog.public_catalog(&tenant).await?;
    Ok(ApiResponse::success(products))
}

/// GET /business/public/:tenant - Merchant contact info for one tenant.
pub async fn business_info(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
) -> ApiResult<BusinessPublicInfo> {
    let info = state
        .provisioning
        .business_public_info(&tenant)
        .await?
        .ok_or_else(|| ApiError::not_found("Business not found"))?;
    Ok(ApiResponse::success(info))
}
