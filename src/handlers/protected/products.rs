use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::{json, Value};

use crate::database::models::{Account, Product, Sale, SaleWithProduct};
use crate::error::ApiError;
use crate::middleware::auth::CurrentAccount;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::catalog::{CreateProduct, RegisterSale, UpdateProduct};
use crate::state::AppState;

fn tenant_of(account: &Account) -> Result<&str, ApiError> {
    account
        .tenant_db
        .as_deref()
        .ok_or_else(|| ApiError::forbidden("No business registered"))
}

/// POST /products - Create a product in the caller's tenant.
pub async fn create(
    State(state): State<AppState>,
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
    Json(req): Json<CreateProduct>,
) -> ApiResult<Product> {
    let tenant = tenant_of(&account)?;
    let product = state.catalog.create_product(tenant, req).await?;
    Ok(ApiResponse::created(product))
}

/// GET /products - All of the caller's products, newest first. Accounts
/// without a business get an empty list rather than an error.
pub async fn list(
    State(state): State<AppState>,
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
) -> ApiResult<Vec<Product>> {
    match account.tenant_db.as_deref() {
        None => Ok(ApiResponse::success(Vec::new())),
        Some(tenant) => {
            let products = state.catalog.list_products(tenant).await?;
            Ok(ApiResponse::success(products))
        }
    }
}

/// PATCH /products/:id - Full-field update, stock included.
pub async fn update(
    State(state): State<AppState>,
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
    Path(id): Path<i32>,
    Json(req): Json<UpdateProduct>,
) -> ApiResult<Product> {
    let tenant = tenant_of(&account)?;
    let product = state.catalog.update_product(tenant, id, req).await?;
    Ok(ApiResponse::success(product))
}

/// DELETE /products/:id - Idempotent delete.
pub async fn delete(
    State(state): State<AppState>,
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
    Path(id): Path<i32>,
) -> ApiResult<Value> {
    let tenant = tenant_of(&account)?;
    state.catalog.delete_product(tenant, id).await?;
    Ok(ApiResponse::success(json!({ "deleted": true })))
}

/// POST /products/sale - Register a sale with a guarded stock decrement.
pub async fn register_sale(
    State(state): State<AppState>,
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
    Json(req): Json<RegisterSale>,
) -> ApiResult<Sale> {
    let tenant = tenant_of(&account)?;
    let sale = state.catalog.register_sale(tenant, req).await?;
    Ok(ApiResponse::created(sale))
}

/// GET /products/history - Sales joined with product names, newest first.
pub async fn history(
    State(state): State<AppState>,
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
) -> ApiResult<Vec<SaleWithProduct>> {
    let tenant = tenant_of(&account)?;
    let sales = state.catalog.sales_history(tenant).await?;
    Ok(ApiResponse::success(sales))
}
