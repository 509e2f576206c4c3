use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth;
use crate::config;
use crate::database::models::Account;
use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated caller's account, loaded fresh from the main database
/// on every request so the tenant reference is never stale (a token issued
/// before provisioning still routes to the new tenant).
#[derive(Clone, Debug)]
pub struct CurrentAccount(pub Account);

/// Bearer-token middleware: validates the JWT, loads the account row, and
/// injects it into the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers).map_err(ApiError::unauthorized)?;

    let claims = auth::validate_jwt(&token, &config::config().security)
        .map_err(|e| ApiError::unauthorized(e.to_string()))?;

    let account: Option<Account> = sqlx::query_as("SELECT * FROM accounts WHERE id = $1")
        .bind(claims.sub)
        .fetch_optional(state.db.main_pool())
        .await?;

    let account = account.ok_or_else(|| ApiError::unauthorized("Account no longer exists"))?;

    request.extensions_mut().insert(CurrentAccount(account));
    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header.
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.to_string()),
        Some(_) => Err("Empty bearer token".to_string()),
        None => Err("Authorization header must use Bearer token format".to_string()),
    }
}
