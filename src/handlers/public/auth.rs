use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::auth::{self, password, Claims};
use crate::config;
use crate::database::models::{Account, PublicAccount};
use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::state::AppState;

const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicAccount,
    pub expires_in: i64,
}

/// POST /auth/register - Create an account and return a bearer token.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<AuthResponse> {
    validate_registration(&req)?;

    let existing: Option<(uuid::Uuid,)> = sqlx::query_as("SELECT id FROM accounts WHERE email = $1")
        .bind(&req.email)
        .fetch_optional(state.db.main_pool())
        .await?;
    if existing.is_some() {
        return Err(ApiError::conflict("Email already registered"));
    }

    let password_hash = password::hash_password(&req.password)?;

    let inserted: Result<Account, sqlx::Error> = sqlx::query_as(
        "INSERT INTO accounts (email, password_hash, name) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(&req.email)
    .bind(&password_hash)
    .bind(&req.name)
    .fetch_one(state.db.main_pool())
    .await;

    let account = match inserted {
        Ok(account) => account,
        // Registration raced another request for the same email
        Err(e) if is_unique_violation(&e) => {
            return Err(ApiError::conflict("Email already registered"));
        }
        Err(e) => return Err(e.into()),
    };

    Ok(ApiResponse::created(token_response(&account)?))
}

/// POST /auth/login - Verify credentials and return a bearer token.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<AuthResponse> {
    let account: Option<Account> = sqlx::query_as("SELECT * FROM accounts WHERE email = $1")
        .bind(&req.email)
        .fetch_optional(state.db.main_pool())
        .await?;

    let account = account.ok_or_else(invalid_credentials)?;

    if !password::verify_password(&req.password, &account.password_hash)? {
        return Err(invalid_credentials());
    }

    Ok(ApiResponse::success(token_response(&account)?))
}

fn invalid_credentials() -> ApiError {
    // Same message whether the email or the password was wrong
    ApiError::unauthorized("Invalid email or password")
}

fn token_response(account: &Account) -> Result<AuthResponse, ApiError> {
    let security = &config::config().security;
    let claims = Claims::new(account.id, account.email.clone(), security);
    let token = auth::generate_jwt(&claims, security)?;

    Ok(AuthResponse {
        token,
        user: account.to_public(),
        expires_in: security.jwt_expiry_hours as i64 * 3600,
    })
}

fn validate_registration(req: &RegisterRequest) -> Result<(), ApiError> {
    if !req.email.contains('@') {
        return Err(ApiError::bad_request("Invalid email address"));
    }
    if req.password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::bad_request(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    if req.name.trim().is_empty() {
        return Err(ApiError::bad_request("Name must not be empty"));
    }
    Ok(())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_validation() {
        let valid = RegisterRequest {
            email: "ana@example.com".to_string(),
            password: "long-enough-password".to_string(),
            name: "Ana".to_string(),
        };
        assert!(validate_registration(&valid).is_ok());

        let bad_email = RegisterRequest {
            email: "not-an-email".to_string(),
            ..clone_req(&valid)
        };
        assert!(validate_registration(&bad_email).is_err());

        let short_password = RegisterRequest {
            password: "short".to_string(),
            ..clone_req(&valid)
        };
        assert!(validate_registration(&short_password).is_err());

        let blank_name = RegisterRequest {
            name: "  ".to_string(),
            ..clone_req(&valid)
        };
        assert!(validate_registration(&blank_name).is_err());
    }

    fn clone_req(req: &RegisterRequest) -> RegisterRequest {
        RegisterRequest {
            email: req.email.clone(),
            password: req.password.clone(),
            name: req.name.clone(),
        }
    }
}
