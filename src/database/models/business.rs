use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One row per provisioned tenant in the main database. The db_name is
/// immutable once written; no operation deletes these rows.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Business {
    pub id: Uuid,
    pub db_name: String,
    pub owner_id: Uuid,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub phone: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Contact projection served to unauthenticated callers.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BusinessPublicInfo {
    pub name: String,
    pub phone: String,
}
