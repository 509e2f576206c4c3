use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Role names stored in accounts.roles.
pub mod roles {
    pub const CUSTOMER: &str = "customer";
    pub const BUSINESS_MANAGER: &str = "business_manager";
    pub const EMPLOYEE: &str = "employee";
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub roles: Vec<String>,
    pub tenant_db: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client-facing projection of an account; never exposes the credential hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicAccount {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub roles: Vec<String>,
    pub tenant_db: Option<String>,
}

impl Account {
    pub fn to_public(&self) -> PublicAccount {
        PublicAccount {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            roles: self.roles.clone(),
            tenant_db: self.tenant_db.clone(),
        }
    }
}

/// Set union of an account's roles with new ones, preserving the existing
/// order and never duplicating.
pub fn merge_roles(existing: &[String], added: &[&str]) -> Vec<String> {
    let mut merged: Vec<String> = existing.to_vec();
    for role in added {
        if !merged.iter().any(|r| r == role) {
            merged.push((*role).to_string());
        }
    }
    merged
}
