use std::sync::Arc;

use futures::FutureExt;
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::account::{merge_roles, roles, Account, PublicAccount};
use crate::database::models::business::{Business, BusinessPublicInfo};
use crate::database::schema;

#[derive(Debug, Error)]
pub enum ProvisioningError {
    #[error("Account already has a business registered")]
    AlreadyProvisioned,

    #[error("Business setup failed: {0}")]
    ProvisioningFailed(String),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Merchant metadata supplied when provisioning a business.
#[derive(Debug, Clone, Deserialize)]
pub struct BusinessDetails {
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub phone: String,
    pub address: String,
}

/// One-time tenant provisioning: creates the tenant database, applies its
/// schema, registers the business and upgrades the owning account. Fails
/// atomically from the caller's perspective: either all of that exists
/// afterward or none of it does.
pub struct ProvisioningService {
    db: Arc<DatabaseManager>,
}

impl ProvisioningService {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    pub async fn provision_business(
        &self,
        account: &Account,
        details: BusinessDetails,
    ) -> Result<(Business, PublicAccount), ProvisioningError> {
        validate_details(&details)?;

        if account.tenant_db.is_some() {
            return Err(ProvisioningError::AlreadyProvisioned);
        }

        let db_name = DatabaseManager::tenant_db_name(account.id);

        self.db.create_tenant_database(&db_name).await?;

        let schema_applied: Result<(), DatabaseError> = self
            .db
            .with_tenant_connection(&db_name, |conn| schema::apply_tenant_schema(conn).boxed())
            .await;

        if let Err(e) = schema_applied {
            error!("Schema application failed for {}: {}", db_name, e);
            self.cleanup_tenant_database(&db_name).await;
            return Err(ProvisioningError::ProvisioningFailed(e.to_string()));
        }

        match self.register_business(account, &db_name, &details).await {
            Ok(result) => Ok(result),
            Err(e) => {
                self.cleanup_tenant_database(&db_name).await;
                Err(e)
            }
        }
    }

    /// Insert the business row and upgrade the account in one main-database
    /// transaction. The account update is guarded by `tenant_db IS NULL`, so
    /// a concurrent provision can win at most once; the loser rolls back.
    async fn register_business(
        &self,
        account: &Account,
        db_name: &str,
        details: &BusinessDetails,
    ) -> Result<(Business, PublicAccount), ProvisioningError> {
        let mut tx = self.db.main_pool().begin().await?;

        let business: Business = sqlx::query_as(
            r#"
            INSERT INTO business (db_name, owner_id, name, category, description, phone, address)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(db_name)
        .bind(account.id)
        .bind(&details.name)
        .bind(&details.category)
        .bind(&details.description)
        .bind(&details.phone)
        .bind(&details.address)
        .fetch_one(&mut *tx)
        .await?;

        let new_roles = merge_roles(&account.roles, &[roles::BUSINESS_MANAGER, roles::EMPLOYEE]);

        let updated: Option<Account> = sqlx::query_as(
            r#"
            UPDATE accounts
            SET roles = $1, tenant_db = $2, updated_at = now()
            WHERE id = $3 AND tenant_db IS NULL
            RETURNING *
            "#,
        )
        .bind(&new_roles)
        .bind(db_name)
        .bind(account.id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(updated) = updated else {
            tx.rollback().await?;
            return Err(ProvisioningError::AlreadyProvisioned);
        };

        tx.commit().await?;

        info!(
            "Provisioned business {} ({}) for account {}",
            business.id, db_name, account.id
        );
        Ok((business, updated.to_public()))
    }

    async fn cleanup_tenant_database(&self, db_name: &str) {
        if let Err(e) = self.db.drop_tenant_database(db_name).await {
            error!("Rollback failed to drop tenant database {}: {}", db_name, e);
        }
    }

    /// The caller's business record, or None for accounts without one.
    pub async fn my_business(&self, account: &Account) -> Result<Option<Business>, ProvisioningError> {
        if account.tenant_db.is_none() {
            return Ok(None);
        }

        let business = sqlx::query_as("SELECT * FROM business WHERE owner_id = $1")
            .bind(account.id)
            .fetch_optional(self.db.main_pool())
            .await?;
        Ok(business)
    }

    /// Public contact info for a tenant, looked up by its database name.
    /// Names that cannot be derived tenant names resolve to None.
    pub async fn business_public_info(
        &self,
        db_name: &str,
    ) -> Result<Option<BusinessPublicInfo>, ProvisioningError> {
        if !DatabaseManager::is_valid_tenant_db(db_name) {
            return Ok(None);
        }

        let info = sqlx::query_as("SELECT name, phone FROM business WHERE db_name = $1")
            .bind(db_name)
            .fetch_optional(self.db.main_pool())
            .await?;
        Ok(info)
    }
}

fn validate_details(details: &BusinessDetails) -> Result<(), ProvisioningError> {
    let required = [
        ("name", &details.name),
        ("category", &details.category),
        ("phone", &details.phone),
        ("address", &details.address),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(ProvisioningError::Validation(format!(
                "Business {} must not be empty",
                field
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details() -> BusinessDetails {
        BusinessDetails {
            name: "Café Luna".to_string(),
            category: "food".to_string(),
            description: None,
            phone: "123".to_string(),
            address: "x".to_string(),
        }
    }

    #[test]
    fn accepts_complete_details() {
        assert!(validate_details(&details()).is_ok());
    }

    #[test]
    fn rejects_blank_required_fields() {
        let mut missing_name = details();
        missing_name.name = "  ".to_string();
        assert!(validate_details(&missing_name).is_err());

        let mut missing_phone = details();
        missing_phone.phone = String::new();
        assert!(validate_details(&missing_phone).is_err());
    }
}
