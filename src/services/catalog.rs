use std::sync::Arc;

use futures::FutureExt;
use rand::seq::SliceRandom;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::product::{
    DiscoveryProduct, Product, PublicProduct, Sale, SaleWithProduct,
};

const SALE_TYPES: &[&str] = &["sale", "exchange"];

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Insufficient stock")]
    InsufficientStock,

    #[error("Product not found")]
    ProductNotFound,

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: Option<i32>,
    pub image_url: Option<String>,
}

/// Full-field update; every column is overwritten, stock included.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: Option<i32>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterSale {
    pub product_id: i32,
    pub quantity: i32,
    pub sale_type: Option<String>,
    pub notes: Option<String>,
}

/// Product and sale operations against a tenant database. Every method gets
/// its own short-lived tenant connection via the gateway; stock safety comes
/// from the guarded decrement, not from any in-process lock.
pub struct CatalogService {
    db: Arc<DatabaseManager>,
    discovery_sample_size: i64,
}

impl CatalogService {
    pub fn new(db: Arc<DatabaseManager>, discovery_sample_size: i64) -> Self {
        Self {
            db,
            discovery_sample_size,
        }
    }

    pub async fn create_product(
        &self,
        tenant_db: &str,
        req: CreateProduct,
    ) -> Result<Product, CatalogError> {
        validate_product_fields(&req.name, req.price, req.stock)?;

        self.db
            .with_tenant_connection(tenant_db, move |conn| {
                async move {
                    let product: Product = sqlx::query_as(
                        r#"
                        INSERT INTO product (name, description, price, stock, image_url)
                        VALUES ($1, $2, $3, $4, $5)
                        RETURNING *
                        "#,
                    )
                    .bind(&req.name)
                    .bind(&req.description)
                    .bind(req.price)
                    .bind(req.stock.unwrap_or(0))
                    .bind(&req.image_url)
                    .fetch_one(&mut *conn)
                    .await?;
                    Ok(product)
                }
                .boxed()
            })
            .await
    }

    pub async fn list_products(&self, tenant_db: &str) -> Result<Vec<Product>, CatalogError> {
        self.db
            .with_tenant_connection(tenant_db, |conn| {
                async move {
                    let products =
                        sqlx::query_as("SELECT * FROM product ORDER BY created_at DESC")
                            .fetch_all(&mut *conn)
                            .await?;
                    Ok(products)
                }
                .boxed()
            })
            .await
    }

    pub async fn update_product(
        &self,
        tenant_db: &str,
        id: i32,
        req: UpdateProduct,
    ) -> Result<Product, CatalogError> {
        validate_product_fields(&req.name, req.price, req.stock)?;

        self.db
            .with_tenant_connection(tenant_db, move |conn| {
                async move {
                    let product: Option<Product> = sqlx::query_as(
                        r#"
                        UPDATE product
                        SET name = $1, description = $2, price = $3, stock = $4,
                            image_url = $5, updated_at = now()
                        WHERE id = $6
                        RETURNING *
                        "#,
                    )
                    .bind(&req.name)
                    .bind(&req.description)
                    .bind(req.price)
                    .bind(req.stock.unwrap_or(0))
                    .bind(&req.image_url)
                    .bind(id)
                    .fetch_optional(&mut *conn)
                    .await?;

                    product.ok_or(CatalogError::ProductNotFound)
                }
                .boxed()
            })
            .await
    }

    /// Idempotent delete: succeeds whether or not the row existed.
    pub async fn delete_product(&self, tenant_db: &str, id: i32) -> Result<(), CatalogError> {
        self.db
            .with_tenant_connection(tenant_db, move |conn| {
                async move {
                    sqlx::query("DELETE FROM product WHERE id = $1")
                        .bind(id)
                        .execute(&mut *conn)
                        .await?;
                    Ok(())
                }
                .boxed()
            })
            .await
    }

    /// Insert the sale row and decrement stock in one tenant transaction.
    /// The decrement is guarded by `stock >= quantity`; when it affects no
    /// rows the whole transaction rolls back, so no ghost sale row survives
    /// an insufficient-stock failure.
    pub async fn register_sale(
        &self,
        tenant_db: &str,
        req: RegisterSale,
    ) -> Result<Sale, CatalogError> {
        let sale_type = validate_sale(&req)?;

        self.db
            .with_tenant_connection(tenant_db, move |conn| {
                async move {
                    let mut tx = sqlx::Connection::begin(conn).await?;

                    let inserted: Result<Sale, sqlx::Error> = sqlx::query_as(
                        r#"
                        INSERT INTO sale (product_id, quantity, sale_type, notes)
                        VALUES ($1, $2, $3, $4)
                        RETURNING *
                        "#,
                    )
                    .bind(req.product_id)
                    .bind(req.quantity)
                    .bind(&sale_type)
                    .bind(&req.notes)
                    .fetch_one(&mut *tx)
                    .await;

                    let sale = match inserted {
                        Ok(sale) => sale,
                        Err(e) if is_foreign_key_violation(&e) => {
                            return Err(CatalogError::ProductNotFound);
                        }
                        Err(e) => return Err(e.into()),
                    };

                    let updated = sqlx::query(
                        r#"
                        UPDATE product
                        SET stock = stock - $1, updated_at = now()
                        WHERE id = $2 AND stock >= $1
                        "#,
                    )
                    .bind(req.quantity)
                    .bind(req.product_id)
                    .execute(&mut *tx)
                    .await?;

                    if updated.rows_affected() == 0 {
                        tx.rollback().await?;
                        return Err(CatalogError::InsufficientStock);
                    }

                    tx.commit().await?;
                    Ok(sale)
                }
                .boxed()
            })
            .await
    }

    pub async fn sales_history(
        &self,
        tenant_db: &str,
    ) -> Result<Vec<SaleWithProduct>, CatalogError> {
        self.db
            .with_tenant_connection(tenant_db, |conn| {
                async move {
                    let sales = sqlx::query_as(
                        r#"
                        SELECT s.id, s.product_id, s.quantity, s.sale_type, s.notes,
                               s.created_at, p.name AS product_name
                        FROM sale s
                        JOIN product p ON s.product_id = p.id
                        ORDER BY s.created_at DESC
                        "#,
                    )
                    .fetch_all(&mut *conn)
                    .await?;
                    Ok(sales)
                }
                .boxed()
            })
            .await
    }

    /// Cross-tenant discovery feed: sample in-stock products from every
    /// registered business. An unreachable tenant is logged and skipped;
    /// it never fails the feed. The combined result is shuffled so no
    /// single business dominates the top of the list.
    pub async fn discovery_feed(&self) -> Result<Vec<DiscoveryProduct>, CatalogError> {
        let businesses: Vec<(String, String)> =
            sqlx::query_as("SELECT db_name, name FROM business WHERE db_name <> ''")
                .fetch_all(self.db.main_pool())
                .await?;

        let mut feed: Vec<DiscoveryProduct> = Vec::new();
        for (db_name, business_name) in businesses {
            let sample_size = self.discovery_sample_size;
            let sampled: Result<Vec<Product>, CatalogError> = self
                .db
                .with_tenant_connection(&db_name, move |conn| {
                    async move {
                        let products = sqlx::query_as(
                            r#"
                            SELECT * FROM product
                            WHERE stock > 0 AND is_active
                            ORDER BY RANDOM()
                            LIMIT $1
                            "#,
                        )
                        .bind(sample_size)
                        .fetch_all(&mut *conn)
                        .await?;
                        Ok(products)
                    }
                    .boxed()
                })
                .await;

            match sampled {
                Ok(products) => feed.extend(
                    products
                        .into_iter()
                        .map(|p| DiscoveryProduct::from_product(p, &business_name, &db_name)),
                ),
                Err(e) => warn!("Skipping tenant {} in discovery feed: {}", db_name, e),
            }
        }

        feed.shuffle(&mut rand::thread_rng());
        Ok(feed)
    }

    /// In-stock products of one tenant, newest first, public projection.
    pub async fn public_catalog(&self, tenant_db: &str) -> Result<Vec<PublicProduct>, CatalogError> {
        self.db
            .with_tenant_connection(tenant_db, |conn| {
                async move {
                    let products = sqlx::query_as(
                        r#"
                        SELECT id, name, price, image_url, stock, description
                        FROM product
                        WHERE stock > 0 AND is_active
                        ORDER BY created_at DESC
                        "#,
                    )
                    .fetch_all(&mut *conn)
                    .await?;
                    Ok(products)
                }
                .boxed()
            })
            .await
    }
}

fn validate_product_fields(
    name: &str,
    price: Decimal,
    stock: Option<i32>,
) -> Result<(), CatalogError> {
    if name.trim().is_empty() {
        return Err(CatalogError::Validation(
            "Product name must not be empty".to_string(),
        ));
    }
    if price < Decimal::ZERO {
        return Err(CatalogError::Validation(
            "Price must not be negative".to_string(),
        ));
    }
    if stock.is_some_and(|s| s < 0) {
        return Err(CatalogError::Validation(
            "Stock must not be negative".to_string(),
        ));
    }
    Ok(())
}

fn validate_sale(req: &RegisterSale) -> Result<String, CatalogError> {
    if req.quantity <= 0 {
        return Err(CatalogError::Validation(
            "Quantity must be positive".to_string(),
        ));
    }

    let sale_type = req.sale_type.as_deref().unwrap_or("sale");
    if !SALE_TYPES.contains(&sale_type) {
        return Err(CatalogError::Validation(format!(
            "Unknown sale type: {}",
            sale_type
        )));
    }
    Ok(sale_type.to_string())
}

fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_validation_rejects_bad_fields() {
        assert!(validate_product_fields("Coffee", Decimal::new(250, 2), Some(10)).is_ok());
        assert!(validate_product_fields("  ", Decimal::new(250, 2), None).is_err());
        assert!(validate_product_fields("Coffee", Decimal::new(-1, 0), None).is_err());
        assert!(validate_product_fields("Coffee", Decimal::new(250, 2), Some(-1)).is_err());
    }

    #[test]
    fn sale_validation_defaults_type_and_bounds_quantity() {
        let ok = RegisterSale {
            product_id: 1,
            quantity: 3,
            sale_type: None,
            notes: None,
        };
        assert_eq!(validate_sale(&ok).unwrap(), "sale");

        let exchange = RegisterSale {
            sale_type: Some("exchange".to_string()),
            ..ok.clone()
        };
        assert_eq!(validate_sale(&exchange).unwrap(), "exchange");

        let zero = RegisterSale {
            quantity: 0,
            ..ok.clone()
        };
        assert!(validate_sale(&zero).is_err());

        let negative = RegisterSale {
            quantity: -2,
            ..ok.clone()
        };
        assert!(validate_sale(&negative).is_err());

        let unknown = RegisterSale {
            sale_type: Some("refund".to_string()),
            ..ok
        };
        assert!(validate_sale(&unknown).is_err());
    }
}
