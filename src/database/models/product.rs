use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Sale {
    pub id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub sale_type: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Sale joined with its product's name, for the history listing.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SaleWithProduct {
    pub id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub sale_type: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub product_name: String,
}

/// Reduced projection for the single-tenant public catalog.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PublicProduct {
    pub id: i32,
    pub name: String,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub stock: i32,
    pub description: Option<String>,
}

/// A sampled product in the cross-tenant discovery feed, tagged with the
/// business it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryProduct {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub business_name: String,
    pub business_db: String,
}

impl DiscoveryProduct {
    pub fn from_product(product: Product, business_name: &str, business_db: &str) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            stock: product.stock,
            image_url: product.image_url,
            created_at: product.created_at,
            business_name: business_name.to_string(),
            business_db: business_db.to_string(),
        }
    }
}
