use sqlx::{Executor, PgConnection, PgPool};

use crate::database::manager::DatabaseError;

/// Main database schema: accounts plus the business registry. Applied once
/// at startup; every statement is idempotent.
const MAIN_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS accounts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    name TEXT NOT NULL,
    roles TEXT[] NOT NULL DEFAULT ARRAY['customer'::TEXT],
    tenant_db TEXT UNIQUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS business (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    db_name TEXT NOT NULL UNIQUE,
    owner_id UUID NOT NULL REFERENCES accounts(id),
    name TEXT NOT NULL,
    category TEXT NOT NULL,
    description TEXT,
    phone TEXT NOT NULL,
    address TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX IF NOT EXISTS idx_business_owner ON business (owner_id);
"#;

/// Tenant database schema: the product catalog and sale log. Applied exactly
/// once per tenant, right after its database is created.
const TENANT_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS product (
    id SERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    price NUMERIC(12,2) NOT NULL CHECK (price >= 0),
    stock INTEGER NOT NULL DEFAULT 0 CHECK (stock >= 0),
    image_url TEXT,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS sale (
    id SERIAL PRIMARY KEY,
    product_id INTEGER NOT NULL REFERENCES product(id),
    quantity INTEGER NOT NULL CHECK (quantity > 0),
    sale_type VARCHAR(20) NOT NULL DEFAULT 'sale',
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX IF NOT EXISTS idx_product_created_at ON product (created_at DESC);
CREATE INDEX IF NOT EXISTS idx_sale_created_at ON sale (created_at DESC);
CREATE INDEX IF NOT EXISTS idx_sale_product ON sale (product_id);
"#;

/// Ensure the main database schema exists. Runs at startup.
pub async fn ensure_main_schema(pool: &PgPool) -> Result<(), DatabaseError> {
    pool.execute(MAIN_SCHEMA).await?;
    Ok(())
}

/// Apply the fixed tenant schema over a freshly provisioned tenant
/// connection.
pub async fn apply_tenant_schema(conn: &mut PgConnection) -> Result<(), DatabaseError> {
    conn.execute(TENANT_SCHEMA).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenant_schema_defines_catalog_tables() {
        assert!(TENANT_SCHEMA.contains("CREATE TABLE IF NOT EXISTS product"));
        assert!(TENANT_SCHEMA.contains("CREATE TABLE IF NOT EXISTS sale"));
        assert!(TENANT_SCHEMA.contains("stock >= 0"));
    }

    #[test]
    fn main_schema_defines_registry_tables() {
        assert!(MAIN_SCHEMA.contains("CREATE TABLE IF NOT EXISTS accounts"));
        assert!(MAIN_SCHEMA.contains("CREATE TABLE IF NOT EXISTS business"));
    }
}
