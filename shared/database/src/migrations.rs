use anyhow::Result;
use sqlx::PgPool;

pub async fn run_postgres_migrations(pool: &PgPool) -> Result<()> {
    tracing::info!("Running PostgreSQL migrations");

    // Create vendors table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS vendors (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            vendor_code VARCHAR(50) NOT NULL UNIQUE,
            name VARCHAR(255) NOT NULL,
            contact_details TEXT NOT NULL,
            address TEXT NOT NULL,
            on_time_delivery_rate DOUBLE PRECISION NOT NULL DEFAULT 0,
            quality_rating_avg DOUBLE PRECISION NOT NULL DEFAULT 0,
            average_response_time DOUBLE PRECISION NOT NULL DEFAULT 0,
            fulfillment_rate DOUBLE PRECISION NOT NULL DEFAULT 0,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create purchase_orders table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS purchase_orders (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            po_number VARCHAR(50) NOT NULL UNIQUE,
            vendor_id UUID NOT NULL REFERENCES vendors(id) ON DELETE CASCADE,
            order_date TIMESTAMPTZ NOT NULL,
            issue_date TIMESTAMPTZ NOT NULL,
            expected_delivery_date TIMESTAMPTZ NOT NULL,
            actual_delivery_date TIMESTAMPTZ,
            acknowledgment_date TIMESTAMPTZ,
            status VARCHAR(20) NOT NULL DEFAULT 'pending',
            quality_rating DOUBLE PRECISION,
            quantity INTEGER NOT NULL CHECK (quantity > 0),
            items JSONB NOT NULL DEFAULT '{}'
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create historical_performance table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS historical_performance (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            vendor_id UUID NOT NULL REFERENCES vendors(id) ON DELETE CASCADE,
            date TIMESTAMPTZ NOT NULL,
            on_time_delivery_rate DOUBLE PRECISION NOT NULL,
            quality_rating_avg DOUBLE PRECISION NOT NULL,
            average_response_time DOUBLE PRECISION NOT NULL,
            fulfillment_rate DOUBLE PRECISION NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes for better performance
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_purchase_orders_vendor_id ON purchase_orders(vendor_id)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_historical_performance_vendor_date ON historical_performance(vendor_id, date)")
        .execute(pool)
        .await?;

    tracing::info!("PostgreSQL migrations completed successfully");
    Ok(())
}
