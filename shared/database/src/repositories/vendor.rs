//! Vendor Repository
//!
//! CRUD operations for vendor records and the metrics write.
//! Uses runtime SQL queries (unchecked) to avoid requiring DATABASE_URL at compile time.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use vms_models::{Vendor, VendorMetrics};

const VENDOR_COLUMNS: &str = r#"
    id, vendor_code, name, contact_details, address,
    on_time_delivery_rate, quality_rating_avg,
    average_response_time, fulfillment_rate,
    created_at, updated_at
"#;

#[derive(Clone)]
pub struct VendorRepository {
    pool: PgPool,
}

impl VendorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find vendor by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Vendor>> {
        let vendor = sqlx::query_as::<_, Vendor>(&format!(
            "SELECT {VENDOR_COLUMNS} FROM vendors WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch vendor by ID")?;

        Ok(vendor)
    }

    /// Find vendor by its unique code
    pub async fn find_by_code(&self, vendor_code: &str) -> Result<Option<Vendor>> {
        let vendor = sqlx::query_as::<_, Vendor>(&format!(
            "SELECT {VENDOR_COLUMNS} FROM vendors WHERE vendor_code = $1"
        ))
        .bind(vendor_code)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch vendor by code")?;

        Ok(vendor)
    }

    /// Find all vendors
    pub async fn find_all(&self) -> Result<Vec<Vendor>> {
        let vendors = sqlx::query_as::<_, Vendor>(&format!(
            "SELECT {VENDOR_COLUMNS} FROM vendors ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch all vendors")?;

        Ok(vendors)
    }

    /// Create new vendor
    pub async fn create(&self, vendor: &Vendor) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO vendors
                (id, vendor_code, name, contact_details, address,
                 on_time_delivery_rate, quality_rating_avg,
                 average_response_time, fulfillment_rate,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(vendor.id)
        .bind(&vendor.vendor_code)
        .bind(&vendor.name)
        .bind(&vendor.contact_details)
        .bind(&vendor.address)
        .bind(vendor.metrics.on_time_delivery_rate)
        .bind(vendor.metrics.quality_rating_avg)
        .bind(vendor.metrics.average_response_time)
        .bind(vendor.metrics.fulfillment_rate)
        .bind(vendor.created_at)
        .bind(vendor.updated_at)
        .execute(&self.pool)
        .await
        .context("Failed to create vendor")?;

        Ok(())
    }

    /// Update profile columns; metric columns are never written here
    pub async fn update_profile(&self, vendor: &Vendor) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE vendors SET
                vendor_code = $2,
                name = $3,
                contact_details = $4,
                address = $5,
                updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(vendor.id)
        .bind(&vendor.vendor_code)
        .bind(&vendor.name)
        .bind(&vendor.contact_details)
        .bind(&vendor.address)
        .bind(vendor.updated_at)
        .execute(&self.pool)
        .await
        .context("Failed to update vendor")?;

        Ok(result.rows_affected() > 0)
    }

    /// Write all four metrics in one statement
    pub async fn update_metrics(
        &self,
        id: Uuid,
        metrics: VendorMetrics,
        updated_at: DateTime<Utc>,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE vendors SET
                on_time_delivery_rate = $2,
                quality_rating_avg = $3,
                average_response_time = $4,
                fulfillment_rate = $5,
                updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(metrics.on_time_delivery_rate)
        .bind(metrics.quality_rating_avg)
        .bind(metrics.average_response_time)
        .bind(metrics.fulfillment_rate)
        .bind(updated_at)
        .execute(&self.pool)
        .await
        .context("Failed to store vendor metrics")?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete vendor by ID; purchase orders and snapshots cascade
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM vendors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete vendor")?;

        Ok(result.rows_affected() > 0)
    }
}
