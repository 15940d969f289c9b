//! Historical Performance Repository
//!
//! Append-only storage of dated vendor metric snapshots.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use vms_models::HistoricalPerformance;

#[derive(Clone)]
pub struct PerformanceRepository {
    pool: PgPool,
}

impl PerformanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a snapshot
    pub async fn create(&self, snapshot: &HistoricalPerformance) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO historical_performance
                (id, vendor_id, date, on_time_delivery_rate, quality_rating_avg,
                 average_response_time, fulfillment_rate)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(snapshot.id)
        .bind(snapshot.vendor_id)
        .bind(snapshot.date)
        .bind(snapshot.metrics.on_time_delivery_rate)
        .bind(snapshot.metrics.quality_rating_avg)
        .bind(snapshot.metrics.average_response_time)
        .bind(snapshot.metrics.fulfillment_rate)
        .execute(&self.pool)
        .await
        .context("Failed to record performance snapshot")?;

        Ok(())
    }

    /// Snapshots for one vendor or all vendors, most recent first
    pub async fn find_all(&self, vendor_id: Option<Uuid>) -> Result<Vec<HistoricalPerformance>> {
        let snapshots = sqlx::query_as::<_, HistoricalPerformance>(
            r#"
            SELECT id, vendor_id, date, on_time_delivery_rate, quality_rating_avg,
                   average_response_time, fulfillment_rate
            FROM historical_performance
            WHERE $1::uuid IS NULL OR vendor_id = $1
            ORDER BY date DESC
            "#,
        )
        .bind(vendor_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch performance history")?;

        Ok(snapshots)
    }
}
