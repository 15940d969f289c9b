//! Purchase Order Repository
//!
//! CRUD operations and vendor-filtered lookup for purchase orders.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use vms_models::{PoStatus, PurchaseOrder};

const PURCHASE_ORDER_COLUMNS: &str = r#"
    id, po_number, vendor_id, order_date, issue_date,
    expected_delivery_date, actual_delivery_date, acknowledgment_date,
    status, quality_rating, quantity, items
"#;

#[derive(Clone)]
pub struct PurchaseOrderRepository {
    pool: PgPool,
}

impl PurchaseOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find purchase order by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<PurchaseOrder>> {
        let row: Option<PurchaseOrderRow> = sqlx::query_as(&format!(
            "SELECT {PURCHASE_ORDER_COLUMNS} FROM purchase_orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch purchase order by ID")?;

        row.map(PurchaseOrder::try_from).transpose()
    }

    /// Find purchase order by PO number
    pub async fn find_by_number(&self, po_number: &str) -> Result<Option<PurchaseOrder>> {
        let row: Option<PurchaseOrderRow> = sqlx::query_as(&format!(
            "SELECT {PURCHASE_ORDER_COLUMNS} FROM purchase_orders WHERE po_number = $1"
        ))
        .bind(po_number)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch purchase order by number")?;

        row.map(PurchaseOrder::try_from).transpose()
    }

    /// Find purchase orders, optionally restricted to one vendor
    pub async fn find_all(&self, vendor_id: Option<Uuid>) -> Result<Vec<PurchaseOrder>> {
        let rows: Vec<PurchaseOrderRow> = sqlx::query_as(&format!(
            r#"
            SELECT {PURCHASE_ORDER_COLUMNS}
            FROM purchase_orders
            WHERE $1::uuid IS NULL OR vendor_id = $1
            ORDER BY order_date DESC, po_number
            "#
        ))
        .bind(vendor_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch purchase orders")?;

        rows.into_iter().map(PurchaseOrder::try_from).collect()
    }

    /// Create new purchase order
    pub async fn create(&self, order: &PurchaseOrder) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO purchase_orders
                (id, po_number, vendor_id, order_date, issue_date,
                 expected_delivery_date, actual_delivery_date, acknowledgment_date,
                 status, quality_rating, quantity, items)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(order.id)
        .bind(&order.po_number)
        .bind(order.vendor_id)
        .bind(order.order_date)
        .bind(order.issue_date)
        .bind(order.expected_delivery_date)
        .bind(order.actual_delivery_date)
        .bind(order.acknowledgment_date)
        .bind(order.status.as_str())
        .bind(order.quality_rating)
        .bind(order.quantity)
        .bind(&order.items)
        .execute(&self.pool)
        .await
        .context("Failed to create purchase order")?;

        Ok(())
    }

    /// Update existing purchase order
    pub async fn update(&self, order: &PurchaseOrder) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE purchase_orders SET
                po_number = $2,
                vendor_id = $3,
                order_date = $4,
                issue_date = $5,
                expected_delivery_date = $6,
                actual_delivery_date = $7,
                acknowledgment_date = $8,
                status = $9,
                quality_rating = $10,
                quantity = $11,
                items = $12
            WHERE id = $1
            "#,
        )
        .bind(order.id)
        .bind(&order.po_number)
        .bind(order.vendor_id)
        .bind(order.order_date)
        .bind(order.issue_date)
        .bind(order.expected_delivery_date)
        .bind(order.actual_delivery_date)
        .bind(order.acknowledgment_date)
        .bind(order.status.as_str())
        .bind(order.quality_rating)
        .bind(order.quantity)
        .bind(&order.items)
        .execute(&self.pool)
        .await
        .context("Failed to update purchase order")?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete purchase order by ID, returning the removed row
    pub async fn delete(&self, id: Uuid) -> Result<Option<PurchaseOrder>> {
        let row: Option<PurchaseOrderRow> = sqlx::query_as(&format!(
            "DELETE FROM purchase_orders WHERE id = $1 RETURNING {PURCHASE_ORDER_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to delete purchase order")?;

        row.map(PurchaseOrder::try_from).transpose()
    }
}

/// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct PurchaseOrderRow {
    id: Uuid,
    po_number: String,
    vendor_id: Uuid,
    order_date: DateTime<Utc>,
    issue_date: DateTime<Utc>,
    expected_delivery_date: DateTime<Utc>,
    actual_delivery_date: Option<DateTime<Utc>>,
    acknowledgment_date: Option<DateTime<Utc>>,
    status: String,
    quality_rating: Option<f64>,
    quantity: i32,
    items: serde_json::Value,
}

impl TryFrom<PurchaseOrderRow> for PurchaseOrder {
    type Error = anyhow::Error;

    fn try_from(row: PurchaseOrderRow) -> Result<Self> {
        let status: PoStatus = row
            .status
            .parse()
            .with_context(|| format!("Purchase order {} has a corrupt status", row.po_number))?;

        Ok(Self {
            id: row.id,
            po_number: row.po_number,
            vendor_id: row.vendor_id,
            order_date: row.order_date,
            issue_date: row.issue_date,
            expected_delivery_date: row.expected_delivery_date,
            actual_delivery_date: row.actual_delivery_date,
            acknowledgment_date: row.acknowledgment_date,
            status,
            quality_rating: row.quality_rating,
            quantity: row.quantity,
            items: row.items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str) -> PurchaseOrderRow {
        let now = Utc::now();
        PurchaseOrderRow {
            id: Uuid::new_v4(),
            po_number: "PO-77".to_string(),
            vendor_id: Uuid::new_v4(),
            order_date: now,
            issue_date: now,
            expected_delivery_date: now,
            actual_delivery_date: None,
            acknowledgment_date: None,
            status: status.to_string(),
            quality_rating: Some(4.0),
            quantity: 5,
            items: serde_json::json!({"sku": "A-1"}),
        }
    }

    #[test]
    fn test_row_conversion_parses_status() {
        let order = PurchaseOrder::try_from(row("acknowledged")).unwrap();
        assert_eq!(order.status, PoStatus::Acknowledged);
        assert_eq!(order.quality_rating, Some(4.0));
        assert_eq!(order.items["sku"], "A-1");
    }

    #[test]
    fn test_row_conversion_rejects_unknown_status() {
        let error = PurchaseOrder::try_from(row("shipped")).unwrap_err();
        assert!(error.to_string().contains("PO-77"));
    }
}
