use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::vendor::{Vendor, VendorMetrics};

/// Point-in-time copy of a vendor's metrics. Read-only to clients.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct HistoricalPerformance {
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub date: DateTime<Utc>,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub metrics: VendorMetrics,
}

impl HistoricalPerformance {
    /// Captures the metrics currently stored on `vendor`.
    pub fn snapshot(vendor: &Vendor, date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            vendor_id: vendor.id,
            date,
            metrics: vendor.metrics,
        }
    }
}

/// Read-only view of a vendor's current metrics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VendorPerformance {
    pub id: Uuid,
    pub name: String,
    pub vendor_code: String,
    #[serde(flatten)]
    pub metrics: VendorMetrics,
    pub updated_at: DateTime<Utc>,
}

impl From<&Vendor> for VendorPerformance {
    fn from(vendor: &Vendor) -> Self {
        Self {
            id: vendor.id,
            name: vendor.name.clone(),
            vendor_code: vendor.vendor_code.clone(),
            metrics: vendor.metrics,
            updated_at: vendor.updated_at,
        }
    }
}
