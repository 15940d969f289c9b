//! Storage seam for the procurement core.
//!
//! The procurement service is generic over [`ProcurementStore`] so the same
//! write path runs against PostgreSQL in production and against
//! [`MemoryStore`](crate::memory::MemoryStore) in tests and embedded use.
//! Every method is a single persistence operation.

use std::future::Future;

use anyhow::Result;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use vms_models::{HistoricalPerformance, PurchaseOrder, Vendor, VendorMetrics};

pub trait ProcurementStore: Send + Sync + 'static {
    // ===== Vendors =====

    fn find_vendor(&self, id: Uuid) -> impl Future<Output = Result<Option<Vendor>>> + Send;

    fn find_vendor_by_code(
        &self,
        vendor_code: &str,
    ) -> impl Future<Output = Result<Option<Vendor>>> + Send;

    /// All vendors ordered by name.
    fn list_vendors(&self) -> impl Future<Output = Result<Vec<Vendor>>> + Send;

    fn insert_vendor(&self, vendor: &Vendor) -> impl Future<Output = Result<()>> + Send;

    /// Persists profile fields only; stored metrics are left untouched.
    /// Returns `false` when the vendor does not exist.
    fn update_vendor_profile(&self, vendor: &Vendor) -> impl Future<Output = Result<bool>> + Send;

    /// Removes the vendor together with its purchase orders and snapshots.
    fn delete_vendor(&self, id: Uuid) -> impl Future<Output = Result<bool>> + Send;

    /// Writes all four metrics and `updated_at` in one operation.
    fn store_vendor_metrics(
        &self,
        vendor_id: Uuid,
        metrics: VendorMetrics,
        updated_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<bool>> + Send;

    // ===== Purchase orders =====

    fn find_purchase_order(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<PurchaseOrder>>> + Send;

    fn find_purchase_order_by_number(
        &self,
        po_number: &str,
    ) -> impl Future<Output = Result<Option<PurchaseOrder>>> + Send;

    /// Orders of one vendor, or of every vendor when `vendor_id` is `None`,
    /// newest order date first.
    fn list_purchase_orders(
        &self,
        vendor_id: Option<Uuid>,
    ) -> impl Future<Output = Result<Vec<PurchaseOrder>>> + Send;

    fn insert_purchase_order(
        &self,
        order: &PurchaseOrder,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Returns `false` when the order does not exist.
    fn update_purchase_order(
        &self,
        order: &PurchaseOrder,
    ) -> impl Future<Output = Result<bool>> + Send;

    /// Returns the removed order, if there was one.
    fn delete_purchase_order(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<PurchaseOrder>>> + Send;

    // ===== Historical performance =====

    fn insert_performance_snapshot(
        &self,
        snapshot: &HistoricalPerformance,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Snapshots of one vendor (or all vendors), most recent first.
    fn performance_history(
        &self,
        vendor_id: Option<Uuid>,
    ) -> impl Future<Output = Result<Vec<HistoricalPerformance>>> + Send;
}
