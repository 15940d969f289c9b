//! Repository module for database CRUD operations
//!
//! Provides typed PostgreSQL repositories for vendors, purchase orders and
//! performance history, and [`PostgresStore`], which exposes them through the
//! [`ProcurementStore`] seam.

pub mod vendor;
pub mod purchase_order;
pub mod performance;

pub use vendor::VendorRepository;
pub use purchase_order::PurchaseOrderRepository;
pub use performance::PerformanceRepository;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use vms_models::{HistoricalPerformance, PurchaseOrder, Vendor, VendorMetrics};

use crate::postgres::PostgresPool;
use crate::store::ProcurementStore;

#[derive(Clone)]
pub struct PostgresStore {
    pub vendors: VendorRepository,
    pub purchase_orders: PurchaseOrderRepository,
    pub performance: PerformanceRepository,
}

impl PostgresStore {
    pub fn new(pool: PostgresPool) -> Self {
        Self {
            vendors: VendorRepository::new(pool.clone()),
            purchase_orders: PurchaseOrderRepository::new(pool.clone()),
            performance: PerformanceRepository::new(pool),
        }
    }
}

impl ProcurementStore for PostgresStore {
    async fn find_vendor(&self, id: Uuid) -> Result<Option<Vendor>> {
        self.vendors.find_by_id(id).await
    }

    async fn find_vendor_by_code(&self, vendor_code: &str) -> Result<Option<Vendor>> {
        self.vendors.find_by_code(vendor_code).await
    }

    async fn list_vendors(&self) -> Result<Vec<Vendor>> {
        self.vendors.find_all().await
    }

    async fn insert_vendor(&self, vendor: &Vendor) -> Result<()> {
        self.vendors.create(vendor).await
    }

    async fn update_vendor_profile(&self, vendor: &Vendor) -> Result<bool> {
        self.vendors.update_profile(vendor).await
    }

    async fn delete_vendor(&self, id: Uuid) -> Result<bool> {
        self.vendors.delete(id).await
    }

    async fn store_vendor_metrics(
        &self,
        vendor_id: Uuid,
        metrics: VendorMetrics,
        updated_at: DateTime<Utc>,
    ) -> Result<bool> {
        self.vendors
            .update_metrics(vendor_id, metrics, updated_at)
            .await
            .with_context(|| format!("vendor {vendor_id}"))
    }

    async fn find_purchase_order(&self, id: Uuid) -> Result<Option<PurchaseOrder>> {
        self.purchase_orders.find_by_id(id).await
    }

    async fn find_purchase_order_by_number(&self, po_number: &str) -> Result<Option<PurchaseOrder>> {
        self.purchase_orders.find_by_number(po_number).await
    }

    async fn list_purchase_orders(&self, vendor_id: Option<Uuid>) -> Result<Vec<PurchaseOrder>> {
        self.purchase_orders.find_all(vendor_id).await
    }

    async fn insert_purchase_order(&self, order: &PurchaseOrder) -> Result<()> {
        self.purchase_orders.create(order).await
    }

    async fn update_purchase_order(&self, order: &PurchaseOrder) -> Result<bool> {
        self.purchase_orders.update(order).await
    }

    async fn delete_purchase_order(&self, id: Uuid) -> Result<Option<PurchaseOrder>> {
        self.purchase_orders.delete(id).await
    }

    async fn insert_performance_snapshot(&self, snapshot: &HistoricalPerformance) -> Result<()> {
        self.performance.create(snapshot).await
    }

    async fn performance_history(&self, vendor_id: Option<Uuid>) -> Result<Vec<HistoricalPerformance>> {
        self.performance.find_all(vendor_id).await
    }
}
