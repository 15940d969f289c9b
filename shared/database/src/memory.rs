//! In-memory store
//!
//! Process-local implementation of [`ProcurementStore`]. Locks are always taken
//! in the order vendors, purchase orders, history.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use vms_models::{HistoricalPerformance, PurchaseOrder, Vendor, VendorMetrics};

use crate::store::ProcurementStore;

#[derive(Clone, Default)]
pub struct MemoryStore {
    vendors: Arc<RwLock<HashMap<Uuid, Vendor>>>,
    purchase_orders: Arc<RwLock<HashMap<Uuid, PurchaseOrder>>>,
    history: Arc<RwLock<HashMap<Uuid, HistoricalPerformance>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProcurementStore for MemoryStore {
    async fn find_vendor(&self, id: Uuid) -> Result<Option<Vendor>> {
        Ok(self.vendors.read().await.get(&id).cloned())
    }

    async fn find_vendor_by_code(&self, vendor_code: &str) -> Result<Option<Vendor>> {
        let vendors = self.vendors.read().await;
        Ok(vendors.values().find(|v| v.vendor_code == vendor_code).cloned())
    }

    async fn list_vendors(&self) -> Result<Vec<Vendor>> {
        let vendors = self.vendors.read().await;
        let mut all: Vec<Vendor> = vendors.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn insert_vendor(&self, vendor: &Vendor) -> Result<()> {
        let mut vendors = self.vendors.write().await;
        if vendors.values().any(|v| v.vendor_code == vendor.vendor_code) {
            bail!("duplicate vendor_code '{}'", vendor.vendor_code);
        }
        vendors.insert(vendor.id, vendor.clone());
        Ok(())
    }

    async fn update_vendor_profile(&self, vendor: &Vendor) -> Result<bool> {
        let mut vendors = self.vendors.write().await;
        if vendors
            .values()
            .any(|v| v.id != vendor.id && v.vendor_code == vendor.vendor_code)
        {
            bail!("duplicate vendor_code '{}'", vendor.vendor_code);
        }
        let Some(stored) = vendors.get_mut(&vendor.id) else {
            return Ok(false);
        };
        stored.vendor_code = vendor.vendor_code.clone();
        stored.name = vendor.name.clone();
        stored.contact_details = vendor.contact_details.clone();
        stored.address = vendor.address.clone();
        stored.updated_at = vendor.updated_at;
        Ok(true)
    }

    async fn delete_vendor(&self, id: Uuid) -> Result<bool> {
        let mut vendors = self.vendors.write().await;
        let mut orders = self.purchase_orders.write().await;
        let mut history = self.history.write().await;

        let removed = vendors.remove(&id).is_some();
        if removed {
            orders.retain(|_, po| po.vendor_id != id);
            history.retain(|_, snapshot| snapshot.vendor_id != id);
        }
        Ok(removed)
    }

    async fn store_vendor_metrics(
        &self,
        vendor_id: Uuid,
        metrics: VendorMetrics,
        updated_at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut vendors = self.vendors.write().await;
        match vendors.get_mut(&vendor_id) {
            Some(vendor) => {
                vendor.metrics = metrics;
                vendor.updated_at = updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_purchase_order(&self, id: Uuid) -> Result<Option<PurchaseOrder>> {
        Ok(self.purchase_orders.read().await.get(&id).cloned())
    }

    async fn find_purchase_order_by_number(&self, po_number: &str) -> Result<Option<PurchaseOrder>> {
        let orders = self.purchase_orders.read().await;
        Ok(orders.values().find(|po| po.po_number == po_number).cloned())
    }

    async fn list_purchase_orders(&self, vendor_id: Option<Uuid>) -> Result<Vec<PurchaseOrder>> {
        let orders = self.purchase_orders.read().await;
        let mut matching: Vec<PurchaseOrder> = orders
            .values()
            .filter(|po| vendor_id.map_or(true, |id| po.vendor_id == id))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.order_date.cmp(&a.order_date).then_with(|| a.po_number.cmp(&b.po_number)));
        Ok(matching)
    }

    async fn insert_purchase_order(&self, order: &PurchaseOrder) -> Result<()> {
        let vendors = self.vendors.read().await;
        let mut orders = self.purchase_orders.write().await;
        if !vendors.contains_key(&order.vendor_id) {
            bail!("vendor {} does not exist", order.vendor_id);
        }
        if orders.values().any(|po| po.po_number == order.po_number) {
            bail!("duplicate po_number '{}'", order.po_number);
        }
        orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn update_purchase_order(&self, order: &PurchaseOrder) -> Result<bool> {
        let vendors = self.vendors.read().await;
        let mut orders = self.purchase_orders.write().await;
        if !vendors.contains_key(&order.vendor_id) {
            bail!("vendor {} does not exist", order.vendor_id);
        }
        match orders.get_mut(&order.id) {
            Some(stored) => {
                *stored = order.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_purchase_order(&self, id: Uuid) -> Result<Option<PurchaseOrder>> {
        Ok(self.purchase_orders.write().await.remove(&id))
    }

    async fn insert_performance_snapshot(&self, snapshot: &HistoricalPerformance) -> Result<()> {
        let vendors = self.vendors.read().await;
        let mut history = self.history.write().await;
        if !vendors.contains_key(&snapshot.vendor_id) {
            bail!("vendor {} does not exist", snapshot.vendor_id);
        }
        history.insert(snapshot.id, snapshot.clone());
        Ok(())
    }

    async fn performance_history(&self, vendor_id: Option<Uuid>) -> Result<Vec<HistoricalPerformance>> {
        let history = self.history.read().await;
        let mut matching: Vec<HistoricalPerformance> = history
            .values()
            .filter(|s| vendor_id.map_or(true, |id| s.vendor_id == id))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(matching)
    }
}
