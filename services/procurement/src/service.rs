//! Procurement Service
//!
//! Core boundary for purchase orders, vendors and vendor performance. Every
//! purchase-order write follows the same path: validate, load, check access,
//! lock the affected vendors, re-read under the lock, persist, then fire the
//! recalculation trigger once per affected vendor before returning.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use vms_database::ProcurementStore;
use vms_models::{
    AcknowledgePurchaseOrder, HistoricalPerformance, NewPurchaseOrder, NewVendor, PurchaseOrder,
    PurchaseOrderUpdate, Vendor, VendorMetrics, VendorPerformance, VendorProfileUpdate,
};
use vms_utils::{validate_model, VmsError, VmsResult};

use crate::access::Caller;
use crate::metrics::MetricsEngine;
use crate::status::{self, FieldWarning};
use crate::trigger::{RecalculationTrigger, VendorGuard};

/// Result of an acknowledgment. `warnings` lists optional fields that were
/// rejected while the acknowledgment itself was saved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcknowledgeOutcome {
    pub order: PurchaseOrder,
    pub warnings: Vec<FieldWarning>,
}

impl AcknowledgeOutcome {
    pub fn is_partial(&self) -> bool {
        !self.warnings.is_empty()
    }
}

pub struct ProcurementService<S> {
    store: Arc<S>,
    trigger: RecalculationTrigger<S>,
}

impl<S> Clone for ProcurementService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            trigger: self.trigger.clone(),
        }
    }
}

impl<S: ProcurementStore> ProcurementService<S> {
    pub fn new(store: S) -> Self {
        let store = Arc::new(store);
        let trigger = RecalculationTrigger::new(MetricsEngine::new(Arc::clone(&store)));
        Self { store, trigger }
    }

    /// Direct access to the backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn trigger(&self) -> &RecalculationTrigger<S> {
        &self.trigger
    }

    // ===== Purchase orders =====

    /// Issues a new pending purchase order.
    #[instrument(skip(self, payload), fields(po_number = %payload.po_number, vendor_id = %payload.vendor_id))]
    pub async fn create_purchase_order(
        &self,
        caller: Caller,
        payload: NewPurchaseOrder,
    ) -> VmsResult<PurchaseOrder> {
        caller.ensure_staff("create purchase orders")?;
        validate_model(&payload)?;

        let guard = self.trigger.lock(&[payload.vendor_id]).await;
        self.require_vendor(payload.vendor_id).await?;
        if self
            .store
            .find_purchase_order_by_number(&payload.po_number)
            .await?
            .is_some()
        {
            return Err(VmsError::validation(
                "po_number",
                format!("PO number '{}' is already in use", payload.po_number),
            ));
        }

        let now = Utc::now();
        let mut order = PurchaseOrder::issue(payload, now);
        status::before_save(&mut order, now);
        self.store.insert_purchase_order(&order).await?;
        info!(po_id = %order.id, "Purchase order issued");

        self.trigger.fire(&guard, order.vendor_id).await?;
        Ok(order)
    }

    /// Acknowledges an order on behalf of its vendor.
    ///
    /// An invalid `expected_delivery_date` in the payload does not fail the
    /// call; it is left unapplied and reported in the outcome's warnings.
    #[instrument(skip(self, payload))]
    pub async fn acknowledge_purchase_order(
        &self,
        caller: Caller,
        id: Uuid,
        payload: AcknowledgePurchaseOrder,
    ) -> VmsResult<AcknowledgeOutcome> {
        let (guard, mut order) = self.lock_order(caller, id).await?;

        let now = Utc::now();
        status::acknowledge(&mut order, now)?;
        let warnings = status::apply_acknowledgment_fields(&mut order, payload.expected_delivery_date);
        status::before_save(&mut order, now);

        self.save_order(&order).await?;
        if warnings.is_empty() {
            info!(po_number = %order.po_number, "Purchase order acknowledged");
        } else {
            warn!(
                po_number = %order.po_number,
                rejected = warnings.len(),
                "Purchase order acknowledged with rejected fields"
            );
        }

        self.trigger.fire(&guard, order.vendor_id).await?;
        Ok(AcknowledgeOutcome { order, warnings })
    }

    /// Applies a generic field update, including status changes and vendor
    /// reassignment. Either every field is saved or none is.
    #[instrument(skip(self, update))]
    pub async fn update_purchase_order(
        &self,
        caller: Caller,
        id: Uuid,
        update: PurchaseOrderUpdate,
    ) -> VmsResult<PurchaseOrder> {
        caller.ensure_staff("update purchase orders")?;
        validate_model(&update)?;

        let (guard, mut order) = loop {
            let current = self.require_order(id).await?;
            let target = update.vendor_id.unwrap_or(current.vendor_id);
            let guard = self.trigger.lock(&[current.vendor_id, target]).await;

            let order = self.require_order(id).await?;
            if order.vendor_id == current.vendor_id {
                break (guard, order);
            }
        };

        let previous_vendor = order.vendor_id;
        if let Some(target) = update.vendor_id {
            if target != previous_vendor {
                self.require_vendor(target).await?;
            }
        }

        status::apply_update(&mut order, update, Utc::now())?;
        self.save_order(&order).await?;
        info!(
            po_number = %order.po_number,
            status = %order.status,
            "Purchase order updated"
        );

        for vendor_id in guard.vendors() {
            self.trigger.fire(&guard, *vendor_id).await?;
        }
        if previous_vendor != order.vendor_id {
            info!(from = %previous_vendor, to = %order.vendor_id, "Purchase order reassigned");
        }
        Ok(order)
    }

    #[instrument(skip(self))]
    pub async fn delete_purchase_order(&self, caller: Caller, id: Uuid) -> VmsResult<()> {
        caller.ensure_staff("delete purchase orders")?;
        let (guard, order) = self.lock_order(caller, id).await?;

        let removed = self
            .store
            .delete_purchase_order(order.id)
            .await?
            .ok_or_else(|| VmsError::not_found(format!("purchase order {id}")))?;
        info!(po_number = %removed.po_number, "Purchase order deleted");

        self.trigger.fire(&guard, removed.vendor_id).await?;
        Ok(())
    }

    pub async fn get_purchase_order(&self, caller: Caller, id: Uuid) -> VmsResult<PurchaseOrder> {
        let order = self.require_order(id).await?;
        caller.ensure_owns(order.vendor_id)?;
        Ok(order)
    }

    /// Lists orders, newest first. Vendor callers only ever see their own.
    pub async fn list_purchase_orders(
        &self,
        caller: Caller,
        vendor_id: Option<Uuid>,
    ) -> VmsResult<Vec<PurchaseOrder>> {
        let filter = caller.scope_filter(vendor_id)?;
        Ok(self.store.list_purchase_orders(filter).await?)
    }

    // ===== Performance =====

    /// The metrics last written by the engine. Never computed on read.
    pub async fn vendor_performance(
        &self,
        caller: Caller,
        vendor_id: Uuid,
    ) -> VmsResult<VendorPerformance> {
        caller.ensure_owns(vendor_id)?;
        let vendor = self.require_vendor(vendor_id).await?;
        Ok(VendorPerformance::from(&vendor))
    }

    pub async fn performance_history(
        &self,
        caller: Caller,
        vendor_id: Option<Uuid>,
    ) -> VmsResult<Vec<HistoricalPerformance>> {
        let filter = caller.scope_filter(vendor_id)?;
        Ok(self.store.performance_history(filter).await?)
    }

    /// Stores a dated copy of the vendor's current metrics.
    #[instrument(skip(self))]
    pub async fn record_performance_snapshot(
        &self,
        caller: Caller,
        vendor_id: Uuid,
    ) -> VmsResult<HistoricalPerformance> {
        caller.ensure_staff("record performance snapshots")?;

        let _guard = self.trigger.lock(&[vendor_id]).await;
        let vendor = self.require_vendor(vendor_id).await?;
        let snapshot = HistoricalPerformance::snapshot(&vendor, Utc::now());
        self.store.insert_performance_snapshot(&snapshot).await?;
        info!(vendor_code = %vendor.vendor_code, "Performance snapshot recorded");
        Ok(snapshot)
    }

    /// Recomputes a vendor's metrics from its full order history.
    #[instrument(skip(self))]
    pub async fn recalculate_vendor_metrics(
        &self,
        caller: Caller,
        vendor_id: Uuid,
    ) -> VmsResult<VendorMetrics> {
        caller.ensure_staff("recalculate vendor metrics")?;
        let guard = self.trigger.lock(&[vendor_id]).await;
        self.trigger.fire(&guard, vendor_id).await
    }

    // ===== Vendors =====

    #[instrument(skip(self, payload), fields(vendor_code = %payload.vendor_code))]
    pub async fn create_vendor(&self, caller: Caller, payload: NewVendor) -> VmsResult<Vendor> {
        caller.ensure_staff("register vendors")?;
        validate_model(&payload)?;
        self.ensure_code_available(&payload.vendor_code, None).await?;

        let vendor = Vendor::new(payload, Utc::now());
        self.store.insert_vendor(&vendor).await?;
        info!(vendor_id = %vendor.id, "Vendor registered");
        Ok(vendor)
    }

    /// Updates profile fields. Metrics cannot be written through this path.
    #[instrument(skip(self, update))]
    pub async fn update_vendor(
        &self,
        caller: Caller,
        id: Uuid,
        update: VendorProfileUpdate,
    ) -> VmsResult<Vendor> {
        caller.ensure_staff("update vendors")?;
        validate_model(&update)?;

        let _guard = self.trigger.lock(&[id]).await;
        let mut vendor = self.require_vendor(id).await?;
        if let Some(code) = update.vendor_code.as_deref() {
            self.ensure_code_available(code, Some(id)).await?;
        }

        if vendor.apply_profile(update, Utc::now()) {
            if !self.store.update_vendor_profile(&vendor).await? {
                return Err(VmsError::not_found(format!("vendor {id}")));
            }
            info!(vendor_code = %vendor.vendor_code, "Vendor profile updated");
        }
        Ok(vendor)
    }

    /// Removes a vendor together with its orders and performance history.
    #[instrument(skip(self))]
    pub async fn delete_vendor(&self, caller: Caller, id: Uuid) -> VmsResult<()> {
        caller.ensure_staff("delete vendors")?;

        let guard = self.trigger.lock(&[id]).await;
        if !self.store.delete_vendor(id).await? {
            return Err(VmsError::not_found(format!("vendor {id}")));
        }
        drop(guard);
        self.trigger.forget(id);

        info!("Vendor deleted");
        Ok(())
    }

    pub async fn get_vendor(&self, caller: Caller, id: Uuid) -> VmsResult<Vendor> {
        caller.ensure_owns(id)?;
        self.require_vendor(id).await
    }

    pub async fn list_vendors(&self, caller: Caller) -> VmsResult<Vec<Vendor>> {
        caller.ensure_staff("list vendors")?;
        Ok(self.store.list_vendors().await?)
    }

    // ===== Helpers =====

    async fn require_vendor(&self, id: Uuid) -> VmsResult<Vendor> {
        self.store
            .find_vendor(id)
            .await?
            .ok_or_else(|| VmsError::not_found(format!("vendor {id}")))
    }

    async fn require_order(&self, id: Uuid) -> VmsResult<PurchaseOrder> {
        self.store
            .find_purchase_order(id)
            .await?
            .ok_or_else(|| VmsError::not_found(format!("purchase order {id}")))
    }

    /// Loads an order and locks its vendor, retrying if the order was
    /// reassigned between the read and the lock.
    async fn lock_order(&self, caller: Caller, id: Uuid) -> VmsResult<(VendorGuard, PurchaseOrder)> {
        loop {
            let current = self.require_order(id).await?;
            caller.ensure_owns(current.vendor_id)?;

            let guard = self.trigger.lock(&[current.vendor_id]).await;
            let order = self.require_order(id).await?;
            if order.vendor_id == current.vendor_id {
                return Ok((guard, order));
            }
        }
    }

    async fn save_order(&self, order: &PurchaseOrder) -> VmsResult<()> {
        if !self.store.update_purchase_order(order).await? {
            return Err(VmsError::not_found(format!("purchase order {}", order.id)));
        }
        Ok(())
    }

    async fn ensure_code_available(&self, code: &str, owner: Option<Uuid>) -> VmsResult<()> {
        match self.store.find_vendor_by_code(code).await? {
            Some(existing) if Some(existing.id) != owner => Err(VmsError::validation(
                "vendor_code",
                format!("vendor code '{code}' is already in use"),
            )),
            _ => Ok(()),
        }
    }
}
