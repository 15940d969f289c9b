//! Post-commit recalculation trigger.
//!
//! The purchase-order write path calls [`RecalculationTrigger::fire`] once per
//! affected vendor after its write is durable. Each vendor has an async mutex;
//! the service holds the guard across "write, recompute, store" so two writes
//! for the same vendor can never interleave a stale metrics overwrite.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;
use uuid::Uuid;

use vms_database::ProcurementStore;
use vms_models::VendorMetrics;
use vms_utils::{VmsError, VmsResult};

use crate::metrics::MetricsEngine;

type VendorLocks = HashMap<Uuid, Arc<AsyncMutex<()>>>;

pub struct RecalculationTrigger<S> {
    engine: MetricsEngine<S>,
    locks: Arc<Mutex<VendorLocks>>,
    fired: Arc<AtomicU64>,
}

impl<S> Clone for RecalculationTrigger<S> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            locks: Arc::clone(&self.locks),
            fired: Arc::clone(&self.fired),
        }
    }
}

/// Exclusive hold on one or more vendors' write paths.
pub struct VendorGuard {
    vendors: Vec<Uuid>,
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl VendorGuard {
    pub fn covers(&self, vendor_id: Uuid) -> bool {
        self.vendors.binary_search(&vendor_id).is_ok()
    }

    pub fn vendors(&self) -> &[Uuid] {
        &self.vendors
    }
}

impl<S: ProcurementStore> RecalculationTrigger<S> {
    pub fn new(engine: MetricsEngine<S>) -> Self {
        Self {
            engine,
            locks: Arc::new(Mutex::new(HashMap::new())),
            fired: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Locks the given vendors in ascending id order.
    pub async fn lock(&self, vendor_ids: &[Uuid]) -> VendorGuard {
        let mut vendors = vendor_ids.to_vec();
        vendors.sort_unstable();
        vendors.dedup();

        let mutexes: Vec<Arc<AsyncMutex<()>>> = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            vendors
                .iter()
                .map(|id| Arc::clone(locks.entry(*id).or_default()))
                .collect()
        };

        let mut guards = Vec::with_capacity(mutexes.len());
        for mutex in mutexes {
            guards.push(mutex.lock_owned().await);
        }

        VendorGuard {
            vendors,
            _guards: guards,
        }
    }

    /// Recomputes and stores the metrics of `vendor_id`.
    ///
    /// The caller must already hold `vendor_id` through `guard`.
    pub async fn fire(&self, guard: &VendorGuard, vendor_id: Uuid) -> VmsResult<VendorMetrics> {
        if !guard.covers(vendor_id) {
            return Err(VmsError::internal(format!(
                "recalculation for vendor {vendor_id} requested without holding its lock"
            )));
        }

        let metrics = self.engine.recalculate(vendor_id).await?;
        self.fired.fetch_add(1, Ordering::Relaxed);
        debug!(%vendor_id, "Recalculation trigger fired");
        Ok(metrics)
    }

    /// Drops the lock entry of a deleted vendor.
    pub fn forget(&self, vendor_id: Uuid) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.remove(&vendor_id);
    }

    /// Total number of recalculations fired so far.
    pub fn recalculations(&self) -> u64 {
        self.fired.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use chrono::Utc;
    use vms_database::MemoryStore;
    use vms_models::{NewVendor, Vendor};

    async fn setup() -> (RecalculationTrigger<MemoryStore>, Uuid) {
        let store = Arc::new(MemoryStore::new());
        let vendor = Vendor::new(
            NewVendor {
                vendor_code: "ACME".to_string(),
                name: "Acme".to_string(),
                contact_details: "ops@acme.test".to_string(),
                address: "7 Quay".to_string(),
            },
            Utc::now(),
        );
        store.insert_vendor(&vendor).await.unwrap();
        (RecalculationTrigger::new(MetricsEngine::new(store)), vendor.id)
    }

    #[tokio::test]
    async fn test_fire_requires_guard() {
        let (trigger, vendor_id) = setup().await;
        let other = trigger.lock(&[Uuid::new_v4()]).await;
        let error = trigger.fire(&other, vendor_id).await.unwrap_err();
        assert_eq!(error.error_code(), "INTERNAL_SERVER_ERROR");
        assert_eq!(trigger.recalculations(), 0);

        let guard = trigger.lock(&[vendor_id]).await;
        let metrics = trigger.fire(&guard, vendor_id).await.unwrap();
        assert_eq!(metrics, VendorMetrics::default());
        assert_eq!(trigger.recalculations(), 1);
    }

    #[tokio::test]
    async fn test_lock_sorts_and_dedups() {
        let (trigger, _) = setup().await;
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let guard = trigger.lock(&[b, a, b]).await;
        assert_eq!(guard.vendors().len(), 2);
        assert!(guard.vendors()[0] < guard.vendors()[1]);
        assert!(guard.covers(a) && guard.covers(b));
    }

    #[tokio::test]
    async fn test_same_vendor_is_serialized() {
        let (trigger, vendor_id) = setup().await;
        let guard = trigger.lock(&[vendor_id]).await;

        let contender = trigger.clone();
        let waiting = tokio::spawn(async move {
            let _guard = contender.lock(&[vendor_id]).await;
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiting.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), waiting)
            .await
            .unwrap()
            .unwrap();
    }
}
