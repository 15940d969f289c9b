//! Vendor Metrics Engine
//!
//! Turns a vendor's complete purchase-order history into the four performance
//! statistics and stores them on the vendor. Every recalculation starts from
//! the full current order set, so repeated calls over unchanged data produce
//! identical values.

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use vms_database::ProcurementStore;
use vms_models::{PurchaseOrder, VendorMetrics};
use vms_utils::{VmsError, VmsResult};

/// Computes the metrics for one vendor's orders.
///
/// Degenerate inputs never fail: any ratio or mean over an empty set is `0.0`.
pub fn compute_metrics(orders: &[PurchaseOrder]) -> VendorMetrics {
    let completed: Vec<&PurchaseOrder> = orders.iter().filter(|po| po.is_completed()).collect();

    let on_time = completed.iter().filter(|po| po.delivered_on_time()).count();
    let ratings: Vec<f64> = completed
        .iter()
        .filter_map(|po| po.quality_rating)
        .filter(|rating| rating.is_finite())
        .collect();
    // Acknowledgments recorded before the issue date are dropped, not clamped.
    let response_hours: Vec<f64> = orders
        .iter()
        .filter_map(PurchaseOrder::response_time_hours)
        .collect();

    VendorMetrics {
        on_time_delivery_rate: percentage(on_time, completed.len()),
        quality_rating_avg: mean(&ratings),
        average_response_time: mean(&response_hours),
        fulfillment_rate: percentage(completed.len(), orders.len()),
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Reads a vendor's orders, computes its metrics and writes them back.
pub struct MetricsEngine<S> {
    store: Arc<S>,
}

impl<S> Clone for MetricsEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: ProcurementStore> MetricsEngine<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Recomputes and persists the metrics of `vendor_id`.
    ///
    /// The four values and `updated_at` go to the store in a single write.
    pub async fn recalculate(&self, vendor_id: Uuid) -> VmsResult<VendorMetrics> {
        let orders = self.store.list_purchase_orders(Some(vendor_id)).await?;
        let metrics = compute_metrics(&orders);

        let stored = self
            .store
            .store_vendor_metrics(vendor_id, metrics, Utc::now())
            .await?;
        if !stored {
            return Err(VmsError::not_found(format!("vendor {vendor_id}")));
        }

        debug!(
            %vendor_id,
            orders = orders.len(),
            on_time_delivery_rate = metrics.on_time_delivery_rate,
            quality_rating_avg = metrics.quality_rating_avg,
            average_response_time = metrics.average_response_time,
            fulfillment_rate = metrics.fulfillment_rate,
            "Vendor metrics recalculated"
        );
        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone};
    use proptest::prelude::*;
    use vms_models::{NewPurchaseOrder, PoStatus};

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn order(status: PoStatus) -> PurchaseOrder {
        let issued = base_time();
        let mut po = PurchaseOrder::issue(
            NewPurchaseOrder {
                po_number: "PO-T".to_string(),
                vendor_id: Uuid::nil(),
                expected_delivery_date: issued + Duration::days(5),
                quantity: 1,
                items: serde_json::json!({}),
            },
            issued,
        );
        po.status = status;
        po
    }

    fn completed(rating: Option<f64>, days_late: i64) -> PurchaseOrder {
        let mut po = order(PoStatus::Completed);
        po.actual_delivery_date = Some(po.expected_delivery_date + Duration::days(days_late));
        po.quality_rating = rating;
        po
    }

    #[test]
    fn test_no_orders_yields_zero_metrics() {
        assert_eq!(compute_metrics(&[]), VendorMetrics::default());
    }

    #[test]
    fn test_mixed_history_scenario() {
        let orders = vec![
            completed(Some(4.0), 0),
            completed(Some(5.0), 2),
            order(PoStatus::Pending),
        ];
        let metrics = compute_metrics(&orders);

        assert!((metrics.fulfillment_rate - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(format!("{:.2}", metrics.fulfillment_rate), "66.67");
        assert_eq!(metrics.quality_rating_avg, 4.5);
        assert_eq!(metrics.on_time_delivery_rate, 50.0);
        assert_eq!(metrics.average_response_time, 0.0);
    }

    #[test]
    fn test_all_completed_is_full_fulfillment() {
        let orders = vec![completed(None, -1), completed(Some(3.0), 0)];
        let metrics = compute_metrics(&orders);
        assert_eq!(metrics.fulfillment_rate, 100.0);
        assert_eq!(metrics.on_time_delivery_rate, 100.0);
        // Unrated orders do not count toward the average.
        assert_eq!(metrics.quality_rating_avg, 3.0);
    }

    #[test]
    fn test_completed_without_delivery_date_is_late() {
        let mut po = order(PoStatus::Completed);
        po.actual_delivery_date = None;
        let metrics = compute_metrics(&[po]);
        assert_eq!(metrics.on_time_delivery_rate, 0.0);
        assert_eq!(metrics.fulfillment_rate, 100.0);
    }

    #[test]
    fn test_ratings_on_open_orders_are_ignored() {
        let mut pending = order(PoStatus::Acknowledged);
        pending.quality_rating = Some(1.0);
        let metrics = compute_metrics(&[pending, completed(Some(5.0), 0)]);
        assert_eq!(metrics.quality_rating_avg, 5.0);
    }

    #[test]
    fn test_negative_response_intervals_are_excluded() {
        let mut early = order(PoStatus::Acknowledged);
        early.acknowledgment_date = Some(early.issue_date - Duration::hours(1));
        let mut prompt = order(PoStatus::Acknowledged);
        prompt.acknowledgment_date = Some(prompt.issue_date + Duration::hours(4));
        let mut slow = order(PoStatus::Completed);
        slow.acknowledgment_date = Some(slow.issue_date + Duration::hours(8));

        let metrics = compute_metrics(&[early.clone()]);
        assert_eq!(metrics.average_response_time, 0.0);

        let metrics = compute_metrics(&[early, prompt, slow]);
        assert_eq!(metrics.average_response_time, 6.0);
    }

    #[test]
    fn test_non_finite_ratings_are_skipped() {
        let orders = vec![completed(Some(f64::NAN), 0), completed(Some(3.0), 0)];
        let metrics = compute_metrics(&orders);
        assert_eq!(metrics.quality_rating_avg, 3.0);

        let metrics = compute_metrics(&[completed(Some(f64::INFINITY), 0)]);
        assert_eq!(metrics.quality_rating_avg, 0.0);
    }

    #[test]
    fn test_canceled_orders_only_dilute_fulfillment() {
        let metrics = compute_metrics(&[completed(Some(4.0), 0), order(PoStatus::Canceled)]);
        assert_eq!(metrics.fulfillment_rate, 50.0);
        assert_eq!(metrics.on_time_delivery_rate, 100.0);
        assert_eq!(metrics.quality_rating_avg, 4.0);
    }

    fn arb_order() -> impl Strategy<Value = PurchaseOrder> {
        (
            prop_oneof![
                Just(PoStatus::Pending),
                Just(PoStatus::Acknowledged),
                Just(PoStatus::Completed),
                Just(PoStatus::Canceled),
            ],
            proptest::option::of(0.0..=5.0f64),
            proptest::option::of(-72i64..72),
            proptest::option::of(-10i64..10),
        )
            .prop_map(|(status, rating, ack_offset_hours, delivery_offset_days)| {
                let mut po = order(status);
                po.quality_rating = rating;
                po.acknowledgment_date =
                    ack_offset_hours.map(|h| po.issue_date + Duration::hours(h));
                po.actual_delivery_date =
                    delivery_offset_days.map(|d| po.expected_delivery_date + Duration::days(d));
                po
            })
    }

    proptest! {
        #[test]
        fn prop_metrics_stay_in_range(orders in proptest::collection::vec(arb_order(), 0..40)) {
            let metrics = compute_metrics(&orders);
            prop_assert!((0.0..=100.0).contains(&metrics.on_time_delivery_rate));
            prop_assert!((0.0..=100.0).contains(&metrics.fulfillment_rate));
            prop_assert!(metrics.quality_rating_avg >= 0.0 && metrics.quality_rating_avg <= 5.0 + 1e-9);
            prop_assert!(metrics.average_response_time >= 0.0);
        }

        #[test]
        fn prop_pending_orders_do_not_move_on_time_rate(
            orders in proptest::collection::vec(arb_order(), 0..20),
        ) {
            let before = compute_metrics(&orders);
            let mut with_pending = orders.clone();
            with_pending.push(order(PoStatus::Pending));
            let after = compute_metrics(&with_pending);

            prop_assert_eq!(before.on_time_delivery_rate, after.on_time_delivery_rate);
            prop_assert_eq!(before.quality_rating_avg, after.quality_rating_avg);
        }

        #[test]
        fn prop_computation_is_deterministic(orders in proptest::collection::vec(arb_order(), 0..20)) {
            prop_assert_eq!(compute_metrics(&orders), compute_metrics(&orders));
        }
    }
}
