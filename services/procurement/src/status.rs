//! Purchase Order Status Transitions
//!
//! Lifecycle rules and timestamp stamping applied to an order before it is
//! persisted. These functions mutate an in-memory copy only; the service
//! decides when the result is written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use vms_models::{PoStatus, PurchaseOrder, PurchaseOrderUpdate};
use vms_utils::{validate_not_before, VmsError, VmsResult};

/// A supplementary field that was rejected while the main change went through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldWarning {
    pub field: String,
    pub message: String,
}

/// Marks the order acknowledged.
///
/// An unset `acknowledgment_date` becomes `max(now, issue_date)`, so an
/// acknowledgment never precedes issuance even for a future-dated order. An
/// existing acknowledgment date is kept.
pub fn acknowledge(order: &mut PurchaseOrder, now: DateTime<Utc>) -> VmsResult<()> {
    if !order.status.can_transition_to(PoStatus::Acknowledged) {
        return Err(VmsError::validation(
            "status",
            format!("cannot acknowledge a {} purchase order", order.status),
        ));
    }

    if order.acknowledgment_date.is_none() {
        order.acknowledgment_date = Some(now.max(order.issue_date));
    }
    order.status = PoStatus::Acknowledged;
    Ok(())
}

/// Applies the optional expected delivery date sent with an acknowledgment.
///
/// Failure is reported as a warning; the order is left unchanged in that case.
pub fn apply_acknowledgment_fields(
    order: &mut PurchaseOrder,
    expected_delivery_date: Option<DateTime<Utc>>,
) -> Vec<FieldWarning> {
    let Some(date) = expected_delivery_date else {
        return Vec::new();
    };

    match validate_not_before("expected_delivery_date", date, "issue_date", order.issue_date) {
        Ok(()) => {
            order.expected_delivery_date = date;
            Vec::new()
        }
        Err(error) => {
            warn!(po_number = %order.po_number, %error, "Ignoring expected delivery date on acknowledgment");
            vec![FieldWarning {
                field: "expected_delivery_date".to_string(),
                message: error.to_string(),
            }]
        }
    }
}

/// Applies an already validated field update, all or nothing.
///
/// The status change is checked against the lifecycle, then the fields are
/// written and [`before_save`] runs.
pub fn apply_update(
    order: &mut PurchaseOrder,
    update: PurchaseOrderUpdate,
    now: DateTime<Utc>,
) -> VmsResult<()> {
    if let Some(target) = update.status {
        if !order.status.can_transition_to(target) {
            return Err(VmsError::validation(
                "status",
                format!("cannot move purchase order from {} to {}", order.status, target),
            ));
        }
    }

    let mut next = order.clone();
    if let Some(vendor_id) = update.vendor_id {
        next.vendor_id = vendor_id;
    }
    if let Some(date) = update.expected_delivery_date {
        next.expected_delivery_date = date;
    }
    if let Some(date) = update.actual_delivery_date {
        next.actual_delivery_date = Some(date);
    }
    if let Some(rating) = update.quality_rating {
        next.quality_rating = Some(rating);
    }
    if let Some(quantity) = update.quantity {
        next.quantity = quantity;
    }
    if let Some(items) = update.items {
        next.items = items;
    }
    match update.status {
        Some(PoStatus::Acknowledged) => acknowledge(&mut next, now)?,
        Some(status) => next.status = status,
        None => {}
    }

    before_save(&mut next, now);
    *order = next;
    Ok(())
}

/// Pre-write hook run on every save.
///
/// A completed order without an actual delivery date is delivered `now`.
pub fn before_save(order: &mut PurchaseOrder, now: DateTime<Utc>) {
    if order.status == PoStatus::Completed && order.actual_delivery_date.is_none() {
        order.actual_delivery_date = Some(now);
    }
}
