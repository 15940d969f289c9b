//! Purchase order domain models.
//!
//! A purchase order belongs to exactly one vendor and moves through a small,
//! one-directional lifecycle. Lifecycle enforcement and timestamp stamping live
//! in the procurement service; this module only holds the data and the
//! transition table.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::vendor::is_valid_identifier;

/// Purchase order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoStatus {
    /// Issued, waiting for the vendor
    Pending,
    /// Vendor has acknowledged the order
    Acknowledged,
    /// Goods delivered
    Completed,
    /// Withdrawn before completion
    #[serde(alias = "cancelled")]
    Canceled,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown purchase order status '{0}'")]
pub struct ParseStatusError(pub String);

impl PoStatus {
    pub const ALL: [PoStatus; 4] = [
        PoStatus::Pending,
        PoStatus::Acknowledged,
        PoStatus::Completed,
        PoStatus::Canceled,
    ];

    /// Check if transition is valid. Re-saving the current status is always allowed.
    pub fn can_transition_to(&self, target: PoStatus) -> bool {
        use PoStatus::*;

        if *self == target {
            return true;
        }

        match (self, target) {
            (Pending, Acknowledged) => true,
            (Pending, Completed) => true,
            (Pending, Canceled) => true,

            (Acknowledged, Completed) => true,
            (Acknowledged, Canceled) => true,

            // Terminal states cannot transition
            (Completed, _) => false,
            (Canceled, _) => false,

            _ => false,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PoStatus::Completed | PoStatus::Canceled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Acknowledged => "acknowledged",
            Self::Completed => "completed",
            Self::Canceled => "canceled",
        }
    }
}

impl FromStr for PoStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "acknowledged" => Ok(Self::Acknowledged),
            "completed" => Ok(Self::Completed),
            "canceled" | "cancelled" => Ok(Self::Canceled),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

impl fmt::Display for PoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A purchase order issued to a vendor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PurchaseOrder {
    pub id: Uuid,
    pub po_number: String,
    pub vendor_id: Uuid,
    pub order_date: DateTime<Utc>,
    pub issue_date: DateTime<Utc>,
    pub expected_delivery_date: DateTime<Utc>,
    pub actual_delivery_date: Option<DateTime<Utc>>,
    pub acknowledgment_date: Option<DateTime<Utc>>,
    pub status: PoStatus,
    pub quality_rating: Option<f64>,
    pub quantity: i32,
    pub items: serde_json::Value,
}

impl PurchaseOrder {
    /// Builds a freshly issued order: pending, with order and issue date both `now`.
    pub fn issue(payload: NewPurchaseOrder, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            po_number: payload.po_number,
            vendor_id: payload.vendor_id,
            order_date: now,
            issue_date: now,
            expected_delivery_date: payload.expected_delivery_date,
            actual_delivery_date: None,
            acknowledgment_date: None,
            status: PoStatus::Pending,
            quality_rating: None,
            quantity: payload.quantity,
            items: payload.items,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == PoStatus::Completed
    }

    /// Delivered on or before the expected date. Orders without an actual
    /// delivery date are never on time.
    pub fn delivered_on_time(&self) -> bool {
        self.actual_delivery_date
            .map(|delivered| delivered <= self.expected_delivery_date)
            .unwrap_or(false)
    }

    /// Hours between issue and acknowledgment, or `None` when the order is
    /// unacknowledged or the acknowledgment precedes the issue date.
    pub fn response_time_hours(&self) -> Option<f64> {
        let acknowledged = self.acknowledgment_date?;
        if acknowledged < self.issue_date {
            return None;
        }
        let elapsed = acknowledged - self.issue_date;
        Some(elapsed.num_milliseconds() as f64 / 3_600_000.0)
    }
}

/// Payload for issuing a purchase order.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewPurchaseOrder {
    #[validate(custom = "validate_po_number")]
    pub po_number: String,
    pub vendor_id: Uuid,
    pub expected_delivery_date: DateTime<Utc>,
    #[validate(range(min = 1, message = "Quantity must be a positive integer"))]
    pub quantity: i32,
    #[serde(default = "empty_items")]
    pub items: serde_json::Value,
}

/// Arbitrary field subset for a generic purchase order update.
///
/// `acknowledgment_date` is not part of the payload: it can only be set by
/// acknowledging the order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct PurchaseOrderUpdate {
    pub vendor_id: Option<Uuid>,
    pub expected_delivery_date: Option<DateTime<Utc>>,
    pub actual_delivery_date: Option<DateTime<Utc>>,
    pub status: Option<PoStatus>,
    #[validate(
        custom = "validate_quality_rating",
        range(min = 0.0, max = 5.0, message = "Quality rating must be between 0 and 5")
    )]
    pub quality_rating: Option<f64>,
    #[validate(range(min = 1, message = "Quantity must be a positive integer"))]
    pub quantity: Option<i32>,
    pub items: Option<serde_json::Value>,
}

/// Optional payload accompanying an acknowledgment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AcknowledgePurchaseOrder {
    pub expected_delivery_date: Option<DateTime<Utc>>,
}

fn empty_items() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

fn validate_po_number(po_number: &str) -> Result<(), ValidationError> {
    if is_valid_identifier(po_number) {
        Ok(())
    } else {
        let mut error = ValidationError::new("po_number");
        error.message = Some("PO number must be 1-50 letters, digits, '-' or '_'".into());
        Err(error)
    }
}

fn validate_quality_rating(rating: f64) -> Result<(), ValidationError> {
    if rating.is_finite() {
        Ok(())
    } else {
        let mut error = ValidationError::new("quality_rating");
        error.message = Some("Quality rating must be a finite number".into());
        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_update_rejects_non_finite_rating() {
        for rating in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let update = PurchaseOrderUpdate {
                quality_rating: Some(rating),
                ..Default::default()
            };
            assert!(update.validate().is_err(), "{rating} accepted");
        }

        let update = PurchaseOrderUpdate {
            quality_rating: Some(4.5),
            ..Default::default()
        };
        assert!(update.validate().is_ok());
    }

    fn order(now: DateTime<Utc>) -> PurchaseOrder {
        PurchaseOrder::issue(
            NewPurchaseOrder {
                po_number: "PO-1001".to_string(),
                vendor_id: Uuid::new_v4(),
                expected_delivery_date: now + Duration::days(7),
                quantity: 10,
                items: serde_json::json!({"sku": "BOLT-M8"}),
            },
            now,
        )
    }

    #[test]
    fn test_issue_sets_initial_state() {
        let now = Utc::now();
        let po = order(now);
        assert_eq!(po.status, PoStatus::Pending);
        assert_eq!(po.order_date, now);
        assert_eq!(po.issue_date, now);
        assert!(po.acknowledgment_date.is_none());
        assert!(po.actual_delivery_date.is_none());
    }

    #[test]
    fn test_status_transitions() {
        assert!(PoStatus::Pending.can_transition_to(PoStatus::Acknowledged));
        assert!(PoStatus::Pending.can_transition_to(PoStatus::Completed));
        assert!(PoStatus::Acknowledged.can_transition_to(PoStatus::Completed));
        assert!(PoStatus::Acknowledged.can_transition_to(PoStatus::Acknowledged));
        assert!(!PoStatus::Acknowledged.can_transition_to(PoStatus::Pending));
        assert!(!PoStatus::Completed.can_transition_to(PoStatus::Pending));
        assert!(!PoStatus::Canceled.can_transition_to(PoStatus::Completed));
        assert!(PoStatus::Completed.is_terminal());
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("Completed".parse::<PoStatus>(), Ok(PoStatus::Completed));
        assert_eq!("cancelled".parse::<PoStatus>(), Ok(PoStatus::Canceled));
        assert!("shipped".parse::<PoStatus>().is_err());

        let json: PoStatus = serde_json::from_str("\"acknowledged\"").unwrap();
        assert_eq!(json, PoStatus::Acknowledged);
        assert_eq!(serde_json::to_string(&PoStatus::Canceled).unwrap(), "\"canceled\"");
    }

    #[test]
    fn test_response_time_excludes_negative_intervals() {
        let now = Utc::now();
        let mut po = order(now);
        assert_eq!(po.response_time_hours(), None);

        po.acknowledgment_date = Some(now - Duration::hours(1));
        assert_eq!(po.response_time_hours(), None);

        po.acknowledgment_date = Some(now + Duration::minutes(90));
        assert_eq!(po.response_time_hours(), Some(1.5));
    }

    #[test]
    fn test_on_time_requires_delivery_date() {
        let now = Utc::now();
        let mut po = order(now);
        assert!(!po.delivered_on_time());

        po.actual_delivery_date = Some(po.expected_delivery_date);
        assert!(po.delivered_on_time());

        po.actual_delivery_date = Some(po.expected_delivery_date + Duration::seconds(1));
        assert!(!po.delivered_on_time());
    }

    #[test]
    fn test_payload_validation() {
        let now = Utc::now();
        let payload = NewPurchaseOrder {
            po_number: "PO 1".to_string(),
            vendor_id: Uuid::new_v4(),
            expected_delivery_date: now,
            quantity: 0,
            items: empty_items(),
        };
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("po_number"));
        assert!(fields.contains_key("quantity"));

        let update = PurchaseOrderUpdate {
            quality_rating: Some(5.5),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }
}
