//! Vendor domain models for the VMS procurement system.
//!
//! A vendor carries its profile plus four performance metrics that are derived
//! from its purchase-order history. Clients never write the metrics; they are
//! replaced wholesale by the metrics engine after every purchase-order write.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// A vendor together with its most recently computed performance metrics.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Vendor {
    pub id: Uuid,
    pub vendor_code: String,
    pub name: String,
    pub contact_details: String,
    pub address: String,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub metrics: VendorMetrics,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The four derived statistics.
///
/// Rates are percentages in `0.0..=100.0`, the quality average is on the
/// `0.0..=5.0` rating scale and the response time is expressed in hours.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, FromRow, PartialEq)]
pub struct VendorMetrics {
    pub on_time_delivery_rate: f64,
    pub quality_rating_avg: f64,
    pub average_response_time: f64,
    pub fulfillment_rate: f64,
}

/// Payload for registering a vendor.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewVendor {
    #[validate(custom = "validate_vendor_code")]
    pub vendor_code: String,
    #[validate(length(min = 1, max = 255, message = "Vendor name must be between 1 and 255 characters"))]
    pub name: String,
    #[validate(length(min = 1, message = "Contact details are required"))]
    pub contact_details: String,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
}

/// Partial profile update. Metric fields are intentionally absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct VendorProfileUpdate {
    #[validate(custom = "validate_vendor_code")]
    pub vendor_code: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Vendor name must be between 1 and 255 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "Contact details cannot be empty"))]
    pub contact_details: Option<String>,
    #[validate(length(min = 1, message = "Address cannot be empty"))]
    pub address: Option<String>,
}

impl VendorProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.vendor_code.is_none()
            && self.name.is_none()
            && self.contact_details.is_none()
            && self.address.is_none()
    }
}

impl Vendor {
    /// Creates a vendor with all metrics at zero, as for a vendor without orders.
    pub fn new(payload: NewVendor, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            vendor_code: payload.vendor_code,
            name: payload.name,
            contact_details: payload.contact_details,
            address: payload.address,
            metrics: VendorMetrics::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a profile update in place. Returns `true` if any field changed.
    pub fn apply_profile(&mut self, update: VendorProfileUpdate, now: DateTime<Utc>) -> bool {
        let mut changed = false;
        if let Some(code) = update.vendor_code {
            changed |= self.vendor_code != code;
            self.vendor_code = code;
        }
        if let Some(name) = update.name {
            changed |= self.name != name;
            self.name = name;
        }
        if let Some(contact) = update.contact_details {
            changed |= self.contact_details != contact;
            self.contact_details = contact;
        }
        if let Some(address) = update.address {
            changed |= self.address != address;
            self.address = address;
        }
        if changed {
            self.updated_at = now;
        }
        changed
    }
}

fn code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_\-]{0,49}$").expect("identifier pattern is valid")
    })
}

/// Vendor codes and PO numbers share the same shape: 1-50 characters of
/// letters, digits, `-` or `_`, not starting with a separator.
pub fn is_valid_identifier(value: &str) -> bool {
    code_pattern().is_match(value)
}

pub(crate) fn validate_vendor_code(code: &str) -> Result<(), ValidationError> {
    if is_valid_identifier(code) {
        Ok(())
    } else {
        let mut error = ValidationError::new("vendor_code");
        error.message = Some("Vendor code must be 1-50 letters, digits, '-' or '_'".into());
        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> NewVendor {
        NewVendor {
            vendor_code: "ACME-01".to_string(),
            name: "Acme Industrial".to_string(),
            contact_details: "orders@acme.test".to_string(),
            address: "1 Foundry Way".to_string(),
        }
    }

    #[test]
    fn test_new_vendor_starts_with_zero_metrics() {
        let vendor = Vendor::new(payload(), Utc::now());
        assert_eq!(vendor.metrics, VendorMetrics::default());
        assert_eq!(vendor.created_at, vendor.updated_at);
    }

    #[test]
    fn test_vendor_code_validation() {
        assert!(payload().validate().is_ok());

        let mut bad = payload();
        bad.vendor_code = "-leading".to_string();
        assert!(bad.validate().is_err());

        bad.vendor_code = "has space".to_string();
        assert!(bad.validate().is_err());

        bad.vendor_code = String::new();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_profile_update_reports_changes() {
        let created = Utc::now();
        let mut vendor = Vendor::new(payload(), created);
        let later = created + chrono::Duration::minutes(5);

        let unchanged = vendor.apply_profile(
            VendorProfileUpdate {
                name: Some("Acme Industrial".to_string()),
                ..Default::default()
            },
            later,
        );
        assert!(!unchanged);
        assert_eq!(vendor.updated_at, created);

        let changed = vendor.apply_profile(
            VendorProfileUpdate {
                address: Some("2 Foundry Way".to_string()),
                ..Default::default()
            },
            later,
        );
        assert!(changed);
        assert_eq!(vendor.address, "2 Foundry Way");
        assert_eq!(vendor.updated_at, later);
    }

    #[test]
    fn test_metrics_flatten_into_vendor_json() {
        let vendor = Vendor::new(payload(), Utc::now());
        let json = serde_json::to_value(&vendor).unwrap();
        assert_eq!(json["fulfillment_rate"], 0.0);
        assert_eq!(json["vendor_code"], "ACME-01");
        assert!(json.get("metrics").is_none());
    }
}
