//! Property-based tests for the domain models.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use uuid::Uuid;

use crate::{NewPurchaseOrder, PoStatus, PurchaseOrder};

prop_compose! {
    fn arb_datetime()(timestamp in 0i64..2_000_000_000i64) -> DateTime<Utc> {
        Utc.timestamp_opt(timestamp, 0).unwrap()
    }
}

fn arb_status() -> impl Strategy<Value = PoStatus> {
    prop_oneof![
        Just(PoStatus::Pending),
        Just(PoStatus::Acknowledged),
        Just(PoStatus::Completed),
        Just(PoStatus::Canceled),
    ]
}

proptest! {
    /// Status text survives Display -> FromStr.
    #[test]
    fn prop_status_display_parses_back(status in arb_status()) {
        prop_assert_eq!(status.to_string().parse::<PoStatus>(), Ok(status));
    }

    /// No transition leaves a terminal state except a same-status save.
    #[test]
    fn prop_terminal_states_do_not_regress(from in arb_status(), to in arb_status()) {
        if from.is_terminal() && from != to {
            prop_assert!(!from.can_transition_to(to));
        }
        prop_assert!(!(from != PoStatus::Pending && to == PoStatus::Pending && from.can_transition_to(to)));
    }

    /// Response time is never negative and only present for acknowledged orders.
    #[test]
    fn prop_response_time_non_negative(
        issued in arb_datetime(),
        offset_minutes in -10_000i64..10_000i64,
        acknowledged in any::<bool>(),
    ) {
        let mut po = PurchaseOrder::issue(
            NewPurchaseOrder {
                po_number: "PO-PROP".to_string(),
                vendor_id: Uuid::new_v4(),
                expected_delivery_date: issued + Duration::days(3),
                quantity: 1,
                items: serde_json::json!({}),
            },
            issued,
        );
        if acknowledged {
            po.acknowledgment_date = Some(issued + Duration::minutes(offset_minutes));
        }

        match po.response_time_hours() {
            Some(hours) => {
                prop_assert!(acknowledged && offset_minutes >= 0);
                prop_assert!(hours >= 0.0);
            }
            None => prop_assert!(!acknowledged || offset_minutes < 0),
        }
    }
}
