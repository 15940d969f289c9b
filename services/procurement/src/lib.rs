//! VMS Procurement Core
//!
//! Purchase-order lifecycle, vendor administration and the vendor performance
//! metrics derived from order history.
//!
//! ## Modules
//!
//! - **service**: `ProcurementService`, the boundary every caller goes through
//! - **status**: lifecycle transitions and timestamp stamping
//! - **metrics**: the metrics computation and the engine that persists it
//! - **trigger**: post-commit recalculation with per-vendor serialization
//! - **access**: caller identity and ownership checks

pub mod access;
pub mod metrics;
pub mod service;
pub mod status;
pub mod trigger;

pub use access::Caller;
pub use metrics::{compute_metrics, MetricsEngine};
pub use service::{AcknowledgeOutcome, ProcurementService};
pub use status::FieldWarning;
pub use trigger::{RecalculationTrigger, VendorGuard};
