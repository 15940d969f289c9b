//! # VMS Core Domain Models
//!
//! Domain types for the vendor management system: vendors, the purchase
//! orders issued to them, and point-in-time performance snapshots.
//!
//! ## Key Models
//!
//! - **Vendor**: profile plus the four derived performance metrics
//! - **PurchaseOrder**: an order issued to one vendor, with its lifecycle status
//! - **HistoricalPerformance**: a dated copy of a vendor's metrics
//!
//! Request payloads (`NewVendor`, `NewPurchaseOrder`, `PurchaseOrderUpdate`, ...)
//! derive `validator::Validate`; the procurement service validates them before
//! anything is persisted.

pub mod vendor;
pub mod purchase_order;
pub mod performance;

#[cfg(test)]
mod property_tests;

pub use vendor::*;
pub use purchase_order::*;
pub use performance::*;
