//! Caller identity and ownership checks.
//!
//! Authentication happens above the core; the web layer hands every operation
//! an already resolved [`Caller`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vms_utils::{VmsError, VmsResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", content = "vendor_id", rename_all = "snake_case")]
pub enum Caller {
    /// Procurement staff; may act on every vendor
    Staff,
    /// A vendor's own portal user; scoped to that vendor's records
    Vendor(Uuid),
}

impl Caller {
    pub fn ensure_staff(&self, action: &str) -> VmsResult<()> {
        match self {
            Caller::Staff => Ok(()),
            Caller::Vendor(_) => Err(VmsError::forbidden(format!(
                "only procurement staff may {action}"
            ))),
        }
    }

    /// Staff may access every vendor; a vendor only itself.
    pub fn ensure_owns(&self, vendor_id: Uuid) -> VmsResult<()> {
        match self {
            Caller::Staff => Ok(()),
            Caller::Vendor(own) if *own == vendor_id => Ok(()),
            Caller::Vendor(_) => Err(VmsError::forbidden(
                "record belongs to a different vendor",
            )),
        }
    }

    /// Resolves an optional vendor filter against the caller's scope.
    pub fn scope_filter(&self, requested: Option<Uuid>) -> VmsResult<Option<Uuid>> {
        match (self, requested) {
            (Caller::Staff, requested) => Ok(requested),
            (Caller::Vendor(own), None) => Ok(Some(*own)),
            (Caller::Vendor(_), Some(vendor_id)) => {
                self.ensure_owns(vendor_id)?;
                Ok(Some(vendor_id))
            }
        }
    }
}
