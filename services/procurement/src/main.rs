//! VMS Performance Snapshot Job
//!
//! Recalculates every vendor's metrics from its order history and records a
//! dated performance snapshot for each. Meant to be run on a schedule.

use anyhow::{Context, Result};
use tracing::{error, info};

use vms_database::initialize_store;
use vms_procurement::{Caller, ProcurementService};
use vms_utils::{init_logging, AppConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    init_logging(&config.logging)?;
    info!("Starting VMS performance snapshot job");

    let store = initialize_store(&config.database)
        .await
        .context("Failed to initialize PostgreSQL store")?;
    info!("Database connection established");

    let service = ProcurementService::new(store);
    let vendors = service.list_vendors(Caller::Staff).await?;

    let mut failed = 0usize;
    for vendor in &vendors {
        let result = async {
            service.recalculate_vendor_metrics(Caller::Staff, vendor.id).await?;
            service.record_performance_snapshot(Caller::Staff, vendor.id).await
        }
        .await;

        if let Err(e) = result {
            failed += 1;
            error!(vendor_code = %vendor.vendor_code, error = %e, "Snapshot failed");
        }
    }

    info!(vendors = vendors.len(), failed, "Performance snapshot job finished");
    if failed > 0 {
        anyhow::bail!("{failed} of {} vendor snapshots failed", vendors.len());
    }
    Ok(())
}
