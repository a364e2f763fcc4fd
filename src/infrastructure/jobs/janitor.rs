//! Auth Code Janitor
//!
//! Background sweep removing redeemed and expired Telegram login codes.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::domain::AuthCodeRepository;
use crate::infrastructure::metrics;
use crate::shared::error::AppError;

/// Periodically delete used and expired auth codes.
///
/// Errors are logged and the loop keeps going.
pub async fn run_janitor<C>(codes: Arc<C>, interval_secs: u64)
where
    C: AuthCodeRepository + ?Sized,
{
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    info!(interval_secs, "Auth code janitor started");

    loop {
        interval.tick().await;

        if let Err(e) = sweep(codes.as_ref()).await {
            warn!("Janitor error: {}", e);
        }
    }
}

/// One janitor pass. Returns the number of rows removed.
pub async fn sweep<C>(codes: &C) -> Result<u64, AppError>
where
    C: AuthCodeRepository + ?Sized,
{
    let purged = codes.purge_stale().await?;
    metrics::record_codes_purged(purged);
    if purged > 0 {
        info!(purged, "Janitor: removed stale auth codes");
    } else {
        debug!("Janitor: nothing to remove");
    }
    Ok(purged)
}
