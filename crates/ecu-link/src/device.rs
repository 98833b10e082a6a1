//! Waiting for serial devices to appear
//!
//! USB serial adapters and UARTs may show up some time after boot.

use std::path::Path;
use std::time::Duration;

use tracing::info;

/// Poll until `path` exists
///
/// Returns the number of polls that found the path missing.
pub async fn wait_for_path(path: impl AsRef<Path>, poll_interval: Duration) -> u32 {
    let path = path.as_ref();
    let mut misses = 0;

    while !tokio::fs::try_exists(path).await.unwrap_or(false) {
        info!("Waiting for {} to appear...", path.display());
        misses += 1;
        tokio::time::sleep(poll_interval).await;
    }

    misses
}
