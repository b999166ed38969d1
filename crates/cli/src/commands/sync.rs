//! Trigger an immediate provider sync.

use auraa_admin::AdminConfig;
use auraa_core::Provider;
use tracing::info;

use super::CommandError;

/// Ask the backend to sync `provider` now. Nothing is polled afterwards.
///
/// # Errors
///
/// Returns the backend's rejection or transport failure.
pub async fn run(config: &AdminConfig, provider: Provider) -> Result<(), CommandError> {
    let client = super::client(config)?;
    client.sync_now(provider).await?;
    info!(%provider, "Sync requested");
    Ok(())
}
