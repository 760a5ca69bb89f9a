mod enrich;
mod explore;
mod fetch;
mod load;

pub use enrich::cmd_enrich;
pub use explore::cmd_explore;
pub use fetch::{cmd_decompress, cmd_fetch, cmd_prepare};
pub use load::cmd_load;

use crate::config::Config;
use crate::db::Store;
use tracing::warn;

/// Opens the store, runs `f`, and closes the store whether or not `f` failed.
async fn with_store<T, F, Fut>(config: &Config, f: F) -> anyhow::Result<T>
where
    F: FnOnce(Store) -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let store = Store::from_config(&config.store).await?;
    let result = f(store.clone()).await;

    if let Err(e) = store.close().await {
        warn!(error = %e, "Failed to close store");
    }

    result
}
