use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error};

use pkg_constants::state::{HEALTH_CHECK_KEY, HEALTH_CHECK_TIMEOUT_SECS};

/// Linearizable key-value store the RBAC cache persists through.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Store a value under the given key.
    async fn put(&self, key: &str, value: &[u8]) -> anyhow::Result<()>;

    /// Retrieve the value for a key, or `None` if it does not exist.
    async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>>;

    /// List all key-value pairs whose keys start with `prefix`, in key order.
    async fn list_prefix(&self, prefix: &str) -> anyhow::Result<Vec<(String, Vec<u8>)>>;
}

/// Serialize `value` to JSON and write it under `key`.
pub async fn put_json<T: Serialize + Sync>(
    store: &dyn KvStore,
    key: &str,
    value: &T,
) -> anyhow::Result<()> {
    let data = serde_json::to_vec(value)
        .map_err(|e| anyhow::anyhow!("Failed to serialize {}: {}", key, e))?;
    store.put(key, &data).await
}

/// Range-scan every entry under `prefix` and hand it to `visit`.
/// The first visitor error stops the load and is returned.
pub async fn load_all<F>(store: &dyn KvStore, prefix: &str, mut visit: F) -> anyhow::Result<()>
where
    F: FnMut(&str, &[u8]) -> anyhow::Result<()>,
{
    let entries = store.list_prefix(prefix).await?;
    debug!("Loading {} entries under {}", entries.len(), prefix);
    for (key, value) in &entries {
        if let Err(e) = visit(key, value) {
            error!("Failed to process {}: {}", key, e);
            return Err(e);
        }
    }
    Ok(())
}

/// Liveness probe: one read against the store, bounded by a short timeout.
pub async fn probe(store: &dyn KvStore) -> anyhow::Result<()> {
    let timeout = Duration::from_secs(HEALTH_CHECK_TIMEOUT_SECS);
    match tokio::time::timeout(timeout, store.get(HEALTH_CHECK_KEY)).await {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(e)) => Err(e),
        Err(_) => Err(anyhow::anyhow!(
            "state store did not answer within {}s",
            HEALTH_CHECK_TIMEOUT_SECS
        )),
    }
}
