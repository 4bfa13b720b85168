use async_trait::async_trait;
use slatedb::Db;
use slatedb::object_store::ObjectStore;
use slatedb::object_store::local::LocalFileSystem;
use slatedb::object_store::memory::InMemory;
use slatedb::object_store::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::store::KvStore;

/// Persistent state store backed by SlateDB.
/// Resources are kept as JSON values under `/rbac/v1/...` keys.
#[derive(Clone)]
pub struct StateStore {
    db: Db,
}

impl StateStore {
    /// Open (or create) a state store rooted at `path` on the local filesystem.
    pub async fn new(path: &str) -> anyhow::Result<Self> {
        info!("Opening SlateDB state store at {}", path);

        std::fs::create_dir_all(path)
            .map_err(|e| anyhow::anyhow!("Failed to create data directory {}: {}", path, e))?;

        let object_store = Arc::new(
            LocalFileSystem::new_with_prefix(path)
                .map_err(|e| anyhow::anyhow!("Failed to create local object store: {}", e))?,
        );
        Self::open(object_store).await
    }

    /// Open a store whose data lives only in process memory.
    /// Contents are lost on drop; used by tests and `--ephemeral` runs.
    pub async fn in_memory() -> anyhow::Result<Self> {
        debug!("Opening in-memory SlateDB state store");
        Self::open(Arc::new(InMemory::new())).await
    }

    async fn open(object_store: Arc<dyn ObjectStore>) -> anyhow::Result<Self> {
        let db = Db::open(Path::from("/"), object_store)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to open SlateDB: {}", e))?;
        Ok(Self { db })
    }

    /// Gracefully close the state store.
    pub async fn close(self) -> anyhow::Result<()> {
        info!("Closing SlateDB state store");
        self.db
            .close()
            .await
            .map_err(|e| anyhow::anyhow!("SlateDB close failed: {}", e))
    }
}

#[async_trait]
impl KvStore for StateStore {
    async fn put(&self, key: &str, value: &[u8]) -> anyhow::Result<()> {
        self.db
            .put(key.as_bytes(), value)
            .await
            .map(|_| ())
            .map_err(|e| anyhow::anyhow!("SlateDB put {} failed: {}", key, e))
    }

    async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        match self.db.get(key.as_bytes()).await {
            Ok(Some(bytes)) => Ok(Some(bytes.to_vec())),
            Ok(None) => Ok(None),
            Err(e) => Err(anyhow::anyhow!("SlateDB get {} failed: {}", key, e)),
        }
    }

    async fn list_prefix(&self, prefix: &str) -> anyhow::Result<Vec<(String, Vec<u8>)>> {
        let mut results = Vec::new();
        let mut iter = self
            .db
            .scan_prefix(prefix.as_bytes())
            .await
            .map_err(|e| anyhow::anyhow!("SlateDB scan_prefix failed: {}", e))?;

        // A failed step surfaces instead of truncating the listing.
        while let Some(kv) = iter
            .next()
            .await
            .map_err(|e| anyhow::anyhow!("SlateDB scan {} failed: {}", prefix, e))?
        {
            let key = String::from_utf8_lossy(&kv.key).to_string();
            results.push((key, kv.value.to_vec()));
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let store = StateStore::in_memory().await.unwrap();
        store.put("/rbac/v1/role/default/admin", b"{}").await.unwrap();

        let got = store.get("/rbac/v1/role/default/admin").await.unwrap();
        assert_eq!(got.as_deref(), Some(&b"{}"[..]));
        assert!(store.get("/rbac/v1/role/default/missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_prefix_is_scoped() {
        let store = StateStore::in_memory().await.unwrap();
        store.put("/rbac/v1/role/default/admin", b"1").await.unwrap();
        store.put("/rbac/v1/role/team-a/view", b"2").await.unwrap();
        store
            .put("/rbac/v1/rolebindings/default/admin-binding", b"3")
            .await
            .unwrap();

        let roles = store.list_prefix("/rbac/v1/role/").await.unwrap();
        let keys: Vec<&str> = roles.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            vec!["/rbac/v1/role/default/admin", "/rbac/v1/role/team-a/view"]
        );
    }
}
