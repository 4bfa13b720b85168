use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use pkg_constants::state::{ROLE_BINDING_PREFIX, ROLE_PREFIX};
use pkg_state::store::{self, KvStore};
use pkg_types::api::AuthRequest;
use pkg_types::meta::{Object, ObjectKey};
use pkg_types::rbac::{Role, RoleBinding};

use crate::engine;
use crate::error::{RbacError, RbacResult};

/// In-memory mirror of every Role and RoleBinding, keyed by `(namespace, name)`.
#[derive(Debug, Clone, Default)]
pub struct RbacMaps {
    pub roles: HashMap<ObjectKey, Role>,
    pub role_bindings: HashMap<ObjectKey, RoleBinding>,
}

/// Authorization cache bound to its durable store.
///
/// Both maps sit behind one reader/writer lock. Writers hold the write lock
/// across the store round trip, so every write (even to unrelated namespaces)
/// is serialized; readers only ever wait on a writer.
pub struct RbacSystem {
    store: Arc<dyn KvStore>,
    maps: RwLock<RbacMaps>,
}

impl RbacSystem {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            store,
            maps: RwLock::new(RbacMaps::default()),
        }
    }

    /// Rebuild the cache from the store. Any undecodable record aborts the load.
    pub async fn load_initial_data(&self) -> RbacResult<()> {
        let mut maps = self.maps.write().await;
        debug!("Loading RBAC resources from the state store");

        load_prefix(self.store.as_ref(), ROLE_PREFIX, &mut maps.roles).await?;
        load_prefix(self.store.as_ref(), ROLE_BINDING_PREFIX, &mut maps.role_bindings).await?;

        info!(
            "Loaded {} roles and {} role bindings",
            maps.roles.len(),
            maps.role_bindings.len()
        );
        Ok(())
    }

    /// Create a Role. Stamps `uid` and `creationTimestamp`, persists, then caches.
    pub async fn create_role(&self, mut role: Role) -> RbacResult<Role> {
        role.stamp_creation();
        let key = role.key();

        let mut maps = self.maps.write().await;
        if maps.roles.contains_key(&key) {
            return Err(RbacError::Conflict {
                kind: Role::KIND,
                key,
            });
        }

        self.persist(&key.storage_key(ROLE_PREFIX), &role).await?;
        maps.roles.insert(key.clone(), role.clone());
        info!("Created role {}", key);
        Ok(role)
    }

    /// Create a RoleBinding. Its role must already exist in the same namespace.
    pub async fn create_role_binding(&self, mut rb: RoleBinding) -> RbacResult<RoleBinding> {
        rb.stamp_creation();
        let key = rb.key();

        let mut maps = self.maps.write().await;
        if maps.role_bindings.contains_key(&key) {
            return Err(RbacError::Conflict {
                kind: RoleBinding::KIND,
                key,
            });
        }

        let role_key = ObjectKey::new(&key.namespace, &rb.role_ref.name);
        if !maps.roles.contains_key(&role_key) {
            return Err(RbacError::RoleNotFound { key: role_key });
        }

        self.persist(&key.storage_key(ROLE_BINDING_PREFIX), &rb).await?;
        maps.role_bindings.insert(key.clone(), rb.clone());
        info!("Created role binding {} -> role {}", key, role_key.name);
        Ok(rb)
    }

    /// Snapshot of all Roles, optionally restricted to one namespace, sorted by key.
    pub async fn list_roles(&self, namespace: Option<&str>) -> Vec<Role> {
        let maps = self.maps.read().await;
        snapshot(&maps.roles, namespace)
    }

    /// Snapshot of all RoleBindings, optionally restricted to one namespace, sorted by key.
    pub async fn list_role_bindings(&self, namespace: Option<&str>) -> Vec<RoleBinding> {
        let maps = self.maps.read().await;
        snapshot(&maps.role_bindings, namespace)
    }

    /// Answer an authorization query from memory. Denial is a normal `false`.
    pub async fn authorize(&self, req: &AuthRequest) -> bool {
        let maps = self.maps.read().await;
        let allowed = engine::authorize(&maps, req);
        debug!(
            "Authorization {}: subject={} verb={} resource={} namespace={}",
            if allowed { "allowed" } else { "denied" },
            req.name,
            req.verb,
            req.resource,
            req.namespace
        );
        allowed
    }

    /// Liveness of the backing store.
    pub async fn health(&self) -> anyhow::Result<()> {
        store::probe(self.store.as_ref()).await
    }

    async fn persist<T: Object + serde::Serialize + Sync>(
        &self,
        storage_key: &str,
        obj: &T,
    ) -> RbacResult<()> {
        store::put_json(self.store.as_ref(), storage_key, obj)
            .await
            .map_err(|source| {
                warn!("Failed to persist {} {}: {}", T::KIND, storage_key, source);
                RbacError::Persistence {
                    key: storage_key.to_string(),
                    source,
                }
            })
    }
}

async fn load_prefix<T>(
    kv: &dyn KvStore,
    prefix: &str,
    into: &mut HashMap<ObjectKey, T>,
) -> RbacResult<()>
where
    T: Object + serde::de::DeserializeOwned,
{
    store::load_all(kv, prefix, |key, value| {
        let obj: T = serde_json::from_slice(value).map_err(|source| RbacError::Corrupt {
            key: key.to_string(),
            source,
        })?;
        into.insert(obj.key(), obj);
        Ok(())
    })
    .await
    .map_err(|e| match e.downcast::<RbacError>() {
        Ok(rbac_err) => rbac_err,
        Err(source) => RbacError::Load {
            prefix: prefix.to_string(),
            source,
        },
    })
}

fn snapshot<T: Object + Clone>(map: &HashMap<ObjectKey, T>, namespace: Option<&str>) -> Vec<T> {
    let mut items: Vec<(&ObjectKey, &T)> = map
        .iter()
        .filter(|(key, _)| namespace.is_none_or(|ns| key.namespace == ns))
        .collect();
    items.sort_by(|a, b| a.0.cmp(b.0));
    items.into_iter().map(|(_, v)| v.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pkg_state::client::StateStore;
    use pkg_types::meta::{ObjectMeta, TypeMeta};
    use pkg_types::rbac::{PolicyRule, RoleRef, Subject};

    struct FailingStore;

    #[async_trait]
    impl KvStore for FailingStore {
        async fn put(&self, key: &str, _value: &[u8]) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("store unavailable while writing {}", key))
        }
        async fn get(&self, _key: &str) -> anyhow::Result<Option<Vec<u8>>> {
            Err(anyhow::anyhow!("store unavailable"))
        }
        async fn list_prefix(&self, _prefix: &str) -> anyhow::Result<Vec<(String, Vec<u8>)>> {
            Ok(Vec::new())
        }
    }

    fn role(namespace: &str, name: &str) -> Role {
        Role {
            type_meta: TypeMeta {
                api_version: "rbac/v1".to_string(),
                kind: "Role".to_string(),
            },
            metadata: ObjectMeta {
                name: name.to_string(),
                namespace: namespace.to_string(),
                ..Default::default()
            },
            rules: vec![PolicyRule {
                api_groups: vec![],
                verbs: vec!["get".to_string()],
                resources: vec!["*".to_string()],
            }],
        }
    }

    fn binding(namespace: &str, name: &str, role: &str, subject: &str) -> RoleBinding {
        RoleBinding {
            type_meta: TypeMeta {
                api_version: "rbac/v1".to_string(),
                kind: "RoleBinding".to_string(),
            },
            metadata: ObjectMeta {
                name: name.to_string(),
                namespace: namespace.to_string(),
                ..Default::default()
            },
            role_ref: RoleRef {
                api_group: "rbac/v1".to_string(),
                kind: "Role".to_string(),
                name: role.to_string(),
            },
            subjects: vec![Subject {
                kind: "User".to_string(),
                name: subject.to_string(),
                namespace: String::new(),
            }],
        }
    }

    async fn system() -> (RbacSystem, StateStore) {
        let store = StateStore::in_memory().await.unwrap();
        (RbacSystem::new(Arc::new(store.clone())), store)
    }

    #[tokio::test]
    async fn test_create_role_twice_conflicts() {
        let (rbac, _) = system().await;
        let created = rbac.create_role(role("default", "view")).await.unwrap();
        assert!(!created.metadata.uid.is_empty());
        assert!(created.metadata.creation_timestamp.is_some());

        let err = rbac.create_role(role("default", "view")).await.unwrap_err();
        assert!(matches!(err, RbacError::Conflict { kind: "Role", .. }));

        let stored = rbac.list_roles(Some("default")).await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].metadata.uid, created.metadata.uid);
    }

    #[tokio::test]
    async fn test_same_name_in_other_namespace_is_distinct() {
        let (rbac, _) = system().await;
        rbac.create_role(role("default", "view")).await.unwrap();
        rbac.create_role(role("team-a", "view")).await.unwrap();
        assert_eq!(rbac.list_roles(None).await.len(), 2);
        assert_eq!(rbac.list_roles(Some("team-a")).await.len(), 1);
    }

    #[tokio::test]
    async fn test_role_binding_requires_existing_role() {
        let (rbac, store) = system().await;
        let err = rbac
            .create_role_binding(binding("default", "view-binding", "view", "bob"))
            .await
            .unwrap_err();
        assert!(matches!(err, RbacError::RoleNotFound { .. }));
        assert!(rbac.list_role_bindings(None).await.is_empty());
        assert!(
            store
                .list_prefix(ROLE_BINDING_PREFIX)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_role_in_other_namespace_does_not_resolve() {
        let (rbac, _) = system().await;
        rbac.create_role(role("team-a", "view")).await.unwrap();
        let err = rbac
            .create_role_binding(binding("default", "view-binding", "view", "bob"))
            .await
            .unwrap_err();
        assert!(matches!(err, RbacError::RoleNotFound { .. }));
    }

    #[tokio::test]
    async fn test_role_binding_twice_keeps_single_entry() {
        let (rbac, _) = system().await;
        rbac.create_role(role("default", "view")).await.unwrap();
        rbac.create_role_binding(binding("default", "view-binding", "view", "bob"))
            .await
            .unwrap();

        let err = rbac
            .create_role_binding(binding("default", "view-binding", "view", "carol"))
            .await
            .unwrap_err();
        assert!(matches!(err, RbacError::Conflict { kind: "RoleBinding", .. }));

        let bindings = rbac.list_role_bindings(None).await;
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].subjects[0].name, "bob");
    }

    #[tokio::test]
    async fn test_persist_failure_leaves_cache_untouched() {
        let rbac = RbacSystem::new(Arc::new(FailingStore));
        let err = rbac.create_role(role("default", "view")).await.unwrap_err();
        assert!(matches!(err, RbacError::Persistence { .. }));
        assert!(rbac.list_roles(None).await.is_empty());
    }

    #[tokio::test]
    async fn test_writes_are_persisted_under_namespaced_keys() {
        let (rbac, store) = system().await;
        rbac.create_role(role("default", "view")).await.unwrap();
        rbac.create_role_binding(binding("default", "view-binding", "view", "bob"))
            .await
            .unwrap();

        assert!(store.get("/rbac/v1/role/default/view").await.unwrap().is_some());
        assert!(
            store
                .get("/rbac/v1/rolebindings/default/view-binding")
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_restart_recovers_state_from_store() {
        let (rbac, store) = system().await;
        let created = rbac.create_role(role("default", "view")).await.unwrap();
        rbac.create_role_binding(binding("default", "view-binding", "view", "bob"))
            .await
            .unwrap();
        drop(rbac);

        let restarted = RbacSystem::new(Arc::new(store.clone()));
        restarted.load_initial_data().await.unwrap();

        let roles = restarted.list_roles(None).await;
        assert_eq!(roles, vec![created]);
        assert_eq!(restarted.list_role_bindings(None).await.len(), 1);
        assert!(
            restarted
                .authorize(&AuthRequest {
                    name: "bob".to_string(),
                    verb: "get".to_string(),
                    resource: "urls".to_string(),
                    namespace: "default".to_string(),
                })
                .await
        );
    }

    #[tokio::test]
    async fn test_corrupt_record_aborts_load() {
        let store = StateStore::in_memory().await.unwrap();
        store
            .put("/rbac/v1/role/default/broken", b"{not json")
            .await
            .unwrap();

        let rbac = RbacSystem::new(Arc::new(store));
        let err = rbac.load_initial_data().await.unwrap_err();
        match err {
            RbacError::Corrupt { key, .. } => assert_eq!(key, "/rbac/v1/role/default/broken"),
            other => panic!("expected Corrupt, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list_is_sorted_snapshot() {
        let (rbac, _) = system().await;
        rbac.create_role(role("default", "view")).await.unwrap();
        rbac.create_role(role("default", "admin")).await.unwrap();

        let names: Vec<String> = rbac
            .list_roles(None)
            .await
            .into_iter()
            .map(|r| r.metadata.name)
            .collect();
        assert_eq!(names, vec!["admin", "view"]);
    }

    #[tokio::test]
    async fn test_concurrent_creates_of_same_role_admit_one() {
        let (rbac, _) = system().await;
        let rbac = Arc::new(rbac);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let rbac = rbac.clone();
            handles.push(tokio::spawn(async move {
                rbac.create_role(role("default", "view")).await.is_ok()
            }));
        }

        let mut successes = 0;
        for h in handles {
            if h.await.unwrap() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);
        assert_eq!(rbac.list_roles(None).await.len(), 1);
    }
}
