//! Built-in roles created on first start.

use tracing::{debug, info};

use pkg_constants::rbac::{API_VERSION, DEFAULT_NAMESPACE, KIND_ROLE, KIND_ROLE_BINDING};
use pkg_types::meta::{ObjectMeta, TypeMeta};
use pkg_types::rbac::{PolicyRule, Role, RoleBinding, RoleRef, Subject};

use crate::cache::RbacSystem;
use crate::error::{RbacError, RbacResult};

/// `(role, verbs, resources)` for each built-in role.
const DEFAULT_ROLES: &[(&str, &[&str], &[&str])] = &[
    // everything, everywhere
    ("admin", &["*"], &["*"]),
    // read-only
    ("view", &["get"], &["*"]),
    // manage URLs and users, but not RBAC resources
    ("edit", &["get", "create", "delete", "list"], &["urls", "users"]),
    ("user", &["get", "list"], &["urls"]),
];

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn meta(name: &str) -> ObjectMeta {
    ObjectMeta {
        name: name.to_string(),
        namespace: DEFAULT_NAMESPACE.to_string(),
        ..Default::default()
    }
}

pub fn default_roles() -> Vec<Role> {
    DEFAULT_ROLES
        .iter()
        .map(|(name, verbs, resources)| Role {
            type_meta: TypeMeta {
                api_version: API_VERSION.to_string(),
                kind: KIND_ROLE.to_string(),
            },
            metadata: meta(name),
            rules: vec![PolicyRule {
                api_groups: vec![String::new()],
                verbs: strings(verbs),
                resources: strings(resources),
            }],
        })
        .collect()
}

/// One `<role>-binding` per built-in role, granting it to the user of the same name.
pub fn default_role_bindings() -> Vec<RoleBinding> {
    DEFAULT_ROLES
        .iter()
        .map(|(name, _, _)| RoleBinding {
            type_meta: TypeMeta {
                api_version: API_VERSION.to_string(),
                kind: KIND_ROLE_BINDING.to_string(),
            },
            metadata: meta(&format!("{}-binding", name)),
            role_ref: RoleRef {
                api_group: API_VERSION.to_string(),
                kind: KIND_ROLE.to_string(),
                name: name.to_string(),
            },
            subjects: vec![Subject {
                kind: "User".to_string(),
                name: name.to_string(),
                namespace: String::new(),
            }],
        })
        .collect()
}

/// Create the built-in roles and bindings that are not present yet.
/// Existing entries are left untouched. Returns how many were created.
pub async fn seed_defaults(rbac: &RbacSystem) -> RbacResult<usize> {
    let mut created = 0;

    for role in default_roles() {
        let name = role.metadata.name.clone();
        match rbac.create_role(role).await {
            Ok(_) => created += 1,
            Err(RbacError::Conflict { .. }) => debug!("Role {} already present", name),
            Err(e) => return Err(e),
        }
    }

    for rb in default_role_bindings() {
        let name = rb.metadata.name.clone();
        match rbac.create_role_binding(rb).await {
            Ok(_) => created += 1,
            Err(RbacError::Conflict { .. }) => debug!("RoleBinding {} already present", name),
            Err(e) => return Err(e),
        }
    }

    if created > 0 {
        info!("Seeded {} default RBAC resources", created);
    }
    Ok(created)
}
