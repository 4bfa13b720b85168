//! Allow-list policy evaluation over a cache snapshot.
//!
//! A subject is allowed `verb` on `resource` in `namespace` when some
//! RoleBinding in that namespace names the subject and references a Role with
//! a rule covering both the verb and the resource. There are no deny rules and
//! no precedence: the first match wins, absence of a match is a plain denial.

use pkg_constants::rbac::WILDCARD;
use pkg_types::api::AuthRequest;
use pkg_types::meta::ObjectKey;
use pkg_types::rbac::{PolicyRule, Role};

use crate::cache::RbacMaps;

/// Decide an authorization request against `maps`.
pub fn authorize(maps: &RbacMaps, req: &AuthRequest) -> bool {
    roles_for_subject(maps, &req.name, &req.namespace)
        .any(|role| role_allows(role, &req.verb, &req.resource))
}

/// Roles bound to `subject` in `namespace`.
///
/// Subjects are matched by name only; `kind` is not compared. Bindings whose
/// role has gone missing contribute nothing.
pub fn roles_for_subject<'a>(
    maps: &'a RbacMaps,
    subject: &'a str,
    namespace: &'a str,
) -> impl Iterator<Item = &'a Role> + 'a {
    maps.role_bindings
        .values()
        .filter(move |rb| rb.metadata.namespace == namespace)
        .filter(move |rb| rb.subjects.iter().any(|s| s.name == subject))
        .filter_map(move |rb| {
            maps.roles
                .get(&ObjectKey::new(namespace, rb.role_ref.name.as_str()))
        })
}

pub fn role_allows(role: &Role, verb: &str, resource: &str) -> bool {
    role.rules.iter().any(|rule| rule_matches(rule, verb, resource))
}

/// `apiGroups` is carried on the rule but not evaluated.
pub fn rule_matches(rule: &PolicyRule, verb: &str, resource: &str) -> bool {
    covers(&rule.verbs, verb) && covers(&rule.resources, resource)
}

fn covers(values: &[String], item: &str) -> bool {
    values.iter().any(|v| v == WILDCARD || v == item)
}
