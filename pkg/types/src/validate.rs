use anyhow::{Result, bail};

use crate::api::AuthRequest;
use crate::meta::Object;
use crate::rbac::RoleBinding;

/// Validate a DNS-label style identifier used for resource names and namespaces.
/// Rules: lowercase `[a-z0-9-]`, max 63 chars, no leading/trailing hyphens.
pub fn validate_name(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        bail!("{} must not be empty", field);
    }
    if value.len() > 63 {
        bail!("{} '{}' exceeds 63 characters (got {})", field, value, value.len());
    }
    if value.starts_with('-') || value.ends_with('-') {
        bail!("{} '{}' must not start or end with a hyphen", field, value);
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        bail!(
            "{} '{}' must contain only lowercase letters, digits, and hyphens [a-z0-9-]",
            field,
            value
        );
    }
    Ok(())
}

/// Structural checks the server applies to a resource before it reaches the cache.
/// Expects defaults to have been applied already.
pub fn validate_object<T: Object>(obj: &T) -> Result<()> {
    if obj.kind() != T::KIND {
        bail!("kind must be '{}', got '{}'", T::KIND, obj.kind());
    }
    validate_name("metadata.name", obj.name())?;
    validate_name("metadata.namespace", obj.namespace())?;
    Ok(())
}

/// Role bindings additionally need a role reference and named subjects.
pub fn validate_role_binding(rb: &RoleBinding) -> Result<()> {
    validate_object(rb)?;
    validate_name("roleRef.name", &rb.role_ref.name)?;
    if rb.subjects.iter().any(|s| s.name.is_empty()) {
        bail!("subjects[].name must not be empty");
    }
    Ok(())
}

/// Every field of an authorization query is required.
pub fn validate_auth_request(req: &AuthRequest) -> Result<()> {
    for (field, value) in [
        ("name", &req.name),
        ("verb", &req.verb),
        ("resource", &req.resource),
        ("namespace", &req.namespace),
    ] {
        if value.is_empty() {
            bail!("{} is required", field);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rbac::{Role, RoleRef, Subject};

    fn role(name: &str, namespace: &str) -> Role {
        let mut role = Role::default();
        role.type_meta.kind = "Role".to_string();
        role.metadata.name = name.to_string();
        role.metadata.namespace = namespace.to_string();
        role
    }

    #[test]
    fn valid_names() {
        assert!(validate_name("name", "admin").is_ok());
        assert!(validate_name("name", "admin-binding").is_ok());
        assert!(validate_name("name", "team-42").is_ok());
        assert!(validate_name("name", "a").is_ok());
    }

    #[test]
    fn invalid_names() {
        assert!(validate_name("name", "").is_err());
        assert!(validate_name("name", "Admin").is_err());
        assert!(validate_name("name", "edit_role").is_err());
        assert!(validate_name("name", "-leading").is_err());
        assert!(validate_name("name", "trailing-").is_err());
        assert!(validate_name("name", "a/b").is_err());
        assert!(validate_name("name", &"a".repeat(64)).is_err());
    }

    #[test]
    fn object_kind_must_match() {
        assert!(validate_object(&role("view", "default")).is_ok());

        let mut wrong = role("view", "default");
        wrong.type_meta.kind = "RoleBinding".to_string();
        let err = validate_object(&wrong).unwrap_err();
        assert!(err.to_string().contains("kind must be 'Role'"));
    }

    #[test]
    fn object_name_is_reported_by_field() {
        let err = validate_object(&role("", "default")).unwrap_err();
        assert_eq!(err.to_string(), "metadata.name must not be empty");
    }

    #[test]
    fn role_binding_needs_role_ref_name() {
        let mut rb = RoleBinding::default();
        rb.type_meta.kind = "RoleBinding".to_string();
        rb.metadata.name = "view-binding".to_string();
        rb.metadata.namespace = "default".to_string();
        rb.subjects.push(Subject {
            kind: "User".to_string(),
            name: "bob".to_string(),
            namespace: String::new(),
        });
        assert!(validate_role_binding(&rb).is_err());

        rb.role_ref = RoleRef {
            name: "view".to_string(),
            ..Default::default()
        };
        assert!(validate_role_binding(&rb).is_ok());
    }

    #[test]
    fn auth_request_fields_required() {
        let mut req = AuthRequest {
            name: "alice".to_string(),
            verb: "get".to_string(),
            resource: "urls".to_string(),
            namespace: "default".to_string(),
        };
        assert!(validate_auth_request(&req).is_ok());
        req.verb.clear();
        assert_eq!(
            validate_auth_request(&req).unwrap_err().to_string(),
            "verb is required"
        );
    }
}
