use serde::{Deserialize, Serialize};

/// Principal id reported for callers that have not authenticated.
pub const ANONYMOUS_PRINCIPAL_ID: &str = "anonymous";

/// Identity of the caller as resolved by the active authentication backend.
///
/// Consumers treat it as opaque: nothing in the identity reveals which
/// backend produced it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendIdentity {
    principal_id: String,
    display_name: String,
    email: String,
}

impl BackendIdentity {
    /// Create a new identity.
    #[must_use]
    pub fn new(
        principal_id: impl Into<String>,
        display_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            principal_id: principal_id.into(),
            display_name: display_name.into(),
            email: email.into(),
        }
    }

    /// Identity with only a principal id; the display name mirrors the id.
    #[must_use]
    pub fn from_principal_id(principal_id: impl Into<String>) -> Self {
        let principal_id = principal_id.into();
        Self {
            display_name: principal_id.clone(),
            principal_id,
            email: String::new(),
        }
    }

    /// The well-known anonymous sentinel.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::from_principal_id(ANONYMOUS_PRINCIPAL_ID)
    }

    /// Returns `true` for the anonymous sentinel.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.principal_id == ANONYMOUS_PRINCIPAL_ID
    }

    #[inline]
    #[must_use]
    pub fn principal_id(&self) -> &str {
        &self.principal_id
    }

    #[inline]
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[inline]
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }
}

impl Default for BackendIdentity {
    fn default() -> Self {
        Self::anonymous()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn anonymous_sentinel_is_recognised() {
        let identity = BackendIdentity::anonymous();
        assert!(identity.is_anonymous());
        assert_eq!(identity.principal_id(), ANONYMOUS_PRINCIPAL_ID);
        assert_eq!(identity.email(), "");
    }

    #[test]
    fn from_principal_id_mirrors_display_name() {
        let identity = BackendIdentity::from_principal_id("jdoe");
        assert!(!identity.is_anonymous());
        assert_eq!(identity.display_name(), "jdoe");
    }

    #[test]
    fn serializes_with_snake_case_fields() {
        let identity = BackendIdentity::new("jdoe", "John Doe", "jdoe@example.com");
        let json = serde_json::to_value(&identity).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "principal_id": "jdoe",
                "display_name": "John Doe",
                "email": "jdoe@example.com",
            })
        );
    }
}
