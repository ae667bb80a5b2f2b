use secrecy::SecretString;

/// Authority prefix used for role checks (`ROLE_<role>`).
pub const ROLE_PREFIX: &str = "ROLE_";

/// Authenticated principal attached to a session or a bearer-authenticated request.
#[derive(Clone, Debug)]
pub enum Principal {
    /// Authenticated by the portal itself (form login against a user store or a directory bind).
    Local(LocalPrincipal),
    /// Authenticated by a federated identity provider.
    Federated(FederatedPrincipal),
    /// Authenticated by a validated bearer token.
    Bearer(BearerPrincipal),
}

impl Principal {
    /// Name the principal is known by inside the portal.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Local(p) => &p.username,
            Self::Federated(p) => &p.subject,
            Self::Bearer(p) => &p.subject,
        }
    }

    /// Granted authorities (e.g. `ROLE_user`).
    #[must_use]
    pub fn authorities(&self) -> &[String] {
        match self {
            Self::Local(p) => &p.authorities,
            Self::Federated(p) => &p.authorities,
            Self::Bearer(p) => &p.authorities,
        }
    }

    /// Returns `true` when the principal holds `ROLE_<role>`.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.authorities().iter().any(|authority| {
            authority
                .strip_prefix(ROLE_PREFIX)
                .is_some_and(|granted| granted == role)
        })
    }
}

/// Principal produced by a local credential check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalPrincipal {
    pub username: String,
    pub authorities: Vec<String>,
}

/// Principal produced by a completed federated login.
#[derive(Clone, Debug)]
pub struct FederatedPrincipal {
    /// Client registration the login went through.
    pub registration_id: String,
    /// Stable subject identifier issued by the provider.
    pub subject: String,
    pub preferred_username: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    /// Raw ID token, used as `id_token_hint` on provider logout.
    pub id_token: Option<SecretString>,
    pub authorities: Vec<String>,
}

/// Principal produced by a validated bearer token.
#[derive(Clone, Debug)]
pub struct BearerPrincipal {
    pub subject: String,
    pub claims: serde_json::Value,
    pub authorities: Vec<String>,
}
