//! Authorization chain inputs supplied by a strategy.

/// Requirement attached to a URL pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    Permit,
    RequireAuthenticated,
    /// Principal must hold `ROLE_<role>`.
    RequireRole(String),
}

/// One entry of the ordered rule list; the first matching rule wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRule {
    pub url_pattern: String,
    pub requirement: Requirement,
}

impl AuthorizationRule {
    #[must_use]
    pub fn new(url_pattern: impl Into<String>, requirement: Requirement) -> Self {
        Self {
            url_pattern: url_pattern.into(),
            requirement,
        }
    }

    #[must_use]
    pub fn permit(url_pattern: impl Into<String>) -> Self {
        Self::new(url_pattern, Requirement::Permit)
    }
}

/// Form login endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSurface {
    pub login_page: String,
    pub success_url: String,
    pub failure_url: String,
}

impl Default for LoginSurface {
    fn default() -> Self {
        Self {
            login_page: "/signin".to_owned(),
            success_url: "/".to_owned(),
            failure_url: "/signin?#/error".to_owned(),
        }
    }
}

impl LoginSurface {
    /// Path part of the failure view (query and fragment stripped).
    #[must_use]
    pub fn failure_path(&self) -> &str {
        path_of(&self.failure_url)
    }
}

/// What an unauthenticated browser gets when a rule requires authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryPoint {
    /// Plain 401.
    Unauthorized,
    /// 302 to the given location.
    Redirect(String),
}

pub const DEFAULT_LOGOUT_URL: &str = "/user/logout";
pub const LOGIN_PICKER_PATH: &str = "/login";
pub const HEARTBEAT_PATH: &str = "/sso_heartbeat";

/// Everything the chain builder needs from a strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainPolicy {
    /// Requirement of the trailing `/**` rule.
    pub catch_all: Requirement,
    pub login: Option<LoginSurface>,
    /// Path of the interactive login picker, if the strategy has one.
    pub login_picker: Option<String>,
    /// Extra patterns permitted ahead of the catch-all, e.g. the paths that
    /// start an external login handshake.
    pub permits: Vec<String>,
    pub logout_url: String,
    pub entry_point: EntryPoint,
}

impl ChainPolicy {
    /// Everything permitted, no login surface.
    #[must_use]
    pub fn permit_all() -> Self {
        Self {
            catch_all: Requirement::Permit,
            login: None,
            login_picker: None,
            permits: Vec::new(),
            logout_url: DEFAULT_LOGOUT_URL.to_owned(),
            entry_point: EntryPoint::Unauthorized,
        }
    }

    /// Form login at `surface.login_page`, unauthenticated browsers redirected there.
    #[must_use]
    pub fn form_login(catch_all: Requirement, surface: LoginSurface) -> Self {
        Self {
            catch_all,
            entry_point: EntryPoint::Redirect(surface.login_page.clone()),
            login: Some(surface),
            login_picker: None,
            permits: Vec::new(),
            logout_url: DEFAULT_LOGOUT_URL.to_owned(),
        }
    }
}

/// Strip query and fragment from a URL path.
#[must_use]
pub fn path_of(url: &str) -> &str {
    url.split(['?', '#']).next().unwrap_or(url)
}
