use authn_resolver_sdk::LoginSurface;
use serde::Deserialize;

/// Plugin configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormDbAuthnPluginConfig {
    pub login_page: String,
    pub success_url: String,
    pub failure_url: String,
    pub logout_success_url: String,

    /// Role required for everything behind the login (`ROLE_<role>` authority).
    pub user_role: String,
}

impl Default for FormDbAuthnPluginConfig {
    fn default() -> Self {
        let surface = LoginSurface::default();
        Self {
            login_page: surface.login_page,
            success_url: surface.success_url,
            failure_url: surface.failure_url,
            logout_success_url: "/signin?#/logout".to_owned(),
            user_role: "user".to_owned(),
        }
    }
}

impl FormDbAuthnPluginConfig {
    #[must_use]
    pub fn login_surface(&self) -> LoginSurface {
        LoginSurface {
            login_page: self.login_page.clone(),
            success_url: self.success_url.clone(),
            failure_url: self.failure_url.clone(),
        }
    }
}
