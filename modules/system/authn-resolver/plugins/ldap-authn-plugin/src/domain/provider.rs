use std::sync::Arc;

use async_trait::async_trait;
use authn_resolver_sdk::ports::{DirectoryClient, DirectoryError};
use authn_resolver_sdk::{AuthenticationProvider, AuthnError, Credentials};
use portal_security::{LocalPrincipal, Principal};
use secrecy::ExposeSecret;

use crate::domain::search::UserSearch;

/// Locates the user with a search, then binds as the found entry.
pub struct BindAuthenticationProvider {
    directory: Arc<dyn DirectoryClient>,
    search: Arc<UserSearch>,
}

impl BindAuthenticationProvider {
    #[must_use]
    pub fn new(directory: Arc<dyn DirectoryClient>, search: Arc<UserSearch>) -> Self {
        Self { directory, search }
    }
}

fn directory_failure(err: DirectoryError) -> AuthnError {
    AuthnError::Directory(err.to_string())
}

#[async_trait]
impl AuthenticationProvider for BindAuthenticationProvider {
    async fn authenticate(&self, credentials: &Credentials) -> Result<Principal, AuthnError> {
        let login = credentials.username.trim();
        if login.is_empty() {
            return Err(AuthnError::BadCredentials);
        }
        // Servers treat a bind with an empty password as anonymous and accept it.
        if credentials.password.expose_secret().is_empty() {
            tracing::debug!(login, "empty password rejected before bind");
            return Err(AuthnError::BadCredentials);
        }

        let Some(entry) = self.search.find_user(login).await.map_err(directory_failure)? else {
            tracing::debug!(login, "no directory entry for login");
            return Err(AuthnError::BadCredentials);
        };

        match self.directory.bind(&entry.dn, &credentials.password).await {
            Ok(()) => {}
            Err(DirectoryError::InvalidCredentials) => return Err(AuthnError::BadCredentials),
            Err(err) => return Err(directory_failure(err)),
        }

        let username = entry
            .first(&self.search.mapping().login_id)
            .unwrap_or(login)
            .to_owned();
        tracing::debug!(username = %username, dn = %entry.dn, "directory bind succeeded");
        Ok(Principal::Local(LocalPrincipal {
            username,
            authorities: Vec::new(),
        }))
    }
}
