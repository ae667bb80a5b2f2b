use std::sync::Arc;

use portal_auth::KeyProvider;
use portal_security::SessionStore;

use crate::error::StartupError;
use crate::models::StrategyChoice;
use crate::ports::{DirectoryClient, PasswordEncoder, UserStore};

/// Infrastructure handed to the strategy at startup.
///
/// Each strategy takes what it needs and fails with
/// [`StartupError::MissingCapability`] when something required is absent.
#[derive(Clone, Default)]
pub struct Collaborators {
    pub session_store: Option<Arc<dyn SessionStore>>,
    pub user_store: Option<Arc<dyn UserStore>>,
    pub password_encoder: Option<Arc<dyn PasswordEncoder>>,
    pub directory: Option<Arc<dyn DirectoryClient>>,
    pub key_provider: Option<Arc<dyn KeyProvider>>,
}

impl Collaborators {
    /// # Errors
    ///
    /// [`StartupError::MissingCapability`] when no session store was supplied.
    pub fn require_session_store(
        &self,
        strategy: StrategyChoice,
    ) -> Result<Arc<dyn SessionStore>, StartupError> {
        self.session_store
            .clone()
            .ok_or_else(|| StartupError::missing(strategy, "session store"))
    }

    /// # Errors
    ///
    /// [`StartupError::MissingCapability`] when no user store was supplied.
    pub fn require_user_store(&self, strategy: StrategyChoice) -> Result<Arc<dyn UserStore>, StartupError> {
        self.user_store
            .clone()
            .ok_or_else(|| StartupError::missing(strategy, "user store"))
    }

    /// # Errors
    ///
    /// [`StartupError::MissingCapability`] when no directory client was supplied.
    pub fn require_directory(
        &self,
        strategy: StrategyChoice,
    ) -> Result<Arc<dyn DirectoryClient>, StartupError> {
        self.directory
            .clone()
            .ok_or_else(|| StartupError::missing(strategy, "directory client"))
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators")
            .field("session_store", &self.session_store.is_some())
            .field("user_store", &self.user_store.is_some())
            .field("password_encoder", &self.password_encoder.is_some())
            .field("directory", &self.directory.is_some())
            .field("key_provider", &self.key_provider.as_ref().map(|p| p.name().to_owned()))
            .finish()
    }
}
