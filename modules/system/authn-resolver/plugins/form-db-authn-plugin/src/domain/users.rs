use std::sync::Arc;

use async_trait::async_trait;
use authn_resolver_sdk::ports::{PasswordEncoder, StoredUser, UserStore};
use authn_resolver_sdk::{AuthnError, NewUser, UserInfo, UserQuery, UserService};
use portal_security::ROLE_PREFIX;

/// User service over the local user store.
pub struct StoreUserService {
    users: Arc<dyn UserStore>,
    encoder: Arc<dyn PasswordEncoder>,
    default_authority: String,
}

impl StoreUserService {
    /// New users are granted `ROLE_<user_role>`.
    #[must_use]
    pub fn new(users: Arc<dyn UserStore>, encoder: Arc<dyn PasswordEncoder>, user_role: &str) -> Self {
        Self {
            users,
            encoder,
            default_authority: format!("{ROLE_PREFIX}{user_role}"),
        }
    }
}

#[async_trait]
impl UserService for StoreUserService {
    async fn search_users(&self, query: &UserQuery) -> Result<Vec<UserInfo>, AuthnError> {
        let found = self.users.search(query).await?;
        Ok(found.iter().map(StoredUser::to_user_info).collect())
    }

    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<UserInfo>, AuthnError> {
        let found = self.users.find_by_username(user_id).await?;
        Ok(found.as_ref().map(StoredUser::to_user_info))
    }

    async fn find_by_user_ids(&self, user_ids: &[String]) -> Result<Vec<UserInfo>, AuthnError> {
        let found = self.users.find_by_usernames(user_ids).await?;
        Ok(found.iter().map(StoredUser::to_user_info).collect())
    }

    async fn create_or_update(&self, user: NewUser) -> Result<(), AuthnError> {
        let username = user.username.trim();
        if username.is_empty() {
            return Err(AuthnError::InvalidUser("username must not be empty".to_owned()));
        }

        if let Some(mut existing) = self.users.find_by_username(username).await? {
            if let Some(password) = &user.password {
                existing.password_hash = self.encoder.encode(password);
            }
            existing.display_name = user.display_name;
            existing.email = user.email;
            existing.enabled = user.enabled;
            self.users.update(existing).await?;
            tracing::info!(username, "user updated");
            return Ok(());
        }

        let Some(password) = &user.password else {
            return Err(AuthnError::InvalidUser(format!(
                "password is required to create user {username}"
            )));
        };
        let stored = StoredUser {
            username: username.to_owned(),
            password_hash: self.encoder.encode(password),
            enabled: user.enabled,
            display_name: user.display_name,
            email: user.email,
        };
        self.users
            .create(stored, vec![self.default_authority.clone()])
            .await?;
        tracing::info!(username, "user created");
        Ok(())
    }
}
