use std::sync::Arc;

use async_trait::async_trait;
use authn_resolver_sdk::ports::{StoredUser, UserStore};
use authn_resolver_sdk::{AuthnError, NewUser, UserInfo, UserQuery, UserService};
use secrecy::SecretString;

/// User service over the mirror of federated users.
///
/// Passwords are never stored; the provider owns credentials.
pub struct MirroredUserService {
    users: Arc<dyn UserStore>,
    authority: String,
}

impl MirroredUserService {
    #[must_use]
    pub fn new(users: Arc<dyn UserStore>, authority: impl Into<String>) -> Self {
        Self {
            users,
            authority: authority.into(),
        }
    }
}

#[async_trait]
impl UserService for MirroredUserService {
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
            existing.display_name = user.display_name;
            existing.email = user.email;
            existing.enabled = user.enabled;
            self.users.update(existing).await?;
            return Ok(());
        }

        let stored = StoredUser {
            username: username.to_owned(),
            password_hash: SecretString::from(String::new()),
            enabled: user.enabled,
            display_name: user.display_name,
            email: user.email,
        };
        self.users.create(stored, vec![self.authority.clone()]).await?;
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use authn_resolver_sdk::ports::InMemoryUserStore;
    use secrecy::ExposeSecret;

    fn new_user(name: &str) -> NewUser {
        NewUser {
            username: "sub-1".to_owned(),
            password: Some(SecretString::from("ignored")),
            display_name: name.to_owned(),
            email: "a@example.com".to_owned(),
            enabled: true,
        }
    }

    #[tokio::test]
    async fn upserts_without_password() {
        let store = Arc::new(InMemoryUserStore::new());
        let service = MirroredUserService::new(store.clone(), "ROLE_user");

        service.create_or_update(new_user("Alice")).await.unwrap();
        service.create_or_update(new_user("Alice B")).await.unwrap();

        let stored = store.find_by_username("sub-1").await.unwrap().unwrap();
        assert_eq!(stored.display_name, "Alice B");
        assert!(stored.password_hash.expose_secret().is_empty());

        let found = service.find_by_user_id("sub-1").await.unwrap().unwrap();
        assert_eq!(found.name, "Alice B");
        assert_eq!(service.search_users(&UserQuery::keyword("alice")).await.unwrap().len(), 1);
    }
}
