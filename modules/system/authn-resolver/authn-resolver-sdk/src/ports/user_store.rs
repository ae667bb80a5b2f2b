use async_trait::async_trait;
use dashmap::DashMap;
use secrecy::SecretString;
use thiserror::Error;

use crate::models::{UserInfo, UserQuery};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user already exists: {0}")]
    Duplicate(String),

    #[error("user does not exist: {0}")]
    Missing(String),

    #[error("user store failure: {0}")]
    Backend(String),
}

/// Row of the local users table.
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub username: String,
    /// Encoded as `{scheme}hash`.
    pub password_hash: SecretString,
    pub enabled: bool,
    pub display_name: String,
    pub email: String,
}

impl StoredUser {
    #[must_use]
    pub fn to_user_info(&self) -> UserInfo {
        UserInfo {
            user_id: self.username.clone(),
            name: self.display_name.clone(),
            email: self.email.clone(),
            enabled: self.enabled,
        }
    }
}

/// Relational user store: users plus their granted authorities.
///
/// Every method fails with [`StoreError::Backend`] when the store is unavailable.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<StoredUser>, StoreError>;

    async fn find_by_usernames(&self, usernames: &[String]) -> Result<Vec<StoredUser>, StoreError>;

    /// Keyword matches username or display name, case-insensitively.
    async fn search(&self, query: &UserQuery) -> Result<Vec<StoredUser>, StoreError>;

    async fn authorities(&self, username: &str) -> Result<Vec<String>, StoreError>;

    async fn create(&self, user: StoredUser, authorities: Vec<String>) -> Result<(), StoreError>;

    async fn update(&self, user: StoredUser) -> Result<(), StoreError>;
}

struct UserRow {
    user: StoredUser,
    authorities: Vec<String>,
}

/// [`UserStore`] kept in process memory.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: DashMap<String, UserRow>,
}

impl InMemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user, for seeding.
    pub fn insert(&self, user: StoredUser, authorities: Vec<String>) {
        self.users
            .insert(user.username.clone(), UserRow { user, authorities });
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<StoredUser>, StoreError> {
        Ok(self.users.get(username).map(|row| row.user.clone()))
    }

    async fn find_by_usernames(&self, usernames: &[String]) -> Result<Vec<StoredUser>, StoreError> {
        Ok(usernames
            .iter()
            .filter_map(|name| self.users.get(name).map(|row| row.user.clone()))
            .collect())
    }

    async fn search(&self, query: &UserQuery) -> Result<Vec<StoredUser>, StoreError> {
        let keyword = query.normalized_keyword().map(str::to_lowercase);
        let mut found: Vec<StoredUser> = self
            .users
            .iter()
            .map(|row| row.user.clone())
            .filter(|u| query.include_inactive || u.enabled)
            .filter(|u| {
                keyword.as_deref().is_none_or(|k| {
                    u.username.to_lowercase().contains(k) || u.display_name.to_lowercase().contains(k)
                })
            })
            .collect();
        found.sort_by(|a, b| a.username.cmp(&b.username));

        Ok(found
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect())
    }

    async fn authorities(&self, username: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .users
            .get(username)
            .map(|row| row.authorities.clone())
            .unwrap_or_default())
    }

    async fn create(&self, user: StoredUser, authorities: Vec<String>) -> Result<(), StoreError> {
        match self.users.entry(user.username.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(StoreError::Duplicate(user.username)),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(UserRow { user, authorities });
                Ok(())
            }
        }
    }

    async fn update(&self, user: StoredUser) -> Result<(), StoreError> {
        let mut row = self
            .users
            .get_mut(&user.username)
            .ok_or_else(|| StoreError::Missing(user.username.clone()))?;
        row.user = user;
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn user(name: &str, display: &str, enabled: bool) -> StoredUser {
        StoredUser {
            username: name.to_owned(),
            password_hash: SecretString::from("{noop}pw"),
            enabled,
            display_name: display.to_owned(),
            email: format!("{name}@example.com"),
        }
    }

    fn store() -> InMemoryUserStore {
        let store = InMemoryUserStore::new();
        store.insert(user("alice", "Alice Liddell", true), vec!["ROLE_user".to_owned()]);
        store.insert(user("bob", "Bob", true), vec!["ROLE_user".to_owned()]);
        store.insert(user("carol", "Alicia Carol", false), vec![]);
        store
    }

    #[tokio::test]
    async fn search_matches_username_or_display_name() {
        let store = store();

        let found = store.search(&UserQuery::keyword("ali")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].username, "alice");

        let query = UserQuery {
            include_inactive: true,
            ..UserQuery::keyword("ALI")
        };
        let found = store.search(&query).await.unwrap();
        let names: Vec<_> = found.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, ["alice", "carol"]);
    }

    #[tokio::test]
    async fn search_pages_in_username_order() {
        let store = store();
        let query = UserQuery {
            offset: 1,
            limit: 1,
            ..UserQuery::default()
        };
        let found = store.search(&query).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].username, "bob");
    }

    #[tokio::test]
    async fn create_rejects_duplicates_and_update_requires_existing() {
        let store = store();
        let err = store.create(user("bob", "B", true), vec![]).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(name) if name == "bob"));

        let err = store.update(user("dave", "D", true)).await.unwrap_err();
        assert!(matches!(err, StoreError::Missing(_)));

        store.update(user("bob", "Robert", true)).await.unwrap();
        let bob = store.find_by_username("bob").await.unwrap().unwrap();
        assert_eq!(bob.display_name, "Robert");
        assert_eq!(store.authorities("bob").await.unwrap(), vec!["ROLE_user"]);
    }
}
