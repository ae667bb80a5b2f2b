use std::sync::Arc;

use async_trait::async_trait;
use authn_resolver_sdk::ports::{DirectoryEntry, DirectoryError};
use authn_resolver_sdk::{AuthnError, NewUser, UserInfo, UserQuery, UserService};

use crate::config::LdapMappingConfig;
use crate::domain::filter::escape;
use crate::domain::search::UserSearch;

/// Read-only user service backed by directory searches.
pub struct DirectoryUserService {
    search: Arc<UserSearch>,
}

impl DirectoryUserService {
    #[must_use]
    pub fn new(search: Arc<UserSearch>) -> Self {
        Self { search }
    }
}

fn user_info(entry: &DirectoryEntry, mapping: &LdapMappingConfig) -> Option<UserInfo> {
    let user_id = entry.first(&mapping.login_id)?;
    let name = entry.first(&mapping.user_display_name).unwrap_or(user_id);
    let email = entry.first(&mapping.email).unwrap_or_default();
    Some(UserInfo::new(user_id, name, email))
}

fn directory_failure(err: DirectoryError) -> AuthnError {
    AuthnError::Directory(err.to_string())
}

#[async_trait]
impl UserService for DirectoryUserService {
    async fn search_users(&self, query: &UserQuery) -> Result<Vec<UserInfo>, AuthnError> {
        let pattern = query
            .normalized_keyword()
            .map_or_else(|| "*".to_owned(), |k| format!("*{}*", escape(k)));
        let entries = self.search.list_users(&pattern).await.map_err(directory_failure)?;

        let mut users: Vec<UserInfo> = entries
            .iter()
            .filter_map(|entry| user_info(entry, self.search.mapping()))
            .collect();
        users.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Ok(users.into_iter().skip(query.offset).take(query.limit).collect())
    }

    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<UserInfo>, AuthnError> {
        let entries = self
            .search
            .list_users(&escape(user_id))
            .await
            .map_err(directory_failure)?;
        Ok(entries
            .iter()
            .find_map(|entry| user_info(entry, self.search.mapping())))
    }

    async fn find_by_user_ids(&self, user_ids: &[String]) -> Result<Vec<UserInfo>, AuthnError> {
        let mut found = Vec::with_capacity(user_ids.len());
        for user_id in user_ids {
            if let Some(user) = self.find_by_user_id(user_id).await? {
                found.push(user);
            }
        }
        Ok(found)
    }

    async fn create_or_update(&self, _user: NewUser) -> Result<(), AuthnError> {
        Err(AuthnError::ReadOnly)
    }
}
