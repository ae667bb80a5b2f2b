//! User lookup: a flat filter search, optionally restricted to group members.

use std::collections::HashSet;
use std::sync::Arc;

use authn_resolver_sdk::ports::{DirectoryClient, DirectoryEntry, DirectoryError};

use crate::config::{LdapAuthnPluginConfig, LdapGroupConfig, LdapMappingConfig};
use crate::domain::filter::{bind_placeholder, escape};

/// Keep the entries of a partial result and log the failure.
pub(crate) fn tolerate_partial(
    result: Result<Vec<DirectoryEntry>, DirectoryError>,
) -> Result<Vec<DirectoryEntry>, DirectoryError> {
    match result {
        Err(DirectoryError::PartialResult { entries, reason }) => {
            tracing::warn!(kept = entries.len(), reason = %reason, "ignoring partial directory result");
            Ok(entries)
        }
        other => other,
    }
}

/// Value of the first RDN component named `key` in `dn`.
#[must_use]
pub fn dn_attribute_value<'a>(dn: &'a str, key: &str) -> Option<&'a str> {
    dn.split(',').find_map(|component| {
        let (name, value) = component.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case(key)
            .then(|| value.trim())
    })
}

/// Member identifiers of the configured groups, lowercased.
///
/// DN values are reduced to their `rdn_key` value; other values (e.g.
/// `memberUid`) are taken as-is.
#[derive(Debug, Default)]
pub struct GroupMembers {
    ids: HashSet<String>,
    dns: HashSet<String>,
}

impl GroupMembers {
    fn insert(&mut self, member: &str, rdn_key: &str) {
        let member = member.trim();
        if member.contains('=') {
            self.dns.insert(member.to_lowercase());
            if let Some(value) = dn_attribute_value(member, rdn_key) {
                self.ids.insert(value.to_lowercase());
            }
        } else if !member.is_empty() {
            self.ids.insert(member.to_lowercase());
        }
    }

    /// `true` when the entry is listed by login id, RDN value or full DN.
    #[must_use]
    pub fn contains(&self, entry: &DirectoryEntry, mapping: &LdapMappingConfig) -> bool {
        if self.dns.contains(&entry.dn.to_lowercase()) {
            return true;
        }
        let by_login = entry
            .first(&mapping.login_id)
            .is_some_and(|id| self.ids.contains(&id.to_lowercase()));
        let by_rdn = dn_attribute_value(&entry.dn, &mapping.rdn_key)
            .is_some_and(|id| self.ids.contains(&id.to_lowercase()));
        by_login || by_rdn
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty() && self.dns.is_empty()
    }
}

/// Locates user entries in the directory.
pub struct UserSearch {
    directory: Arc<dyn DirectoryClient>,
    base: String,
    search_filter: String,
    mapping: LdapMappingConfig,
    group: Option<LdapGroupConfig>,
}

impl UserSearch {
    #[must_use]
    pub fn new(directory: Arc<dyn DirectoryClient>, config: &LdapAuthnPluginConfig) -> Self {
        Self {
            directory,
            base: config.base.clone(),
            search_filter: config.search_filter.clone(),
            mapping: config.mapping.clone(),
            group: config.group.is_enabled().then(|| config.group.clone()),
        }
    }

    #[must_use]
    pub fn mapping(&self) -> &LdapMappingConfig {
        &self.mapping
    }

    #[must_use]
    pub fn group_filter_enabled(&self) -> bool {
        self.group.is_some()
    }

    fn group_base(&self, group: &LdapGroupConfig) -> String {
        let group_base = group.group_base.trim();
        match (group_base.is_empty(), self.base.trim().is_empty()) {
            (true, _) => self.base.clone(),
            (false, true) => group_base.to_owned(),
            (false, false) => format!("{group_base},{}", self.base.trim()),
        }
    }

    /// Members of the configured groups; `None` when no group filter is configured.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError`] when the group search fails outright.
    pub async fn group_members(&self) -> Result<Option<GroupMembers>, DirectoryError> {
        let Some(group) = &self.group else {
            return Ok(None);
        };
        let groups = tolerate_partial(
            self.directory
                .search(&self.group_base(group), group.group_search.trim())
                .await,
        )?;

        let mut members = GroupMembers::default();
        for entry in &groups {
            for member in entry.values(&group.group_membership) {
                members.insert(member, &self.mapping.rdn_key);
            }
        }
        tracing::debug!(groups = groups.len(), members = members.len(), "resolved group members");
        Ok(Some(members))
    }

    /// The single entry matching `login`, or `None`.
    ///
    /// With a group filter, entries outside the groups are dropped even
    /// when they match the user filter.
    ///
    /// # Errors
    ///
    /// [`DirectoryError::Other`] when more than one entry matches.
    pub async fn find_user(&self, login: &str) -> Result<Option<DirectoryEntry>, DirectoryError> {
        let filter = bind_placeholder(&self.search_filter, login);
        let mut found = tolerate_partial(self.directory.search(&self.base, &filter).await)?;

        if let Some(members) = self.group_members().await? {
            found.retain(|entry| members.contains(entry, &self.mapping));
        }

        match found.len() {
            0 => Ok(None),
            1 => Ok(found.pop()),
            n => Err(DirectoryError::Other(format!(
                "user search for {login:?} returned {n} entries"
            ))),
        }
    }

    /// Entries of `object_class` whose login id matches `login_pattern`
    /// (a filter assertion value, wildcards allowed), restricted to group
    /// members when configured.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError`] when a search fails outright.
    pub async fn list_users(&self, login_pattern: &str) -> Result<Vec<DirectoryEntry>, DirectoryError> {
        let filter = format!(
            "(&(objectClass={})({}={}))",
            escape(&self.mapping.object_class),
            self.mapping.login_id,
            login_pattern
        );
        let mut found = tolerate_partial(self.directory.search(&self.base, &filter).await)?;
        if let Some(members) = self.group_members().await? {
            found.retain(|entry| members.contains(entry, &self.mapping));
        }
        Ok(found)
    }
}
