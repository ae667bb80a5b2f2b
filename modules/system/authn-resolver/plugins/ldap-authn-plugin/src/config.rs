use secrecy::SecretString;
use serde::Deserialize;

/// Plugin configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LdapAuthnPluginConfig {
    /// Directory server URLs, tried in order. Empty means the directory is
    /// supplied by the host, e.g. an in-memory one for development.
    pub urls: Vec<String>,
    /// Per-URL connect timeout.
    pub connect_timeout_secs: u64,
    /// Base DN all searches are rooted at.
    pub base: String,
    /// Manager DN used for searches.
    pub username: String,
    pub password: Option<SecretString>,
    /// User filter; `{0}` is replaced by the escaped login name.
    pub search_filter: String,
    pub mapping: LdapMappingConfig,
    pub group: LdapGroupConfig,
    pub logout_success_url: String,
}

impl Default for LdapAuthnPluginConfig {
    fn default() -> Self {
        Self {
            urls: Vec::new(),
            connect_timeout_secs: 5,
            base: String::new(),
            username: String::new(),
            password: None,
            search_filter: "(uid={0})".to_owned(),
            mapping: LdapMappingConfig::default(),
            group: LdapGroupConfig::default(),
            logout_success_url: "/signin?#/logout".to_owned(),
        }
    }
}

/// Attribute names of user entries.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LdapMappingConfig {
    pub object_class: String,
    pub login_id: String,
    /// RDN attribute of user DNs, used to match group members given as DNs.
    pub rdn_key: String,
    pub user_display_name: String,
    pub email: String,
}

impl Default for LdapMappingConfig {
    fn default() -> Self {
        Self {
            object_class: "inetOrgPerson".to_owned(),
            login_id: "uid".to_owned(),
            rdn_key: "uid".to_owned(),
            user_display_name: "cn".to_owned(),
            email: "mail".to_owned(),
        }
    }
}

/// Group restriction. Disabled while `group_search` is blank.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LdapGroupConfig {
    pub object_class: String,
    pub group_base: String,
    pub group_search: String,
    /// Attribute of the group entry listing its members.
    pub group_membership: String,
}

impl Default for LdapGroupConfig {
    fn default() -> Self {
        Self {
            object_class: "groupOfNames".to_owned(),
            group_base: String::new(),
            group_search: String::new(),
            group_membership: "member".to_owned(),
        }
    }
}

impl LdapGroupConfig {
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.group_search.trim().is_empty()
    }
}
