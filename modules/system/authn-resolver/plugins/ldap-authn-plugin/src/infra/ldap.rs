use std::time::Duration;

use async_trait::async_trait;
use authn_resolver_sdk::ports::{DirectoryClient, DirectoryEntry, DirectoryError};
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, LdapError, LdapResult, Scope, SearchEntry};
use secrecy::{ExposeSecret, SecretString};

use crate::config::LdapAuthnPluginConfig;

const RC_SUCCESS: u32 = 0;
const RC_SIZE_LIMIT_EXCEEDED: u32 = 4;
const RC_REFERRAL: u32 = 10;
const RC_INVALID_CREDENTIALS: u32 = 49;

/// Directory server reached over LDAP.
///
/// Every operation opens a fresh connection, trying the URLs in order.
/// Searches run as the manager DN when one is configured, anonymously otherwise.
pub struct LdapDirectory {
    urls: Vec<String>,
    manager_dn: String,
    manager_password: Option<SecretString>,
    connect_timeout: Duration,
}

impl LdapDirectory {
    #[must_use]
    pub fn new(
        urls: Vec<String>,
        manager_dn: impl Into<String>,
        manager_password: Option<SecretString>,
        connect_timeout: Duration,
    ) -> Self {
        Self {
            urls,
            manager_dn: manager_dn.into(),
            manager_password,
            connect_timeout,
        }
    }

    #[must_use]
    pub fn from_config(cfg: &LdapAuthnPluginConfig) -> Self {
        Self::new(
            cfg.urls.clone(),
            cfg.username.trim(),
            cfg.password.clone(),
            Duration::from_secs(cfg.connect_timeout_secs),
        )
    }

    async fn connect(&self) -> Result<Ldap, DirectoryError> {
        let mut last_error = "no directory urls configured".to_owned();
        for url in &self.urls {
            let settings = LdapConnSettings::new().set_conn_timeout(self.connect_timeout);
            match LdapConnAsync::with_settings(settings, url).await {
                Ok((conn, ldap)) => {
                    tokio::spawn(async move {
                        if let Err(err) = conn.drive().await {
                            tracing::warn!(error = %err, "directory connection closed with an error");
                        }
                    });
                    return Ok(ldap);
                }
                Err(err) => {
                    tracing::debug!(url, error = %err, "directory url unreachable");
                    last_error = format!("{url}: {err}");
                }
            }
        }
        Err(DirectoryError::Unreachable(last_error))
    }

    /// Connection bound as the manager, ready for searches.
    async fn manager_connection(&self) -> Result<Ldap, DirectoryError> {
        let mut ldap = self.connect().await?;
        if self.manager_dn.is_empty() {
            return Ok(ldap);
        }
        let password = self
            .manager_password
            .as_ref()
            .map_or("", ExposeSecret::expose_secret);
        let outcome = ldap
            .simple_bind(&self.manager_dn, password)
            .await
            .map_err(operation_failure)
            .and_then(|result| match bind_outcome(&result) {
                Err(DirectoryError::InvalidCredentials) => Err(DirectoryError::Other(format!(
                    "manager bind refused for {}",
                    self.manager_dn
                ))),
                other => other,
            });
        match outcome {
            Ok(()) => Ok(ldap),
            Err(err) => {
                close(ldap).await;
                Err(err)
            }
        }
    }
}

async fn close(mut ldap: Ldap) {
    if let Err(err) = ldap.unbind().await {
        tracing::debug!(error = %err, "directory unbind failed");
    }
}

fn operation_failure(err: LdapError) -> DirectoryError {
    DirectoryError::Other(err.to_string())
}

fn bind_outcome(result: &LdapResult) -> Result<(), DirectoryError> {
    match result.rc {
        RC_SUCCESS => Ok(()),
        RC_INVALID_CREDENTIALS => Err(DirectoryError::InvalidCredentials),
        rc => Err(DirectoryError::Other(format!("bind failed (rc={rc}): {}", result.text))),
    }
}

/// Size limits and unfollowed referrals still hand back what was found.
fn search_outcome(
    result: &LdapResult,
    entries: Vec<DirectoryEntry>,
) -> Result<Vec<DirectoryEntry>, DirectoryError> {
    match result.rc {
        RC_SUCCESS => Ok(entries),
        RC_SIZE_LIMIT_EXCEEDED | RC_REFERRAL => Err(DirectoryError::PartialResult {
            entries,
            reason: format!("rc={}: {}", result.rc, result.text),
        }),
        rc => Err(DirectoryError::Other(format!("search failed (rc={rc}): {}", result.text))),
    }
}

fn to_entry(entry: SearchEntry) -> DirectoryEntry {
    entry
        .attrs
        .into_iter()
        .fold(DirectoryEntry::new(entry.dn), |acc, (name, values)| {
            acc.with_attribute(&name, values)
        })
}

#[async_trait]
impl DirectoryClient for LdapDirectory {
    async fn check_connection(&self) -> Result<(), DirectoryError> {
        let ldap = self.manager_connection().await?;
        close(ldap).await;
        Ok(())
    }

    async fn search(&self, base: &str, filter: &str) -> Result<Vec<DirectoryEntry>, DirectoryError> {
        let mut ldap = self.manager_connection().await?;
        let response = ldap.search(base, Scope::Subtree, filter, vec!["*"]).await;
        close(ldap).await;

        let response = response.map_err(operation_failure)?;
        let entries = response.0.into_iter().map(SearchEntry::construct).map(to_entry).collect();
        search_outcome(&response.1, entries)
    }

    async fn bind(&self, dn: &str, password: &SecretString) -> Result<(), DirectoryError> {
        let mut ldap = self.connect().await?;
        let result = ldap.simple_bind(dn, password.expose_secret()).await;
        close(ldap).await;
        bind_outcome(&result.map_err(operation_failure)?)
    }
}
