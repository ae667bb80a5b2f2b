//! Process wiring: tracing, seeded in-memory stores and the config source.

use std::sync::Arc;

use authn_resolver_sdk::Collaborators;
use authn_resolver_sdk::ports::{
    DelegatingPasswordEncoder, DirectoryClient, DirectoryEntry, InMemoryUserStore, PasswordEncoder,
    StoredUser,
};
use ldap_authn_plugin::{InMemoryDirectory, LdapDirectory};
use portal_auth::{KeyProvider, StaticKeyProvider};
use portal_security::InMemorySessionStore;
use server_config::{InMemoryServerConfigRepository, RefreshableConfigSource, ServerConfigSettings};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, LoggingConfig, SeedConfig};

const TOKEN_KEY_NAME: &str = "portal";

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
///
/// # Errors
///
/// Fails when the level is not a valid filter or a subscriber is already set.
pub fn init_tracing(cfg: &LoggingConfig) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&cfg.level)?,
    };
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if cfg.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    }
    .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}

/// Stores and key material shared by every strategy.
pub struct Stores {
    pub sessions: Arc<InMemorySessionStore>,
    pub collaborators: Collaborators,
}

/// Seeded stores for `cfg`. The directory is the LDAP server when
/// `authn.ldap.urls` is set, the seeded in-memory one otherwise.
#[must_use]
pub fn seed_stores(cfg: &AppConfig) -> Stores {
    let seed = &cfg.seed;
    let encoder = DelegatingPasswordEncoder::default();
    let users = InMemoryUserStore::new();
    for user in &seed.users {
        users.insert(
            StoredUser {
                username: user.username.clone(),
                password_hash: encoder.encode(&user.password),
                enabled: user.enabled,
                display_name: user.display_name.clone(),
                email: user.email.clone(),
            },
            user.authorities.clone(),
        );
    }

    let ldap = &cfg.authn.ldap;
    let directory: Arc<dyn DirectoryClient> = if ldap.urls.is_empty() {
        Arc::new(seeded_directory(seed))
    } else {
        info!(urls = ?ldap.urls, "Using directory server");
        Arc::new(LdapDirectory::from_config(ldap))
    };
    info!(
        users = users.len(),
        directory_entries = seed.directory.len(),
        bearer_key = seed.token_secret.is_some(),
        "Seeded in-memory stores"
    );

    let sessions = Arc::new(match cfg.gateway.session_idle_timeout() {
        Some(timeout) => InMemorySessionStore::with_idle_timeout(timeout),
        None => InMemorySessionStore::new(),
    });
    let collaborators = Collaborators {
        session_store: Some(sessions.clone()),
        user_store: Some(Arc::new(users)),
        password_encoder: Some(Arc::new(encoder)),
        directory: Some(directory),
        key_provider: seed
            .token_secret
            .as_ref()
            .map(|secret| Arc::new(StaticKeyProvider::hmac(TOKEN_KEY_NAME, secret)) as Arc<dyn KeyProvider>),
    };
    Stores { sessions, collaborators }
}

fn seeded_directory(seed: &SeedConfig) -> InMemoryDirectory {
    let directory = InMemoryDirectory::new();
    for seeded in &seed.directory {
        let entry = seeded
            .attributes
            .iter()
            .fold(DirectoryEntry::new(seeded.dn.clone()), |entry, (name, values)| {
                entry.with_attribute(name, values.iter().cloned())
            });
        match &seeded.password {
            Some(password) => directory.add_user(entry, password.clone()),
            None => directory.add_entry(entry),
        }
    }
    directory
}

/// Config source over the seeded overrides, with an optional explicit cluster.
#[must_use]
pub fn server_config_source(settings: &ServerConfigSettings, seed: &SeedConfig) -> Arc<RefreshableConfigSource> {
    let repository = Arc::new(InMemoryServerConfigRepository::new(seed.server_config.clone()));
    Arc::new(RefreshableConfigSource::new(
        repository,
        settings.data_center.clone(),
        settings.cluster.clone(),
    ))
}
