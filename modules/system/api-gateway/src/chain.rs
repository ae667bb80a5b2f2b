//! Ordered, first-match authorization rules.

use authn_resolver_sdk::chain::{HEARTBEAT_PATH, path_of};
use authn_resolver_sdk::{AuthorizationRule, ChainPolicy, Requirement};
use thiserror::Error;

use crate::ant::AntPattern;

/// Paths every strategy leaves open: monitoring, API docs and static assets.
pub const BY_PASS_URLS: &[&str] = &[
    "/prometheus/**",
    "/metrics/**",
    "/openapi/**",
    "/vendor/**",
    "/styles/**",
    "/scripts/**",
    "/views/**",
    "/img/**",
    "/i18n/**",
    "/prefix-path",
    "/health",
];

const CATCH_ALL: &str = "/**";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("catch-all rule '/**' registered more than once")]
    DuplicateCatchAll,

    #[error("rule pattern must not be blank")]
    BlankPattern,

    #[error("invalid rule pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Assembles the rule list: bypass permits, login surface permits, extra
/// rules, then the single catch-all.
#[derive(Debug, Default)]
pub struct AuthorizationChainBuilder {
    bypass: Vec<String>,
    rules: Vec<AuthorizationRule>,
    catch_all: Option<Requirement>,
}

impl AuthorizationChainBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn bypass<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bypass.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Permits for the login surface, the policy's extra permits, logout and
    /// heartbeat, plus the catch-all.
    #[must_use]
    pub fn policy(mut self, policy: &ChainPolicy) -> Self {
        if let Some(login) = &policy.login {
            self.rules.push(AuthorizationRule::permit(path_of(&login.login_page)));
            self.rules.push(AuthorizationRule::permit(login.failure_path()));
        }
        if let Some(picker) = &policy.login_picker {
            self.rules.push(AuthorizationRule::permit(picker.clone()));
        }
        self.rules
            .extend(policy.permits.iter().map(|pattern| AuthorizationRule::permit(pattern.clone())));
        self.rules.push(AuthorizationRule::permit(policy.logout_url.clone()));
        self.rules.push(AuthorizationRule::permit(HEARTBEAT_PATH));
        self.catch_all = Some(policy.catch_all.clone());
        self
    }

    /// Extra rule evaluated after the login surface and before the catch-all.
    #[must_use]
    pub fn rule(mut self, rule: AuthorizationRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// # Errors
    ///
    /// [`ChainError::DuplicateCatchAll`] when a `/**` rule was added next to
    /// the policy's catch-all, [`ChainError::BlankPattern`] for empty patterns
    /// and [`ChainError::InvalidPattern`] for malformed wildcards.
    pub fn build(self) -> Result<AuthorizationChain, ChainError> {
        let mut rules: Vec<AuthorizationRule> = self
            .bypass
            .into_iter()
            .map(AuthorizationRule::permit)
            .chain(self.rules)
            .collect();
        rules.push(AuthorizationRule::new(
            CATCH_ALL,
            self.catch_all.unwrap_or(Requirement::Permit),
        ));

        let mut compiled = Vec::with_capacity(rules.len());
        let mut catch_alls = 0;
        for rule in rules {
            if rule.url_pattern.trim().is_empty() {
                return Err(ChainError::BlankPattern);
            }
            let pattern = AntPattern::new(&rule.url_pattern).map_err(|e| ChainError::InvalidPattern {
                pattern: rule.url_pattern.clone(),
                reason: e.to_string(),
            })?;
            if pattern.is_catch_all() {
                catch_alls += 1;
                if catch_alls > 1 {
                    return Err(ChainError::DuplicateCatchAll);
                }
            }
            compiled.push((pattern, rule));
        }
        Ok(AuthorizationChain { rules: compiled })
    }
}

/// Compiled rule list; the last rule always matches.
#[derive(Debug, Clone)]
pub struct AuthorizationChain {
    rules: Vec<(AntPattern, AuthorizationRule)>,
}

impl AuthorizationChain {
    /// Requirement of the first rule matching `path`.
    #[must_use]
    pub fn evaluate(&self, path: &str) -> &Requirement {
        self.rules
            .iter()
            .find(|(pattern, _)| pattern.matches(path))
            .map_or(&Requirement::Permit, |(_, rule)| &rule.requirement)
    }

    pub fn rules(&self) -> impl Iterator<Item = &AuthorizationRule> {
        self.rules.iter().map(|(_, rule)| rule)
    }
}
