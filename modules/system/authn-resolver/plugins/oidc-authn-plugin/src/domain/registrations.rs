use std::collections::HashSet;

use authn_resolver_sdk::LoginOption;

use crate::config::ClientRegistration;

/// Client registrations with unique ids, in configuration order.
#[derive(Debug, Clone)]
pub struct Registrations {
    items: Vec<ClientRegistration>,
}

impl Registrations {
    /// # Errors
    ///
    /// Returns a description of the first blank or duplicate registration id.
    pub fn new(items: Vec<ClientRegistration>) -> Result<Self, String> {
        let mut seen = HashSet::new();
        for item in &items {
            let id = item.registration_id.trim();
            if id.is_empty() {
                return Err("registration_id must not be blank".to_owned());
            }
            if !seen.insert(id.to_owned()) {
                return Err(format!("duplicate registration_id {id:?}"));
            }
        }
        Ok(Self { items })
    }

    #[must_use]
    pub fn get(&self, registration_id: &str) -> Option<&ClientRegistration> {
        self.items.iter().find(|r| r.registration_id == registration_id)
    }

    /// Registrations a browser can log in through.
    pub fn interactive(&self) -> impl Iterator<Item = &ClientRegistration> {
        self.items.iter().filter(|r| r.is_interactive())
    }

    #[must_use]
    pub fn login_options(&self) -> Vec<LoginOption> {
        self.interactive()
            .map(|r| LoginOption {
                registration_id: r.registration_id.clone(),
                client_name: r.display_name().to_owned(),
                authorization_uri: r.authorization_uri(),
            })
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
pub(crate) mod test_support {
    use crate::config::{ClientRegistration, GrantType};

    pub fn registration(id: &str, grant_type: GrantType) -> ClientRegistration {
        ClientRegistration {
            registration_id: id.to_owned(),
            client_id: format!("{id}-client"),
            client_secret: None,
            grant_type,
            scopes: vec!["openid".to_owned()],
            issuer_uri: None,
            end_session_endpoint: None,
            client_name: None,
            authorization_uri: None,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::test_support::registration;
    use super::*;
    use crate::config::GrantType;

    #[test]
    fn login_options_skip_client_credentials() {
        let regs = Registrations::new(vec![
            registration("corp", GrantType::AuthorizationCode),
            registration("batch", GrantType::ClientCredentials),
            registration("github", GrantType::AuthorizationCode),
        ])
        .unwrap();

        let ids: Vec<_> = regs
            .login_options()
            .into_iter()
            .map(|o| o.registration_id)
            .collect();
        assert_eq!(ids, ["corp", "github"]);
        assert!(regs.get("batch").is_some());
        assert_eq!(regs.len(), 3);
    }

    #[test]
    fn rejects_duplicate_and_blank_ids() {
        let dup = Registrations::new(vec![
            registration("corp", GrantType::AuthorizationCode),
            registration("corp", GrantType::ClientCredentials),
        ]);
        assert!(dup.unwrap_err().contains("duplicate"));
        assert!(Registrations::new(vec![registration(" ", GrantType::AuthorizationCode)]).is_err());
    }
}
