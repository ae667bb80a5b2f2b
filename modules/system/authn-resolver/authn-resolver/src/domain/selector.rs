//! Strategy selection from the activation signal.

use authn_resolver_sdk::{StartupError, StrategyChoice};

/// Strategy activated by a single profile token, if it names one.
///
/// `ctrip` names the vendor single sign-on, which runs as the default
/// strategy here.
#[must_use]
pub fn token_choice(token: &str) -> Option<StrategyChoice> {
    match token {
        "auth" => Some(StrategyChoice::FormDb),
        "ldap" => Some(StrategyChoice::Ldap),
        "oidc" => Some(StrategyChoice::Oidc),
        "ctrip" => Some(StrategyChoice::Default),
        _ => None,
    }
}

/// Pick the strategy for a comma-separated profile list.
///
/// Unknown tokens are ignored and an empty signal selects
/// [`StrategyChoice::Default`]. Repeating a token is harmless.
///
/// # Errors
///
/// [`StartupError::AmbiguousActivation`] when two different strategies are named.
pub fn select(signal: &str) -> Result<StrategyChoice, StartupError> {
    let mut chosen: Option<StrategyChoice> = None;
    for token in signal.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let Some(choice) = token_choice(token) else {
            continue;
        };
        match chosen {
            Some(first) if first != choice => {
                return Err(StartupError::AmbiguousActivation {
                    first,
                    second: choice,
                });
            }
            _ => chosen = Some(choice),
        }
    }
    Ok(chosen.unwrap_or(StrategyChoice::Default))
}
