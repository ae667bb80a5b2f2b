use crate::principal::Principal;
use crate::session::SessionId;

/// Per-request security information handed to capability implementations.
///
/// Built by the request pipeline from the session cookie and/or a validated
/// bearer token. Holds no mutable state.
#[derive(Clone, Debug, Default)]
pub struct SecurityContext {
    session_id: Option<SessionId>,
    principal: Option<Principal>,
}

impl SecurityContext {
    /// Context of an unauthenticated request without a session.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn builder() -> SecurityContextBuilder {
        SecurityContextBuilder::default()
    }

    #[must_use]
    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    #[must_use]
    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }
}

#[derive(Debug, Default)]
pub struct SecurityContextBuilder {
    session_id: Option<SessionId>,
    principal: Option<Principal>,
}

impl SecurityContextBuilder {
    #[must_use]
    pub fn session_id(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    #[must_use]
    pub fn principal(mut self, principal: Principal) -> Self {
        self.principal = Some(principal);
        self
    }

    #[must_use]
    pub fn build(self) -> SecurityContext {
        SecurityContext {
            session_id: self.session_id,
            principal: self.principal,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::principal::LocalPrincipal;

    #[test]
    fn anonymous_context_is_not_authenticated() {
        let ctx = SecurityContext::anonymous();
        assert!(!ctx.is_authenticated());
        assert!(ctx.session_id().is_none());
    }

    #[test]
    fn builder_sets_principal_and_session() {
        let session_id = SessionId::generate();
        let ctx = SecurityContext::builder()
            .session_id(session_id.clone())
            .principal(Principal::Local(LocalPrincipal {
                username: "jdoe".to_owned(),
                authorities: vec![],
            }))
            .build();

        assert!(ctx.is_authenticated());
        assert_eq!(ctx.session_id(), Some(&session_id));
        assert_eq!(ctx.principal().map(Principal::name), Some("jdoe"));
    }
}
