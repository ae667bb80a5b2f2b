use std::sync::Arc;

use authn_resolver_sdk::{AuthnError, CapabilityBundle, EntryPoint, Requirement};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use portal_auth::TokenValidator;
use portal_security::{BearerPrincipal, Principal, SecurityContext, SessionId, SessionStore};
use serde_json::Value;

use crate::chain::AuthorizationChain;

/// Session cookie settings.
#[derive(Debug, Clone)]
pub struct SessionCookie {
    name: String,
    secure: bool,
}

impl SessionCookie {
    #[must_use]
    pub fn new(name: impl Into<String>, secure: bool) -> Self {
        Self {
            name: name.into(),
            secure,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Session id carried by the request's `Cookie` header.
    #[must_use]
    pub fn read(&self, headers: &HeaderMap) -> Option<SessionId> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.name)
            .and_then(|(_, value)| SessionId::parse(value))
    }

    /// `Set-Cookie` value starting the session.
    ///
    /// # Errors
    ///
    /// Fails when the cookie name or id contain characters not allowed in a header.
    pub fn issue(&self, id: &SessionId) -> Result<HeaderValue, header::InvalidHeaderValue> {
        HeaderValue::from_str(&format!("{}={}; {}", self.name, id, self.attributes()))
    }

    /// `Set-Cookie` value expiring the session cookie.
    ///
    /// # Errors
    ///
    /// Fails when the cookie name contains characters not allowed in a header.
    pub fn clear(&self) -> Result<HeaderValue, header::InvalidHeaderValue> {
        HeaderValue::from_str(&format!(
            "{}=deleted; Expires=Thu, 01 Jan 1970 00:00:00 GMT; {}",
            self.name,
            self.attributes()
        ))
    }

    fn attributes(&self) -> &'static str {
        if self.secure {
            "HttpOnly; Secure; SameSite=Lax; Path=/"
        } else {
            "HttpOnly; SameSite=Lax; Path=/"
        }
    }
}

/// Shared state for the authentication middleware and the auth routes.
#[derive(Clone)]
pub struct GatewayState {
    pub bundle: Arc<CapabilityBundle>,
    pub chain: Arc<AuthorizationChain>,
    pub sessions: Arc<dyn SessionStore>,
    pub cookie: SessionCookie,
}

/// Resolves the caller and enforces the authorization chain.
///
/// For each request:
/// 1. Skips CORS preflight requests
/// 2. Builds the `SecurityContext` from the session cookie, or from a bearer
///    token when the strategy validates them
/// 3. Applies the first matching rule: unauthenticated callers get the
///    strategy's entry point, authenticated callers lacking a role get 403
pub async fn authn_middleware(
    axum::extract::State(state): axum::extract::State<GatewayState>,
    mut req: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    if is_preflight_request(req.method(), req.headers()) {
        return next.run(req).await;
    }

    let ctx = match resolve_context(&state, req.headers()).await {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };

    let requirement = state.chain.evaluate(req.uri().path());
    if let Some(denied) = authorize(requirement, &ctx, &state.bundle.chain_policy.entry_point) {
        tracing::debug!(path = %req.uri().path(), status = %denied.status(), "request rejected by authorization chain");
        return denied;
    }

    req.extensions_mut().insert(ctx);
    next.run(req).await
}

async fn resolve_context(state: &GatewayState, headers: &HeaderMap) -> Result<SecurityContext, Response> {
    if let Some(id) = state.cookie.read(headers)
        && let Some(principal) = state.sessions.get(&id).await
    {
        return Ok(SecurityContext::builder()
            .session_id(id)
            .principal(principal)
            .build());
    }

    if let (Some(validator), Some(token)) = (&state.bundle.bearer_validator, extract_bearer_token(headers)) {
        return bearer_context(validator.as_ref(), token).await;
    }

    Ok(SecurityContext::anonymous())
}

async fn bearer_context(validator: &dyn TokenValidator, token: &str) -> Result<SecurityContext, Response> {
    match validator.validate_and_parse(token).await {
        Ok(claims) => {
            let Some(subject) = claims.get("sub").and_then(Value::as_str).map(str::to_owned) else {
                tracing::debug!("bearer token without subject");
                return Err(unauthorized_bearer());
            };
            let authorities = scope_authorities(&claims);
            Ok(SecurityContext::builder()
                .principal(Principal::Bearer(BearerPrincipal {
                    subject,
                    claims,
                    authorities,
                }))
                .build())
        }
        Err(err) => {
            tracing::debug!(error = %err, "bearer token rejected");
            Err(unauthorized_bearer())
        }
    }
}

/// `SCOPE_<scope>` authorities from the `scope` (space separated) or `scp` claim.
fn scope_authorities(claims: &Value) -> Vec<String> {
    let scopes: Vec<&str> = match (claims.get("scope"), claims.get("scp")) {
        (Some(Value::String(s)), _) => s.split_whitespace().collect(),
        (_, Some(Value::Array(items))) => items.iter().filter_map(Value::as_str).collect(),
        (_, Some(Value::String(s))) => s.split_whitespace().collect(),
        _ => Vec::new(),
    };
    scopes.into_iter().map(|s| format!("SCOPE_{s}")).collect()
}

fn unauthorized_bearer() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Bearer")],
        "Unauthorized",
    )
        .into_response()
}

/// `None` when the request may proceed.
fn authorize(requirement: &Requirement, ctx: &SecurityContext, entry_point: &EntryPoint) -> Option<Response> {
    let principal = match (requirement, ctx.principal()) {
        (Requirement::Permit, _) => return None,
        (_, None) => return Some(entry_point_response(entry_point)),
        (_, Some(principal)) => principal,
    };
    match requirement {
        Requirement::RequireRole(role) if !principal.has_role(role) => {
            tracing::info!(principal = principal.name(), role = %role, "access denied");
            Some((StatusCode::FORBIDDEN, "Access denied").into_response())
        }
        _ => None,
    }
}

pub(crate) fn entry_point_response(entry_point: &EntryPoint) -> Response {
    match entry_point {
        EntryPoint::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized").into_response(),
        EntryPoint::Redirect(location) => redirect(location),
    }
}

pub(crate) fn authn_error_to_response(err: &AuthnError) -> Response {
    match err {
        AuthnError::BadCredentials
        | AuthnError::Disabled
        | AuthnError::UserNotFound(_)
        | AuthnError::ProviderRejected(_) => {
            tracing::debug!("AuthN rejected: {err}");
            (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
        }
        AuthnError::ReadOnly | AuthnError::InvalidUser(_) => {
            tracing::debug!("AuthN request refused: {err}");
            (StatusCode::BAD_REQUEST, "Bad request").into_response()
        }
        AuthnError::Directory(msg) => {
            tracing::error!("Directory unavailable: {msg}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "Authentication service unavailable",
            )
                .into_response()
        }
        AuthnError::Store(_) | AuthnError::Internal(_) => {
            tracing::error!("AuthN internal error: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal authentication error",
            )
                .into_response()
        }
    }
}

/// 302 to `location`.
pub(crate) fn redirect(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
        Err(_) => {
            tracing::error!(location, "redirect target is not a valid header value");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Extract Bearer token from Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer ").map(str::trim))
        .filter(|token| !token.is_empty())
}

/// Check if this is a CORS preflight request
///
/// Preflight requests are OPTIONS requests with:
/// - Origin header present
/// - Access-Control-Request-Method header present
fn is_preflight_request(method: &Method, headers: &HeaderMap) -> bool {
    method == Method::OPTIONS
        && headers.contains_key(header::ORIGIN)
        && headers.contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
}
