//! Login surface and identity endpoints.

use authn_resolver_sdk::chain::{HEARTBEAT_PATH, LOGIN_PICKER_PATH, path_of};
use authn_resolver_sdk::{ChainPolicy, Credentials, HeartbeatStatus};
use axum::extract::{Extension, Form, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use portal_security::{FederatedPrincipal, Principal, SecurityContext};
use serde::{Deserialize, Serialize};

use crate::auth::{GatewayState, authn_error_to_response, redirect};

pub const HEALTH_PATH: &str = "/health";

#[derive(Debug, Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

/// Body of `GET /user`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UserView {
    user_id: String,
    name: String,
    email: String,
}

#[derive(Debug, Serialize)]
struct StatusBody {
    status: &'static str,
}

/// Routes served for the active strategy's policy.
pub fn auth_routes(policy: &ChainPolicy) -> Router<GatewayState> {
    let mut router = Router::new()
        .route(&policy.logout_url, get(logout).post(logout))
        .route("/user", get(current_user))
        .route(HEARTBEAT_PATH, get(heartbeat))
        .route(HEALTH_PATH, get(health));

    if let Some(login) = &policy.login {
        router = router.route(path_of(&login.login_page), post(form_login));
    }
    if policy.login_picker.is_some() {
        router = router.route(LOGIN_PICKER_PATH, get(login_options));
    }
    router
}

/// Origin of the request as seen by the browser, for provider redirects.
fn base_url(headers: &HeaderMap) -> String {
    let header_str = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    let scheme = header_str("x-forwarded-proto").unwrap_or("http");
    let host = header_str("x-forwarded-host").or_else(|| header_str(header::HOST.as_str()));
    host.map_or_else(String::new, |host| format!("{scheme}://{host}"))
}

fn redirect_with_cookie(location: &str, cookie: Result<header::HeaderValue, header::InvalidHeaderValue>) -> Response {
    let mut response = redirect(location);
    match cookie {
        Ok(value) => {
            response.headers_mut().append(header::SET_COOKIE, value);
            response
        }
        Err(err) => {
            tracing::error!(error = %err, "session cookie could not be encoded");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn start_session(state: &GatewayState, principal: Principal, location: &str) -> Response {
    let id = state.sessions.create(principal).await;
    redirect_with_cookie(location, state.cookie.issue(&id))
}

async fn form_login(State(state): State<GatewayState>, Form(form): Form<LoginForm>) -> Response {
    let (Some(login), Some(provider)) = (
        &state.bundle.chain_policy.login,
        &state.bundle.authentication_provider,
    ) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let credentials = Credentials::new(form.username, form.password);
    match provider.authenticate(&credentials).await {
        Ok(principal) => {
            tracing::info!(principal = principal.name(), "form login succeeded");
            start_session(&state, principal, &login.success_url).await
        }
        Err(err) => {
            if err.is_credential_failure() {
                tracing::info!(username = %credentials.username, reason = %err, "form login failed");
            } else {
                tracing::error!(username = %credentials.username, error = %err, "form login could not be processed");
            }
            redirect(&login.failure_url)
        }
    }
}

/// Finish a federated login whose provider handshake already succeeded.
///
/// Starts a session and redirects to `/`; a rejected login goes back to the picker.
pub async fn complete_federated_login(state: &GatewayState, principal: FederatedPrincipal) -> Response {
    let Some(handler) = &state.bundle.federated_login else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match handler.complete(principal).await {
        Ok(principal) => start_session(state, principal, "/").await,
        Err(err) => {
            tracing::info!(reason = %err, "federated login rejected");
            redirect(LOGIN_PICKER_PATH)
        }
    }
}

async fn logout(
    State(state): State<GatewayState>,
    Extension(ctx): Extension<SecurityContext>,
    headers: HeaderMap,
) -> Response {
    match state
        .bundle
        .logout_handler
        .logout(&ctx, &base_url(&headers))
        .await
    {
        Ok(outcome) => redirect_with_cookie(&outcome.redirect, state.cookie.clear()),
        Err(err) => authn_error_to_response(&err),
    }
}

async fn current_user(State(state): State<GatewayState>, Extension(ctx): Extension<SecurityContext>) -> Response {
    match state.bundle.identity_holder.current_identity(&ctx).await {
        Ok(identity) => Json(UserView {
            user_id: identity.principal_id().to_owned(),
            name: identity.display_name().to_owned(),
            email: identity.email().to_owned(),
        })
        .into_response(),
        Err(err) => authn_error_to_response(&err),
    }
}

async fn heartbeat(State(state): State<GatewayState>, Extension(ctx): Extension<SecurityContext>) -> Response {
    match state.bundle.heartbeat_handler.heartbeat(&ctx).await {
        HeartbeatStatus::Alive => (StatusCode::OK, Json(StatusBody { status: "alive" })).into_response(),
        HeartbeatStatus::Expired => {
            (StatusCode::UNAUTHORIZED, Json(StatusBody { status: "expired" })).into_response()
        }
    }
}

async fn login_options(State(state): State<GatewayState>) -> Response {
    Json(state.bundle.login_options.clone()).into_response()
}

async fn health() -> Json<StatusBody> {
    Json(StatusBody { status: "ok" })
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn base_url_prefers_forwarded_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("internal:8070"));
        assert_eq!(base_url(&headers), "http://internal:8070");

        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        headers.insert("x-forwarded-host", HeaderValue::from_static("portal.example.com"));
        assert_eq!(base_url(&headers), "https://portal.example.com");

        assert_eq!(base_url(&HeaderMap::new()), "");
    }
}
