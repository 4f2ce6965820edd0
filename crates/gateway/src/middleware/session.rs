//! Session and access gate middleware.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use common::AppError;
use domain::Principal;

use crate::access::{Decision, LOGIN_PATH};
use crate::state::AppState;

/// Resolve the session cookie into a [`Principal`] request extension.
///
/// A missing, tampered or expired token simply leaves the request
/// anonymous.
pub async fn session_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if let Some(cookie) = jar.get(&state.config.cookie_name) {
        match state.auth.verify_token(cookie.value()) {
            Ok(principal) => {
                request.extensions_mut().insert(principal);
            }
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unusable session cookie");
            }
        }
    }

    next.run(request).await
}

/// Apply the access gate to the request path.
pub async fn access_gate_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let path = request.uri().path().to_owned();
    let decision = state
        .gate
        .decide(&path, request.extensions().get::<Principal>());

    match decision {
        Decision::Allow => Ok(next.run(request).await),
        Decision::RedirectToLogin => {
            tracing::debug!(path = %path, "Anonymous request sent to login");
            Ok(Redirect::to(LOGIN_PATH).into_response())
        }
        Decision::Deny => {
            tracing::debug!(path = %path, "Request lacks the required role");
            Err(AppError::Forbidden)
        }
    }
}
