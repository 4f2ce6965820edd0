//! Extractors for the session principal.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};

use common::AppError;
use domain::Principal;

use crate::access::LOGIN_PATH;

/// The logged-in caller. Anonymous requests are sent to the login page.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Principal);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| Redirect::to(LOGIN_PATH))
    }
}

/// A logged-in administrator. Enforced under either access policy.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Principal);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(principal) = CurrentUser::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        if !principal.is_admin() {
            return Err(AppError::Forbidden.into_response());
        }
        Ok(AdminUser(principal))
    }
}
