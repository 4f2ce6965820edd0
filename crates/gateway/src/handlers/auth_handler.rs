//! Landing, login, registration and logout handlers.

use axum::{
    extract::{Query, State},
    response::{Json, Redirect},
    routing::{get, post},
    Extension, Form, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use common::AppResult;
use domain::{Principal, Registration};

use super::forms::{FlashQuery, LoginForm, LoginQuery, RegisterForm};
use super::views::{HomeView, LoginView, RegisterView};
use crate::access::{AccessGate, HOME_PATH};
use crate::config::GatewayConfig;
use crate::extractors::ValidatedForm;
use crate::state::AppState;

/// Create auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/index", get(index))
        .route("/login", get(login_page).post(login))
        .route("/register", get(register_page))
        .route("/register/save", post(register))
        .route("/logout", get(logout).post(logout))
}

fn session_cookie(config: &GatewayConfig, token: String) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.cookie_secure)
        .build()
}

/// Landing page
#[utoipa::path(
    get,
    path = "/index",
    tag = "Pages",
    responses(
        (status = 200, description = "Landing page", body = HomeView)
    )
)]
pub async fn index(principal: Option<Extension<Principal>>) -> Json<HomeView> {
    let principal = principal.map(|Extension(principal)| principal);
    Json(HomeView::for_caller(principal.as_ref()))
}

/// Login page
#[utoipa::path(
    get,
    path = "/login",
    tag = "Authentication",
    params(LoginQuery),
    responses(
        (status = 200, description = "Login page", body = LoginView)
    )
)]
pub async fn login_page(Query(query): Query<LoginQuery>) -> Json<LoginView> {
    Json(LoginView {
        error: query.error.is_some(),
        logout: query.logout.is_some(),
    })
}

/// Authenticate and start a session
#[utoipa::path(
    post,
    path = "/login",
    tag = "Authentication",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Logged in, redirected to the landing area; or back to /login?error")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> AppResult<(CookieJar, Redirect)> {
    match state.auth.login(&form.email, &form.password).await {
        Ok(session) => {
            let landing = AccessGate::landing_for(&session.principal);
            tracing::info!(user_id = %session.principal.user_id, landing, "User logged in");
            let cookie = session_cookie(&state.config, session.token);
            Ok((jar.add(cookie), Redirect::to(landing)))
        }
        Err(e) if e.is_authentication_failure() => {
            tracing::warn!(email = %form.email, "Login rejected");
            Ok((jar, Redirect::to("/login?error")))
        }
        Err(e) => Err(e),
    }
}

/// Registration page
#[utoipa::path(
    get,
    path = "/register",
    tag = "Authentication",
    params(FlashQuery),
    responses(
        (status = 200, description = "Registration page", body = RegisterView)
    )
)]
pub async fn register_page(Query(query): Query<FlashQuery>) -> Json<RegisterView> {
    Json(RegisterView {
        success: query.success.is_some(),
    })
}

/// Create an account with the USER role
#[utoipa::path(
    post,
    path = "/register/save",
    tag = "Authentication",
    request_body(content = RegisterForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Registered, redirected to /register?success"),
        (status = 400, description = "Validation error or duplicate email")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedForm(form): ValidatedForm<RegisterForm>,
) -> AppResult<Redirect> {
    let user = state
        .services
        .users()
        .register(Registration::from(form))
        .await?;

    tracing::info!(user_id = %user.id, "User registered");
    Ok(Redirect::to("/register?success"))
}

/// End the session
#[utoipa::path(
    post,
    path = "/logout",
    tag = "Authentication",
    responses(
        (status = 303, description = "Session cookie cleared, redirected to /index")
    )
)]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    let cookie = Cookie::build((state.config.cookie_name.clone(), "")).path("/");
    (jar.remove(cookie), Redirect::to(HOME_PATH))
}
