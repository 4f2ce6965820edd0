//! End-to-end page flows over the in-memory store.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use auth_service_lib::{AuthServiceConfig, Authenticator, CredentialResolver};
use booking_service_lib::repository::memory::MemoryStore;
use booking_service_lib::{HealthCheck, ServiceContainer, Services, SlotConfig};
use common::{AppError, AppResult};
use domain::{Role, MSG_SLOT_TAKEN};
use gateway_lib::{create_router, AccessPolicy, AppState, GatewayConfig};

struct StubDatabase(bool);

#[async_trait]
impl HealthCheck for StubDatabase {
    async fn ping(&self) -> AppResult<()> {
        if self.0 {
            Ok(())
        } else {
            Err(AppError::internal("connection refused"))
        }
    }
}

struct Harness {
    app: Router,
    services: Services,
}

fn harness_with(policy: AccessPolicy, healthy: bool) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let services = Services::from_repositories(
        store.clone(),
        store.clone(),
        store.clone(),
        &SlotConfig::default(),
    )
    .unwrap();

    let auth_config = AuthServiceConfig::new("a".repeat(48), 24).unwrap();
    let authenticator = Authenticator::new(
        Arc::new(CredentialResolver::new(store)),
        auth_config.jwt,
    );

    let config = GatewayConfig {
        access_policy: policy,
        ..GatewayConfig::default()
    };
    let state = AppState::new(
        Arc::new(services.clone()),
        Arc::new(authenticator),
        Arc::new(StubDatabase(healthy)),
        config,
    );

    Harness {
        app: create_router(state),
        services,
    }
}

fn harness() -> Harness {
    harness_with(AccessPolicy::RoleGated, true)
}

impl Harness {
    async fn get(&self, uri: &str, session: Option<&str>) -> Response<Body> {
        let mut request = Request::builder().method("GET").uri(uri);
        if let Some(session) = session {
            request = request.header(header::COOKIE, session);
        }
        self.app
            .clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn post(&self, uri: &str, form: &str, session: Option<&str>) -> Response<Body> {
        let mut request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(session) = session {
            request = request.header(header::COOKIE, session);
        }
        self.app
            .clone()
            .oneshot(request.body(Body::from(form.to_string())).unwrap())
            .await
            .unwrap()
    }

    async fn register(&self, first: &str, email: &str, password: &str) {
        let form = format!(
            "firstName={}&lastName=Tester&email={}&password={}",
            first, email, password
        );
        let response = self.post("/register/save", &form, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/register?success");
    }

    /// Log in and return the `Cookie` header value for the session.
    async fn login(&self, email: &str, password: &str) -> (String, String) {
        let form = format!("email={}&password={}", email, password);
        let response = self.post("/login", &form, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("session cookie")
            .to_str()
            .unwrap()
            .to_string();
        assert!(set_cookie.contains("HttpOnly"));
        let cookie = set_cookie.split(';').next().unwrap().to_string();

        (cookie, location(&response))
    }

    async fn admin_session(&self) -> String {
        self.register("Ada", "ada%40x.cz", "root").await;
        let admin = self
            .services
            .users()
            .find_by_email("ada@x.cz")
            .await
            .unwrap()
            .unwrap();
        self.services
            .users()
            .grant_role(admin.id, Role::Admin)
            .await
            .unwrap();
        self.login("ada%40x.cz", "root").await.0
    }
}

fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .map(|value| value.to_str().unwrap().to_string())
        .unwrap_or_default()
}

async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_anonymous_visitor_is_sent_to_login() {
    let h = harness();

    let response = h.get("/reservations", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    let response = h.get("/admin", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_public_pages_need_no_session() {
    let h = harness();

    let response = h.get("/index", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["authenticated"], false);

    let response = h.get("/login?error", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["error"], true);

    let response = h.get("/api-docs/openapi.json", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_register_then_login_lands_on_reservations() {
    let h = harness();
    h.register("Jana", "Jana%40X.cz", "pw1").await;

    let (cookie, landing) = h.login("jana%40x.cz", "pw1").await;
    assert_eq!(landing, "/reservations");
    assert!(cookie.starts_with("SESSION="));

    let response = h.get("/index", Some(&cookie)).await;
    let home = body_json(response).await;
    assert_eq!(home["authenticated"], true);
    assert_eq!(home["name"], "Jana Tester");
}

#[tokio::test]
async fn test_duplicate_registration_is_rejected() {
    let h = harness();
    h.register("Jana", "jana%40x.cz", "pw1").await;

    let response = h
        .post(
            "/register/save",
            "firstName=J&lastName=N&email=JANA%40x.cz&password=pw2",
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_bad_password_redirects_with_error_flag() {
    let h = harness();
    h.register("Jana", "jana%40x.cz", "pw1").await;

    let response = h.post("/login", "email=jana%40x.cz&password=nope", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?error");
    assert!(response.headers().get(header::SET_COOKIE).is_none());

    let response = h.post("/login", "username=ghost%40x.cz&password=pw1", None).await;
    assert_eq!(location(&response), "/login?error");
}

#[tokio::test]
async fn test_tampered_cookie_counts_as_anonymous() {
    let h = harness();

    let response = h.get("/reservations", Some("SESSION=not-a-token")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_user_cannot_open_admin_dashboard() {
    let h = harness();
    h.register("Jana", "jana%40x.cz", "pw1").await;
    let (cookie, _) = h.login("jana%40x.cz", "pw1").await;

    let response = h.get("/admin", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_booking_removes_slot_from_availability() {
    let h = harness();
    h.register("Jana", "jana%40x.cz", "pw1").await;
    let (cookie, _) = h.login("jana%40x.cz", "pw1").await;

    let response = h
        .post(
            "/reservations/save",
            "title=Pool&date=2024-06-01&startTime=09:00&endTime=10:00",
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/reservations");

    let response = h
        .get(
            "/reservations/availableSlots?title=Pool&date=2024-06-01",
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let slots: Vec<String> = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(slots.len(), 23);
    assert!(!slots.contains(&"09:00".to_string()));
    assert!(slots.contains(&"09:30".to_string()));

    let response = h.get("/reservations", Some(&cookie)).await;
    let page = body_json(response).await;
    assert_eq!(page["reservations"].as_array().unwrap().len(), 1);
    assert_eq!(page["reservations"][0]["start_time"], "09:00");
    assert_eq!(page["time_slots"].as_array().unwrap().len(), 24);
}

#[tokio::test]
async fn test_taken_slot_is_reported() {
    let h = harness();
    h.register("Jana", "jana%40x.cz", "pw1").await;
    h.register("Petr", "petr%40x.cz", "pw2").await;
    let (jana, _) = h.login("jana%40x.cz", "pw1").await;
    let (petr, _) = h.login("petr%40x.cz", "pw2").await;

    let form = "title=Pool&date=2024-06-01&startTime=09:00&endTime=10:00";
    let response = h.post("/reservations/save", form, Some(&jana)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = h.post("/reservations/save", form, Some(&petr)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["message"], MSG_SLOT_TAKEN);
}

#[tokio::test]
async fn test_inverted_range_is_rejected() {
    let h = harness();
    h.register("Jana", "jana%40x.cz", "pw1").await;
    let (cookie, _) = h.login("jana%40x.cz", "pw1").await;

    let response = h
        .post(
            "/reservations/save",
            "title=Pool&date=2024-06-01&startTime=10:00&endTime=09:00",
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_user_cannot_delete_someone_elses_reservation() {
    let h = harness();
    h.register("Jana", "jana%40x.cz", "pw1").await;
    h.register("Petr", "petr%40x.cz", "pw2").await;
    let (jana, _) = h.login("jana%40x.cz", "pw1").await;
    let (petr, _) = h.login("petr%40x.cz", "pw2").await;

    h.post(
        "/reservations/save",
        "title=Gym&date=2024-06-02&startTime=18:00&endTime=19:00",
        Some(&jana),
    )
    .await;
    let page = body_json(h.get("/reservations", Some(&jana)).await).await;
    let id = page["reservations"][0]["id"].as_str().unwrap().to_string();

    let response = h
        .post(&format!("/reservations/delete/{}", id), "", Some(&petr))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = h
        .post(&format!("/reservations/delete/{}", id), "", Some(&jana))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/reservations");
}

#[tokio::test]
async fn test_admin_lands_on_dashboard_and_sees_everyone() {
    let h = harness();
    h.register("Jana", "jana%40x.cz", "pw1").await;
    let (jana, _) = h.login("jana%40x.cz", "pw1").await;
    h.post(
        "/reservations/save",
        "title=Pool&date=2024-06-01&startTime=09:00&endTime=10:00",
        Some(&jana),
    )
    .await;

    let admin = h.admin_session().await;
    let (_, landing) = h.login("ada%40x.cz", "root").await;
    assert_eq!(landing, "/admin");

    let response = h.get("/admin", Some(&admin)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let dashboard = body_json(response).await;
    assert_eq!(dashboard["users"].as_array().unwrap().len(), 2);
    assert_eq!(dashboard["reservations"].as_array().unwrap().len(), 1);

    let response = h.get("/admin?date=2024-06-02", Some(&admin)).await;
    let dashboard = body_json(response).await;
    assert!(dashboard["reservations"].as_array().unwrap().is_empty());

    // Admins may also use the reservation pages
    let response = h.get("/reservations", Some(&admin)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_admin_grants_role_and_deletes_user() {
    let h = harness();
    h.register("Jana", "jana%40x.cz", "pw1").await;
    let admin = h.admin_session().await;
    let jana = h
        .services
        .users()
        .find_by_email("jana@x.cz")
        .await
        .unwrap()
        .unwrap();

    let response = h
        .post(
            &format!("/admin/users/grant/{}", jana.id),
            "role=admin",
            Some(&admin),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin?success");
    let (_, landing) = h.login("jana%40x.cz", "pw1").await;
    assert_eq!(landing, "/admin");

    let response = h
        .post(&format!("/admin/users/delete/{}", jana.id), "", Some(&admin))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(h
        .services
        .users()
        .find_by_email("jana@x.cz")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_deleted_user_session_cannot_book() {
    let h = harness();
    h.register("Jana", "jana%40x.cz", "pw1").await;
    let (jana, _) = h.login("jana%40x.cz", "pw1").await;
    let admin = h.admin_session().await;
    let id = h
        .services
        .users()
        .find_by_email("jana@x.cz")
        .await
        .unwrap()
        .unwrap()
        .id;

    let response = h
        .post(&format!("/admin/users/delete/{}", id), "", Some(&admin))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = h
        .post(
            "/reservations/save",
            "title=Pool&date=2024-06-01&startTime=09:00&endTime=10:00",
            Some(&jana),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(h
        .services
        .reservations()
        .list_all()
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_open_policy_still_checks_handlers() {
    let h = harness_with(AccessPolicy::Open, true);

    // Gate lets the request through, the handler still needs a caller
    let response = h.get("/reservations", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    h.register("Jana", "jana%40x.cz", "pw1").await;
    let (cookie, _) = h.login("jana%40x.cz", "pw1").await;
    let response = h.get("/admin", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let h = harness();
    h.register("Jana", "jana%40x.cz", "pw1").await;
    let (cookie, _) = h.login("jana%40x.cz", "pw1").await;

    let response = h.post("/logout", "", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/index");
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with("SESSION="));
    assert!(set_cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_health_reports_database_state() {
    let response = harness().get("/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "healthy");

    let response = harness_with(AccessPolicy::RoleGated, false)
        .get("/health", None)
        .await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["services"]["database"]["status"], "unhealthy");
}
