//! OpenAPI documentation.

use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};

use crate::handlers::forms::{LoginForm, RegisterForm, ReservationForm, RoleForm, UserForm};
use crate::handlers::health_handler::{HealthResponse, ServiceHealth, ServiceStatus};
use crate::handlers::views::{
    AdminView, EditReservationView, HomeView, LoginView, RegisterView, ReservationsView,
};
use domain::{ReservationView, Role, UserProfile};

/// API documentation struct.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::auth_handler::index,
        crate::handlers::auth_handler::login_page,
        crate::handlers::auth_handler::login,
        crate::handlers::auth_handler::register_page,
        crate::handlers::auth_handler::register,
        crate::handlers::auth_handler::logout,
        crate::handlers::reservation_handler::list_reservations,
        crate::handlers::reservation_handler::save_reservation,
        crate::handlers::reservation_handler::available_slots,
        crate::handlers::reservation_handler::delete_reservation,
        crate::handlers::reservation_handler::edit_reservation,
        crate::handlers::reservation_handler::update_reservation,
        crate::handlers::admin_handler::dashboard,
        crate::handlers::admin_handler::delete_reservation,
        crate::handlers::admin_handler::edit_reservation,
        crate::handlers::admin_handler::update_reservation,
        crate::handlers::admin_handler::submit_edit_reservation,
        crate::handlers::admin_handler::update_user,
        crate::handlers::admin_handler::delete_user,
        crate::handlers::admin_handler::grant_role,
        crate::handlers::health_handler::health_check,
    ),
    components(
        schemas(
            LoginForm,
            RegisterForm,
            ReservationForm,
            UserForm,
            RoleForm,
            HomeView,
            LoginView,
            RegisterView,
            ReservationsView,
            EditReservationView,
            AdminView,
            ReservationView,
            UserProfile,
            Role,
            HealthResponse,
            ServiceStatus,
            ServiceHealth,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Pages", description = "Public pages"),
        (name = "Authentication", description = "Login, registration and logout"),
        (name = "Reservations", description = "Booking facility slots"),
        (name = "Admin", description = "Managing all reservations and users"),
        (name = "Health", description = "Readiness probe"),
    )
)]
pub struct ApiDoc;

/// Security scheme modifier.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("SESSION"))),
            );
        }
    }
}
