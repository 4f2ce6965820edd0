//! Admin dashboard handlers.

use axum::{
    extract::{Path, Query, State},
    response::{Json, Redirect},
    routing::{get, post},
    Form, Router,
};
use uuid::Uuid;

use common::{AppResult, OptionExt};
use domain::ReservationView;

use super::forms::{AdminQuery, ReservationForm, RoleForm, UserForm};
use super::views::{AdminView, EditReservationView};
use crate::extractors::{AdminUser, ValidatedForm};
use crate::state::AppState;

const ADMIN_SUCCESS: &str = "/admin?success";

/// Create admin routes
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin", get(dashboard))
        .route("/admin/reservations/delete/:id", post(delete_reservation))
        .route(
            "/admin/reservations/edit/:id",
            get(edit_reservation).post(submit_edit_reservation),
        )
        .route("/admin/reservations/update/:id", post(update_reservation))
        .route("/admin/users/update/:id", post(update_user))
        .route("/admin/users/delete/:id", post(delete_user))
        .route("/admin/users/grant/:id", post(grant_role))
}

/// All reservations and all users
#[utoipa::path(
    get,
    path = "/admin",
    tag = "Admin",
    params(AdminQuery),
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Dashboard", body = AdminView),
        (status = 403, description = "Caller is not an administrator")
    )
)]
pub async fn dashboard(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Query(query): Query<AdminQuery>,
) -> AppResult<Json<AdminView>> {
    let reservations = state.services.reservations();
    let users = state.services.users();

    let listing = async {
        match query.date {
            Some(date) => reservations.list_by_date(date).await,
            None => reservations.list_all_sorted_by_title().await,
        }
    };
    let (reservations, users) = tokio::try_join!(listing, users.list_all())?;

    Ok(Json(AdminView {
        reservations: reservations.into_iter().map(ReservationView::from).collect(),
        users,
        date: query.date,
        success: query.success.is_some(),
    }))
}

/// Delete any reservation
#[utoipa::path(
    post,
    path = "/admin/reservations/delete/{id}",
    tag = "Admin",
    security(("session_cookie" = [])),
    params(("id" = Uuid, Path, description = "Reservation ID")),
    responses(
        (status = 303, description = "Deleted, redirected to /admin?success"),
        (status = 404, description = "Reservation not found")
    )
)]
pub async fn delete_reservation(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Redirect> {
    state
        .services
        .reservations()
        .delete_by_id(&admin, id)
        .await?;

    tracing::info!(reservation_id = %id, admin_id = %admin.user_id, "Reservation deleted by admin");
    Ok(Redirect::to(ADMIN_SUCCESS))
}

/// Edit page for any reservation
#[utoipa::path(
    get,
    path = "/admin/reservations/edit/{id}",
    tag = "Admin",
    security(("session_cookie" = [])),
    params(("id" = Uuid, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation and slot grid", body = EditReservationView),
        (status = 404, description = "Reservation not found")
    )
)]
pub async fn edit_reservation(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<EditReservationView>> {
    let reservation = state
        .services
        .reservations()
        .find_by_id(id)
        .await?
        .ok_or_not_found()?;

    Ok(Json(EditReservationView {
        reservation: ReservationView::from(reservation),
        time_slots: state.services.slots().generate_grid(),
    }))
}

/// Change any reservation. The owner is kept.
#[utoipa::path(
    post,
    path = "/admin/reservations/update/{id}",
    tag = "Admin",
    security(("session_cookie" = [])),
    params(("id" = Uuid, Path, description = "Reservation ID")),
    request_body(content = ReservationForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Updated, redirected to /admin?success"),
        (status = 400, description = "Invalid range or slot already taken"),
        (status = 404, description = "Reservation not found")
    )
)]
pub async fn update_reservation(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedForm(form): ValidatedForm<ReservationForm>,
) -> AppResult<Redirect> {
    let draft = form.into_draft()?;
    state
        .services
        .reservations()
        .update(&admin, id, draft)
        .await?;

    tracing::info!(reservation_id = %id, admin_id = %admin.user_id, "Reservation updated by admin");
    Ok(Redirect::to(ADMIN_SUCCESS))
}

/// Edit form submission, same as the update route
#[utoipa::path(
    post,
    path = "/admin/reservations/edit/{id}",
    tag = "Admin",
    security(("session_cookie" = [])),
    params(("id" = Uuid, Path, description = "Reservation ID")),
    request_body(content = ReservationForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Updated, redirected to /admin?success"),
        (status = 400, description = "Invalid range or slot already taken"),
        (status = 404, description = "Reservation not found")
    )
)]
pub async fn submit_edit_reservation(
    admin: AdminUser,
    state: State<AppState>,
    id: Path<Uuid>,
    form: ValidatedForm<ReservationForm>,
) -> AppResult<Redirect> {
    update_reservation(admin, state, id, form).await
}

/// Change a user's name and email
#[utoipa::path(
    post,
    path = "/admin/users/update/{id}",
    tag = "Admin",
    security(("session_cookie" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    request_body(content = UserForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Updated, redirected to /admin?success"),
        (status = 400, description = "Validation error or duplicate email"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedForm(form): ValidatedForm<UserForm>,
) -> AppResult<Redirect> {
    state
        .services
        .users()
        .update(id, form.name, form.email)
        .await?;

    tracing::info!(user_id = %id, admin_id = %admin.user_id, "User updated by admin");
    Ok(Redirect::to(ADMIN_SUCCESS))
}

/// Delete a user together with their reservations
#[utoipa::path(
    post,
    path = "/admin/users/delete/{id}",
    tag = "Admin",
    security(("session_cookie" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 303, description = "Deleted, redirected to /admin?success"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Redirect> {
    state.services.users().delete_by_id(id).await?;

    tracing::info!(user_id = %id, admin_id = %admin.user_id, "User deleted by admin");
    Ok(Redirect::to(ADMIN_SUCCESS))
}

/// Add a role to a user
#[utoipa::path(
    post,
    path = "/admin/users/grant/{id}",
    tag = "Admin",
    security(("session_cookie" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    request_body(content = RoleForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Granted, redirected to /admin?success"),
        (status = 400, description = "Unknown role"),
        (status = 404, description = "User not found")
    )
)]
pub async fn grant_role(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(form): Form<RoleForm>,
) -> AppResult<Redirect> {
    let role = form.role()?;
    state.services.users().grant_role(id, role).await?;

    tracing::info!(user_id = %id, admin_id = %admin.user_id, role = %role, "Role granted");
    Ok(Redirect::to(ADMIN_SUCCESS))
}
