//! Reservation handlers for logged-in users.

use axum::{
    extract::{Path, Query, State},
    response::{Json, Redirect},
    routing::{get, post},
    Router,
};
use uuid::Uuid;

use common::{AppError, AppResult, OptionExt};
use domain::ReservationView;

use super::forms::{FlashQuery, ReservationForm, SlotQuery};
use super::views::{EditReservationView, ReservationsView};
use crate::access::RESERVATIONS_PATH;
use crate::extractors::{CurrentUser, ValidatedForm};
use crate::state::AppState;

/// Create reservation routes
pub fn reservation_routes() -> Router<AppState> {
    Router::new()
        .route("/reservations", get(list_reservations))
        .route("/reservations/save", post(save_reservation))
        .route("/reservations/availableSlots", get(available_slots))
        .route("/reservations/delete/:id", post(delete_reservation))
        .route("/reservations/edit/:id", get(edit_reservation))
        .route("/reservations/update/:id", post(update_reservation))
}

/// The caller's reservations and the slot grid
#[utoipa::path(
    get,
    path = "/reservations",
    tag = "Reservations",
    params(FlashQuery),
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Own reservations", body = ReservationsView),
        (status = 303, description = "Not logged in, redirected to /login")
    )
)]
pub async fn list_reservations(
    CurrentUser(principal): CurrentUser,
    State(state): State<AppState>,
    Query(query): Query<FlashQuery>,
) -> AppResult<Json<ReservationsView>> {
    let reservations = state
        .services
        .reservations()
        .list_for_user(principal.user_id)
        .await?;

    Ok(Json(ReservationsView {
        reservations: reservations.into_iter().map(ReservationView::from).collect(),
        time_slots: state.services.slots().generate_grid(),
        success: query.success.is_some(),
    }))
}

/// Book a slot
#[utoipa::path(
    post,
    path = "/reservations/save",
    tag = "Reservations",
    security(("session_cookie" = [])),
    request_body(content = ReservationForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Booked, redirected to /reservations"),
        (status = 400, description = "Invalid range or slot already taken")
    )
)]
pub async fn save_reservation(
    CurrentUser(principal): CurrentUser,
    State(state): State<AppState>,
    ValidatedForm(form): ValidatedForm<ReservationForm>,
) -> AppResult<Redirect> {
    let draft = form.into_draft()?;
    let reservation = state
        .services
        .reservations()
        .create(&principal, draft)
        .await?;

    tracing::info!(
        reservation_id = %reservation.id,
        user_id = %principal.user_id,
        title = %reservation.title,
        "Reservation created"
    );
    Ok(Redirect::to(RESERVATIONS_PATH))
}

/// Free start labels for a facility and day
#[utoipa::path(
    get,
    path = "/reservations/availableSlots",
    tag = "Reservations",
    params(SlotQuery),
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Free start labels in grid order", body = Vec<String>,
            example = json!(["08:00", "08:30", "09:30"]))
    )
)]
pub async fn available_slots(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    Query(query): Query<SlotQuery>,
) -> AppResult<Json<Vec<String>>> {
    let slots = state
        .services
        .slots()
        .available_slots(&query.title, query.date)
        .await?;
    Ok(Json(slots))
}

/// Cancel one of the caller's reservations
#[utoipa::path(
    post,
    path = "/reservations/delete/{id}",
    tag = "Reservations",
    security(("session_cookie" = [])),
    params(("id" = Uuid, Path, description = "Reservation ID")),
    responses(
        (status = 303, description = "Deleted, redirected to /reservations"),
        (status = 403, description = "Reservation belongs to someone else"),
        (status = 404, description = "Reservation not found")
    )
)]
pub async fn delete_reservation(
    CurrentUser(principal): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Redirect> {
    state
        .services
        .reservations()
        .delete_by_id(&principal, id)
        .await?;

    tracing::info!(reservation_id = %id, user_id = %principal.user_id, "Reservation deleted");
    Ok(Redirect::to(RESERVATIONS_PATH))
}

/// Reservation edit page
#[utoipa::path(
    get,
    path = "/reservations/edit/{id}",
    tag = "Reservations",
    security(("session_cookie" = [])),
    params(("id" = Uuid, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation and slot grid", body = EditReservationView),
        (status = 403, description = "Reservation belongs to someone else"),
        (status = 404, description = "Reservation not found")
    )
)]
pub async fn edit_reservation(
    CurrentUser(principal): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<EditReservationView>> {
    let reservation = state
        .services
        .reservations()
        .find_by_id(id)
        .await?
        .ok_or_not_found()?;

    if !principal.owns_or_admin(reservation.user_id) {
        return Err(AppError::Forbidden);
    }

    Ok(Json(EditReservationView {
        reservation: ReservationView::from(reservation),
        time_slots: state.services.slots().generate_grid(),
    }))
}

/// Change one of the caller's reservations
#[utoipa::path(
    post,
    path = "/reservations/update/{id}",
    tag = "Reservations",
    security(("session_cookie" = [])),
    params(("id" = Uuid, Path, description = "Reservation ID")),
    request_body(content = ReservationForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Updated, redirected to /reservations?success"),
        (status = 400, description = "Invalid range or slot already taken"),
        (status = 403, description = "Reservation belongs to someone else"),
        (status = 404, description = "Reservation not found")
    )
)]
pub async fn update_reservation(
    CurrentUser(principal): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedForm(form): ValidatedForm<ReservationForm>,
) -> AppResult<Redirect> {
    let draft = form.into_draft()?;
    state
        .services
        .reservations()
        .update(&principal, id, draft)
        .await?;

    tracing::info!(reservation_id = %id, user_id = %principal.user_id, "Reservation updated");
    Ok(Redirect::to("/reservations?success"))
}
