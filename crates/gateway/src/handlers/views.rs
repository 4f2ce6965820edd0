//! View models rendered by the page handlers.

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use domain::{Principal, ReservationView, UserProfile};

use crate::access::AccessGate;

/// Landing page
#[derive(Debug, Serialize, ToSchema)]
pub struct HomeView {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Where the logged-in caller is sent after login
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landing: Option<String>,
}

impl HomeView {
    pub fn for_caller(principal: Option<&Principal>) -> Self {
        match principal {
            Some(principal) => Self {
                authenticated: true,
                name: Some(principal.name.clone()),
                landing: Some(AccessGate::landing_for(principal).to_string()),
            },
            None => Self {
                authenticated: false,
                name: None,
                landing: None,
            },
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginView {
    pub error: bool,
    pub logout: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterView {
    pub success: bool,
}

/// The caller's own reservations and the booking grid
#[derive(Debug, Serialize, ToSchema)]
pub struct ReservationsView {
    pub reservations: Vec<ReservationView>,
    #[schema(example = json!(["08:00", "08:30"]))]
    pub time_slots: Vec<String>,
    pub success: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EditReservationView {
    pub reservation: ReservationView,
    pub time_slots: Vec<String>,
}

/// Admin dashboard
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminView {
    pub reservations: Vec<ReservationView>,
    pub users: Vec<UserProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub success: bool,
}
