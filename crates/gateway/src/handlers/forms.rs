//! Form payloads and query strings accepted by the handlers.

use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use common::{AppError, AppResult};
use domain::{Registration, ReservationDraft, Role, SLOT_LABEL_FORMAT};

/// Login form. `username` is accepted as an alias of `email`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginForm {
    #[serde(alias = "username")]
    #[schema(example = "jana@x.cz")]
    pub email: String,
    #[schema(example = "pw1")]
    pub password: String,
}

/// Registration form
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForm {
    #[validate(length(min = 1, message = "First name is required."))]
    #[schema(example = "Jana")]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required."))]
    #[schema(example = "Nová")]
    pub last_name: String,
    #[validate(email(message = "Enter a valid email address."))]
    #[schema(example = "jana@x.cz")]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required."))]
    #[schema(example = "pw1")]
    pub password: String,
}

impl From<RegisterForm> for Registration {
    fn from(form: RegisterForm) -> Self {
        Registration {
            first_name: form.first_name,
            last_name: form.last_name,
            email: form.email,
            password: form.password,
        }
    }
}

/// Reservation create/update form
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReservationForm {
    #[validate(length(min = 1, message = "Facility title is required."))]
    #[schema(example = "Pool")]
    pub title: String,
    #[schema(value_type = String, format = Date, example = "2024-06-01")]
    pub date: NaiveDate,
    #[schema(example = "09:00")]
    pub start_time: String,
    #[schema(example = "10:00")]
    pub end_time: String,
    #[serde(default)]
    pub note: Option<String>,
}

/// Accepts `HH:MM` and `HH:MM:SS`.
fn parse_time(raw: &str) -> AppResult<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, SLOT_LABEL_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| AppError::validation(format!("Invalid time '{}'.", raw)))
}

impl ReservationForm {
    pub fn into_draft(self) -> AppResult<ReservationDraft> {
        let start = parse_time(&self.start_time)?;
        let end = parse_time(&self.end_time)?;
        Ok(ReservationDraft::new(
            &self.title,
            self.date,
            start,
            end,
            self.note,
        )?)
    }
}

/// Admin edit of a user's name and email
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UserForm {
    #[validate(length(min = 1, message = "Name is required."))]
    #[schema(example = "Jana Nová")]
    pub name: String,
    #[validate(email(message = "Enter a valid email address."))]
    #[schema(example = "jana@x.cz")]
    pub email: String,
}

/// Role grant
#[derive(Debug, Deserialize, ToSchema)]
pub struct RoleForm {
    #[schema(example = "ADMIN")]
    pub role: String,
}

impl RoleForm {
    pub fn role(&self) -> AppResult<Role> {
        Ok(self.role.parse::<Role>()?)
    }
}

/// `?error` / `?logout` flags of the login page
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LoginQuery {
    pub error: Option<String>,
    pub logout: Option<String>,
}

/// `?success` flag shown after a completed action
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FlashQuery {
    pub success: Option<String>,
}

/// Availability lookup
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SlotQuery {
    /// Facility title
    pub title: String,
    #[param(value_type = String, format = Date, example = "2024-06-01")]
    pub date: NaiveDate,
}

/// Admin dashboard filter
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdminQuery {
    #[param(value_type = Option<String>, format = Date)]
    pub date: Option<NaiveDate>,
    pub success: Option<String>,
}
