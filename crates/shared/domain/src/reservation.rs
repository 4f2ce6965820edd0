//! Reservation domain entity and its validated input.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{MAX_TITLE_LENGTH, MSG_START_BEFORE_END, MSG_TITLE_REQUIRED};
use crate::error::{DomainError, DomainResult};
use crate::slot::format_slot;

/// A booked interval for a facility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub title: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    /// Always the calendar date of `start_time`
    pub reservation_date: NaiveDate,
    pub note: Option<String>,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    pub fn start_label(&self) -> String {
        format_slot(self.start_time.time())
    }

    pub fn end_label(&self) -> String {
        format_slot(self.end_time.time())
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

/// Validated reservation input.
///
/// Construction enforces a non-empty title and `start < end`; the
/// reservation date is derived from the start and cannot be set directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationDraft {
    title: String,
    start_time: NaiveDateTime,
    end_time: NaiveDateTime,
    note: Option<String>,
}

impl ReservationDraft {
    pub fn new(
        title: &str,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        note: Option<String>,
    ) -> DomainResult<Self> {
        let title = title.trim();
        if title.is_empty() {
            return Err(DomainError::validation(MSG_TITLE_REQUIRED));
        }
        if title.chars().count() > MAX_TITLE_LENGTH {
            return Err(DomainError::validation(format!(
                "Facility title must be at most {} characters.",
                MAX_TITLE_LENGTH
            )));
        }

        let start_time = date.and_time(start);
        let end_time = date.and_time(end);
        if start_time >= end_time {
            return Err(DomainError::validation(MSG_START_BEFORE_END));
        }

        let note = note
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        Ok(Self {
            title: title.to_string(),
            start_time,
            end_time,
            note,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn start_time(&self) -> NaiveDateTime {
        self.start_time
    }

    pub fn end_time(&self) -> NaiveDateTime {
        self.end_time
    }

    pub fn reservation_date(&self) -> NaiveDate {
        self.start_time.date()
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }
}

/// Reservation as shown on pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReservationView {
    pub id: Uuid,
    #[cfg_attr(feature = "openapi", schema(example = "Pool"))]
    pub title: String,
    pub reservation_date: NaiveDate,
    #[cfg_attr(feature = "openapi", schema(example = "09:00"))]
    pub start_time: String,
    #[cfg_attr(feature = "openapi", schema(example = "10:00"))]
    pub end_time: String,
    pub note: Option<String>,
    pub user_id: Uuid,
}

impl From<Reservation> for ReservationView {
    fn from(reservation: Reservation) -> Self {
        Self {
            id: reservation.id,
            start_time: reservation.start_label(),
            end_time: reservation.end_label(),
            title: reservation.title,
            reservation_date: reservation.reservation_date,
            note: reservation.note,
            user_id: reservation.user_id,
        }
    }
}
