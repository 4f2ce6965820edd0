//! Daily slot grid and the rules for which slots a reservation occupies.

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_DAY_END_HOUR, DEFAULT_DAY_START_HOUR, DEFAULT_SLOT_MINUTES, SLOT_LABEL_FORMAT,
};
use crate::error::{DomainError, DomainResult};
use crate::reservation::Reservation;

/// Format a time of day as a slot label (`HH:MM`).
pub fn format_slot(time: NaiveTime) -> String {
    time.format(SLOT_LABEL_FORMAT).to_string()
}

/// Which grid slots an existing reservation takes away.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockingPolicy {
    /// Only the slot whose label equals the reservation's start time.
    #[default]
    Start,
    /// Every slot overlapping `[start, end)`.
    Overlap,
}

impl BlockingPolicy {
    /// Whether a reservation spanning `[start, end)` blocks the slot
    /// `[slot_start, slot_end)`.
    pub fn blocks(
        self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        slot_start: NaiveDateTime,
        slot_end: NaiveDateTime,
    ) -> bool {
        match self {
            BlockingPolicy::Start => format_slot(start.time()) == format_slot(slot_start.time()),
            BlockingPolicy::Overlap => slot_start < end && start < slot_end,
        }
    }

    /// Whether two reservations of the same facility on the same day clash.
    pub fn collides(
        self,
        existing: (NaiveDateTime, NaiveDateTime),
        candidate: (NaiveDateTime, NaiveDateTime),
    ) -> bool {
        match self {
            BlockingPolicy::Start => {
                format_slot(existing.0.time()) == format_slot(candidate.0.time())
            }
            BlockingPolicy::Overlap => candidate.0 < existing.1 && existing.0 < candidate.1,
        }
    }
}

impl FromStr for BlockingPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" => Ok(BlockingPolicy::Start),
            "overlap" => Ok(BlockingPolicy::Overlap),
            other => Err(DomainError::validation(format!(
                "Unknown slot blocking policy '{}', expected 'start' or 'overlap'",
                other
            ))),
        }
    }
}

impl fmt::Display for BlockingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockingPolicy::Start => f.write_str("start"),
            BlockingPolicy::Overlap => f.write_str("overlap"),
        }
    }
}

/// Fixed daily booking window divided into equal slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotGrid {
    start_minute: u32,
    end_minute: u32,
    step_minutes: u32,
}

impl SlotGrid {
    /// Window from `start_hour` inclusive to `end_hour` exclusive.
    pub fn new(start_hour: u32, end_hour: u32, step_minutes: u32) -> DomainResult<Self> {
        if end_hour > 24 || start_hour >= end_hour {
            return Err(DomainError::validation(format!(
                "Invalid booking window {}:00-{}:00",
                start_hour, end_hour
            )));
        }
        if step_minutes == 0 || step_minutes > (end_hour - start_hour) * 60 {
            return Err(DomainError::validation(format!(
                "Invalid slot length of {} minutes",
                step_minutes
            )));
        }

        Ok(Self {
            start_minute: start_hour * 60,
            end_minute: end_hour * 60,
            step_minutes,
        })
    }

    pub fn step(&self) -> Duration {
        Duration::minutes(i64::from(self.step_minutes))
    }

    /// Slot start times in increasing order.
    pub fn times(&self) -> Vec<NaiveTime> {
        (self.start_minute..self.end_minute)
            .step_by(self.step_minutes as usize)
            .filter_map(|minute| NaiveTime::from_num_seconds_from_midnight_opt(minute * 60, 0))
            .collect()
    }

    /// Slot labels, e.g. `08:00`, `08:30`, ... `19:30`.
    pub fn labels(&self) -> Vec<String> {
        self.times().into_iter().map(format_slot).collect()
    }

    /// Labels of `date` left free after removing what `reservations` block.
    pub fn available(
        &self,
        date: NaiveDate,
        reservations: &[Reservation],
        policy: BlockingPolicy,
    ) -> Vec<String> {
        let step = self.step();
        self.times()
            .into_iter()
            .filter(|time| {
                let slot_start = date.and_time(*time);
                let slot_end = slot_start + step;
                !reservations.iter().any(|r| {
                    policy.blocks(r.start_time, r.end_time, slot_start, slot_end)
                })
            })
            .map(format_slot)
            .collect()
    }
}

impl Default for SlotGrid {
    fn default() -> Self {
        Self {
            start_minute: DEFAULT_DAY_START_HOUR * 60,
            end_minute: DEFAULT_DAY_END_HOUR * 60,
            step_minutes: DEFAULT_SLOT_MINUTES,
        }
    }
}
