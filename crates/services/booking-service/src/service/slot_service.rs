//! Slot availability engine.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;

use common::AppResult;
use domain::{BlockingPolicy, SlotGrid};

use crate::repository::ReservationRepository;

#[async_trait]
pub trait SlotService: Send + Sync {
    /// The full daily grid of slot labels
    fn generate_grid(&self) -> Vec<String>;

    /// Grid labels still bookable for `title` on `date`
    async fn available_slots(&self, title: &str, date: NaiveDate) -> AppResult<Vec<String>>;
}

pub struct SlotAvailability {
    reservations: Arc<dyn ReservationRepository>,
    grid: SlotGrid,
    policy: BlockingPolicy,
}

impl SlotAvailability {
    pub fn new(
        reservations: Arc<dyn ReservationRepository>,
        grid: SlotGrid,
        policy: BlockingPolicy,
    ) -> Self {
        Self {
            reservations,
            grid,
            policy,
        }
    }
}

#[async_trait]
impl SlotService for SlotAvailability {
    fn generate_grid(&self) -> Vec<String> {
        self.grid.labels()
    }

    async fn available_slots(&self, title: &str, date: NaiveDate) -> AppResult<Vec<String>> {
        let booked = self
            .reservations
            .find_by_date_and_title(date, title.trim().to_string())
            .await?;

        Ok(self.grid.available(date, &booked, self.policy))
    }
}
