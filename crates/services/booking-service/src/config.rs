//! Booking service configuration.

use common::{env_parse, AppError, AppResult, DatabaseConfig};
use domain::{
    BlockingPolicy, SlotGrid, DEFAULT_DAY_END_HOUR, DEFAULT_DAY_START_HOUR, DEFAULT_SLOT_MINUTES,
};

/// Daily booking window and slot rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotConfig {
    pub day_start_hour: u32,
    pub day_end_hour: u32,
    pub step_minutes: u32,
    pub blocking: BlockingPolicy,
}

impl SlotConfig {
    pub fn from_env() -> AppResult<Self> {
        let config = Self {
            day_start_hour: env_parse(&["SLOT_DAY_START_HOUR"], DEFAULT_DAY_START_HOUR)?,
            day_end_hour: env_parse(&["SLOT_DAY_END_HOUR"], DEFAULT_DAY_END_HOUR)?,
            step_minutes: env_parse(&["SLOT_STEP_MINUTES"], DEFAULT_SLOT_MINUTES)?,
            blocking: env_parse(&["SLOT_BLOCKING"], BlockingPolicy::default())?,
        };
        // Fail at startup rather than on the first availability query
        config.grid()?;
        Ok(config)
    }

    pub fn grid(&self) -> AppResult<SlotGrid> {
        SlotGrid::new(self.day_start_hour, self.day_end_hour, self.step_minutes)
            .map_err(|e| AppError::config(e.to_string()))
    }
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            day_start_hour: DEFAULT_DAY_START_HOUR,
            day_end_hour: DEFAULT_DAY_END_HOUR,
            step_minutes: DEFAULT_SLOT_MINUTES,
            blocking: BlockingPolicy::default(),
        }
    }
}

/// Booking service configuration.
#[derive(Debug, Clone, Default)]
pub struct BookingServiceConfig {
    pub database: DatabaseConfig,
    pub slots: SlotConfig,
}

impl BookingServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> AppResult<Self> {
        Ok(Self {
            database: DatabaseConfig::from_env()?,
            slots: SlotConfig::from_env()?,
        })
    }
}
