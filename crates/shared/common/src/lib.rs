//! Common utilities shared across the workspace crates.
//!
//! This crate provides:
//! - Unified error handling and its HTTP mapping
//! - Environment-driven configuration helpers

pub mod config;
pub mod error;

pub use config::*;
pub use error::{AppError, AppResult, OptionExt};
