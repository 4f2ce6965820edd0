//! SeaORM entities.

pub mod reservation;
pub mod role;
pub mod user;
pub mod user_role;
