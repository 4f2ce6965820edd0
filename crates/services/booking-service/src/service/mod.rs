//! Service layer - business logic over the repositories.

mod container;
mod reservation_service;
mod slot_service;
mod user_service;

pub use container::{ServiceContainer, Services};
pub use reservation_service::{ReservationManager, ReservationService};
pub use slot_service::{SlotAvailability, SlotService};
pub use user_service::{UserManager, UserService};
