//! Domain layer - Core business entities and value objects.
//!
//! Pure types and rules with no infrastructure dependencies: roles and
//! principals, users, reservations, the slot grid and password hashing.

pub mod constants;
pub mod error;
pub mod password;
pub mod principal;
pub mod reservation;
pub mod role;
pub mod slot;
pub mod user;

pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use password::Password;
pub use principal::Principal;
pub use reservation::{Reservation, ReservationDraft, ReservationView};
pub use role::Role;
pub use slot::{format_slot, BlockingPolicy, SlotGrid};
pub use user::{
    join_full_name, normalize_email, split_full_name, NewUser, Registration, RoleRecord, User,
    UserProfile,
};
