//! Service container - central access to the booking managers.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::{
    ReservationManager, ReservationService, SlotAvailability, SlotService, UserManager,
    UserService,
};
use crate::config::{BookingServiceConfig, SlotConfig};
use crate::repository::{
    ReservationRepository, ReservationStore, RoleRepository, RoleStore, UserRepository, UserStore,
};
use common::AppResult;

/// Service container trait for dependency injection.
pub trait ServiceContainer: Send + Sync {
    fn users(&self) -> Arc<dyn UserService>;

    fn reservations(&self) -> Arc<dyn ReservationService>;

    fn slots(&self) -> Arc<dyn SlotService>;
}

/// Concrete implementation of [`ServiceContainer`].
#[derive(Clone)]
pub struct Services {
    user_service: Arc<dyn UserService>,
    reservation_service: Arc<dyn ReservationService>,
    slot_service: Arc<dyn SlotService>,
}

impl Services {
    pub fn new(
        user_service: Arc<dyn UserService>,
        reservation_service: Arc<dyn ReservationService>,
        slot_service: Arc<dyn SlotService>,
    ) -> Self {
        Self {
            user_service,
            reservation_service,
            slot_service,
        }
    }

    /// Wire the stores and managers over one connection pool.
    pub fn from_connection(
        db: DatabaseConnection,
        config: &BookingServiceConfig,
    ) -> AppResult<Self> {
        Self::from_repositories(
            Arc::new(UserStore::new(db.clone())),
            Arc::new(RoleStore::new(db.clone())),
            Arc::new(ReservationStore::new(db)),
            &config.slots,
        )
    }

    /// Wire the managers over any repository implementations.
    pub fn from_repositories(
        users: Arc<dyn UserRepository>,
        roles: Arc<dyn RoleRepository>,
        reservations: Arc<dyn ReservationRepository>,
        slots: &SlotConfig,
    ) -> AppResult<Self> {
        let grid = slots.grid()?;
        let policy = slots.blocking;

        Ok(Self {
            user_service: Arc::new(UserManager::new(users.clone(), roles)),
            reservation_service: Arc::new(ReservationManager::new(
                users,
                reservations.clone(),
                policy,
            )),
            slot_service: Arc::new(SlotAvailability::new(reservations, grid, policy)),
        })
    }
}

impl ServiceContainer for Services {
    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn reservations(&self) -> Arc<dyn ReservationService> {
        self.reservation_service.clone()
    }

    fn slots(&self) -> Arc<dyn SlotService> {
        self.slot_service.clone()
    }
}
