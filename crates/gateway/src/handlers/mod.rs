//! HTTP request handlers.

pub mod admin_handler;
pub mod auth_handler;
pub mod forms;
pub mod health_handler;
pub mod reservation_handler;
pub mod views;

pub use admin_handler::admin_routes;
pub use auth_handler::auth_routes;
pub use health_handler::health_routes;
pub use reservation_handler::reservation_routes;
