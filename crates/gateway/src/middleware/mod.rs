//! Middleware for sessions and access control.

mod session;

pub use session::{access_gate_middleware, session_middleware};
