//! Service layer: the session router that drives the registry.

pub mod session_router;

pub use session_router::{Outcome, RelayStats, SessionRouter};
