//! WebSocket layer: envelope codec, upgrade handler, connection loop.
//!
//! The endpoint at `/ws` (also served at `/`) carries the room relay
//! protocol described in [`messages`].

pub mod connection;
pub mod handler;
pub mod messages;
