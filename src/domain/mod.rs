//! Domain layer: connection identity, the registry, and room fan-out.
//!
//! Rooms have no entity of their own. A room is the set of registry
//! entries whose `room` field holds the same string.

pub mod broadcaster;
pub mod connection;
pub mod connection_id;
pub mod names;
pub mod registry;

pub use broadcaster::RoomBroadcaster;
pub use connection::{Connection, ConnectionHandle, Payload};
pub use connection_id::ConnectionId;
pub use names::NameSequence;
pub use registry::ConnectionRegistry;
