//! Room fan-out over a registry snapshot.
//!
//! [`RoomBroadcaster`] borrows the registry for the duration of one
//! fan-out. Because the caller holds the registry lock while borrowing, the
//! membership seen by a broadcast is consistent for the whole delivery.

use tokio::sync::mpsc::error::TrySendError;

use super::connection::Payload;
use super::{ConnectionId, ConnectionRegistry};

/// Delivers encoded payloads to the members of a room.
#[derive(Debug, Clone, Copy)]
pub struct RoomBroadcaster<'a> {
    registry: &'a ConnectionRegistry,
}

impl<'a> RoomBroadcaster<'a> {
    /// Creates a broadcaster over `registry`.
    #[must_use]
    pub const fn new(registry: &'a ConnectionRegistry) -> Self {
        Self { registry }
    }

    /// Sends `payload` to every member of `room` except `sender`.
    ///
    /// Members whose transport is not writable are skipped and left in the
    /// registry; only a close notification removes them. Returns the number
    /// of members the payload was queued for.
    pub fn broadcast(&self, room: &str, payload: &Payload, sender: Option<ConnectionId>) -> usize {
        let mut delivered = 0;
        for member in self.registry.members_of(room, sender) {
            let handle = member.handle();
            if !handle.is_writable() {
                tracing::debug!(conn = %member.id(), room, "skipped delivery: not writable");
                continue;
            }
            match handle.send(Payload::clone(payload)) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::debug!(conn = %member.id(), room, "skipped delivery: queue full");
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::debug!(conn = %member.id(), room, "skipped delivery: transport closed");
                }
            }
        }
        delivered
    }
}
