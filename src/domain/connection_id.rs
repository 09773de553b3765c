//! Transport-instance identity.
//!
//! [`ConnectionId`] is a newtype wrapper around [`uuid::Uuid`] (v4) minted
//! once per accepted WebSocket. Two handles compare equal only when they
//! carry the same id, i.e. when they refer to the same live transport.

use std::fmt;

use serde::Serialize;

/// Identity of one live transport session.
///
/// Generated by the transport layer when a socket is upgraded and never
/// reused. Used as the key of [`super::ConnectionRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ConnectionId(uuid::Uuid);

impl ConnectionId {
    /// Creates a new random `ConnectionId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
