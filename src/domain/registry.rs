//! Authoritative map of live connections to their session state.
//!
//! [`ConnectionRegistry`] is a plain, synchronous structure. It performs no
//! locking of its own: the [`crate::service::SessionRouter`] owns the single
//! mutex that guards it, so each transport event mutates and reads the
//! registry atomically.

use std::collections::HashSet;

use indexmap::IndexMap;

use super::connection::{Connection, ConnectionHandle};
use super::ConnectionId;

/// Live connections keyed by transport identity, in registration order.
///
/// # Invariants
///
/// - At most one entry per [`ConnectionId`].
/// - An entry whose room is `None` is never returned by [`Self::members_of`].
/// - Removal keeps the relative order of the remaining entries.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: IndexMap<ConnectionId, Connection>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry for `handle` with no room. No-op if one exists.
    ///
    /// Returns `true` if a new entry was created.
    pub fn register(&mut self, handle: &ConnectionHandle) -> bool {
        if self.connections.contains_key(&handle.id()) {
            return false;
        }
        self.connections
            .insert(handle.id(), Connection::new(handle.clone()));
        true
    }

    /// Moves `handle` into `room`, registering it first if needed.
    ///
    /// `display_name` is only stored if the entry has none yet; a re-join
    /// keeps the name from the first join. Returns the updated entry.
    pub fn set_room(
        &mut self,
        handle: &ConnectionHandle,
        room: &str,
        display_name: String,
    ) -> &Connection {
        let conn = self
            .connections
            .entry(handle.id())
            .or_insert_with(|| Connection::new(handle.clone()));
        conn.assign(room.to_string(), display_name);
        conn
    }

    /// Deletes the entry for `id`, if present.
    pub fn remove(&mut self, id: ConnectionId) -> Option<Connection> {
        self.connections.shift_remove(&id)
    }

    /// Returns the entry for `id`.
    #[must_use]
    pub fn get(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&id)
    }

    /// Iterates, in registration order, over every connection in `room`
    /// other than `excluding`.
    pub fn members_of<'a>(
        &'a self,
        room: &'a str,
        excluding: Option<ConnectionId>,
    ) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections
            .values()
            .filter(move |c| c.room() == Some(room))
            .filter(move |c| Some(c.id()) != excluding)
    }

    /// Number of registered connections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Number of distinct rooms with at least one member.
    #[must_use]
    pub fn room_count(&self) -> usize {
        self.connections
            .values()
            .filter_map(Connection::room)
            .collect::<HashSet<_>>()
            .len()
    }
}
