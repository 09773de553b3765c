//! Server-assigned display names.

/// Monotonic `"User <n>"` generator, starting at 1.
///
/// Lives next to the registry under the router's lock, so two joins can
/// never draw the same number.
#[derive(Debug)]
pub struct NameSequence {
    next: u64,
}

impl NameSequence {
    /// Creates a sequence whose first name is `"User 1"`.
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    /// Returns the next unused display name.
    pub fn next_name(&mut self) -> String {
        let n = self.next;
        self.next = self.next.saturating_add(1);
        format!("User {n}")
    }
}

impl Default for NameSequence {
    fn default() -> Self {
        Self::new()
    }
}
