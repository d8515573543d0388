use std::collections::{BTreeSet, HashMap};

use crate::event::ConnectionId;

/// Records which (room, identity) pairs each live connection has joined.
///
/// This is what lets a disconnect release presence for the identities a
/// connection spoke for, rather than for the connection id itself.
#[derive(Debug, Default)]
pub struct Enrollments {
    by_connection: HashMap<ConnectionId, BTreeSet<(String, String)>>,
}

impl Enrollments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, connection_id: ConnectionId) {
        self.by_connection.entry(connection_id).or_default();
    }

    pub fn enroll(&mut self, connection_id: ConnectionId, room: &str, identity: &str) {
        self.by_connection
            .entry(connection_id)
            .or_default()
            .insert((room.to_string(), identity.to_string()));
    }

    pub fn withdraw(&mut self, connection_id: &ConnectionId, room: &str, identity: &str) {
        if let Some(pairs) = self.by_connection.get_mut(connection_id) {
            pairs.remove(&(room.to_string(), identity.to_string()));
        }
    }

    /// Forgets the connection and returns the pairs it held
    pub fn release(&mut self, connection_id: &ConnectionId) -> BTreeSet<(String, String)> {
        self.by_connection
            .remove(connection_id)
            .unwrap_or_default()
    }

    /// Whether any live connection still holds `identity` in `room`
    pub fn holds_pair(&self, room: &str, identity: &str) -> bool {
        self.by_connection
            .values()
            .any(|pairs| pairs.iter().any(|(r, i)| r == room && i == identity))
    }

    /// Whether any live connection still speaks for `identity` in some room
    pub fn holds_identity(&self, identity: &str) -> bool {
        self.by_connection
            .values()
            .any(|pairs| pairs.iter().any(|(_, i)| i == identity))
    }

    /// Whether this connection still holds any identity in `room`
    pub fn connection_holds_room(&self, connection_id: &ConnectionId, room: &str) -> bool {
        self.by_connection
            .get(connection_id)
            .is_some_and(|pairs| pairs.iter().any(|(r, _)| r == room))
    }

    pub fn connection_count(&self) -> usize {
        self.by_connection.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_returns_pairs_and_forgets_connection() {
        let mut enrollments = Enrollments::new();
        let a = ConnectionId::new();
        enrollments.enroll(a, "r1", "alice");
        enrollments.enroll(a, "r2", "alice");

        let released = enrollments.release(&a);

        assert_eq!(released.len(), 2);
        assert!(!enrollments.holds_identity("alice"));
        assert_eq!(enrollments.connection_count(), 0);
    }

    #[test]
    fn test_holds_pair_across_connections() {
        let mut enrollments = Enrollments::new();
        let a = ConnectionId::new();
        let b = ConnectionId::new();
        enrollments.enroll(a, "r1", "alice");
        enrollments.enroll(b, "r2", "alice");

        enrollments.release(&a);

        assert!(!enrollments.holds_pair("r1", "alice"));
        assert!(enrollments.holds_pair("r2", "alice"));
        assert!(enrollments.holds_identity("alice"));
    }

    #[test]
    fn test_withdraw_and_register() {
        let mut enrollments = Enrollments::new();
        let a = ConnectionId::new();
        enrollments.register(a);
        assert_eq!(enrollments.connection_count(), 1);

        enrollments.enroll(a, "r1", "alice");
        enrollments.enroll(a, "r1", "bob");
        enrollments.withdraw(&a, "r1", "alice");
        assert!(!enrollments.holds_pair("r1", "alice"));
        assert!(enrollments.connection_holds_room(&a, "r1"));

        enrollments.withdraw(&a, "r1", "bob");
        assert!(!enrollments.connection_holds_room(&a, "r1"));
        assert_eq!(enrollments.connection_count(), 1);
    }
}
