use std::collections::{BTreeMap, BTreeSet};

use crate::event::ConnectionId;

/// Which connections receive a room's broadcasts.
///
/// This is the delivery side of room membership and is keyed by connection,
/// unlike the roster which is keyed by identity. Empty rooms are always
/// dropped.
#[derive(Debug, Default)]
pub struct RoomChannels {
    rooms: BTreeMap<String, BTreeSet<ConnectionId>>,
}

impl RoomChannels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enroll(&mut self, room: &str, connection_id: ConnectionId) -> bool {
        self.rooms
            .entry(room.to_string())
            .or_default()
            .insert(connection_id)
    }

    pub fn withdraw(&mut self, room: &str, connection_id: &ConnectionId) -> bool {
        let Some(members) = self.rooms.get_mut(room) else {
            return false;
        };
        let removed = members.remove(connection_id);
        if members.is_empty() {
            self.rooms.remove(room);
        }
        removed
    }

    /// Removes the connection from every room, returning the rooms it was in
    pub fn withdraw_all(&mut self, connection_id: &ConnectionId) -> Vec<String> {
        let mut rooms = Vec::new();
        for (room, members) in self.rooms.iter_mut() {
            if members.remove(connection_id) {
                rooms.push(room.clone());
            }
        }
        self.rooms.retain(|_, members| !members.is_empty());
        rooms
    }

    pub fn recipients(&self, room: &str) -> Vec<ConnectionId> {
        self.rooms
            .get(room)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Every connection in the room except `excluded`
    pub fn recipients_except(&self, room: &str, excluded: &ConnectionId) -> Vec<ConnectionId> {
        self.rooms
            .get(room)
            .map(|members| members.iter().filter(|id| *id != excluded).copied().collect())
            .unwrap_or_default()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
