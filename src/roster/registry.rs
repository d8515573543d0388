use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, instrument};

/// What happens to a room entry once its last member is gone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvictionPolicy {
    /// Remove the room entry as soon as its member set becomes empty
    #[default]
    PruneEmpty,
    /// Keep empty room entries allocated for the lifetime of the registry
    Retain,
}

/// Tracks which identities are currently present in which rooms.
///
/// The registry is a plain owned value. It performs no locking of its own;
/// callers must serialize every mutation and snapshot read (the relay does
/// this by giving the registry to a single dispatcher task).
///
/// Sets are ordered so `snapshot` is deterministic for a given state.
#[derive(Debug, Default)]
pub struct RosterRegistry {
    rooms: BTreeMap<String, BTreeSet<String>>,
    policy: EvictionPolicy,
}

impl RosterRegistry {
    /// Creates an empty registry that prunes empty rooms
    pub fn new() -> Self {
        Self::with_policy(EvictionPolicy::default())
    }

    pub fn with_policy(policy: EvictionPolicy) -> Self {
        Self {
            rooms: BTreeMap::new(),
            policy,
        }
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    /// Adds `identity` to `room`, creating the room entry if needed.
    ///
    /// Returns `true` if the identity was not already a member.
    #[instrument(skip(self))]
    pub fn join(&mut self, room: &str, identity: &str) -> bool {
        let inserted = self
            .rooms
            .entry(room.to_string())
            .or_default()
            .insert(identity.to_string());

        debug!(
            room_id = %room,
            identity = %identity,
            inserted = inserted,
            "Roster join"
        );
        inserted
    }

    /// Removes `identity` from `room`. Unknown rooms and identities are a no-op.
    ///
    /// Returns `true` if the identity was a member.
    #[instrument(skip(self))]
    pub fn leave(&mut self, room: &str, identity: &str) -> bool {
        let Some(members) = self.rooms.get_mut(room) else {
            debug!(room_id = %room, "Roster leave on unknown room");
            return false;
        };

        let removed = members.remove(identity);
        if members.is_empty() && self.policy == EvictionPolicy::PruneEmpty {
            self.rooms.remove(room);
            debug!(room_id = %room, "Pruned empty room");
        }

        debug!(
            room_id = %room,
            identity = %identity,
            removed = removed,
            "Roster leave"
        );
        removed
    }

    /// Current members of `room`, empty for an unknown room
    pub fn snapshot(&self, room: &str) -> Vec<String> {
        self.rooms
            .get(room)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Removes `identity` from every room it belongs to.
    ///
    /// Returns the rooms whose roster changed.
    #[instrument(skip(self))]
    pub fn purge_connection(&mut self, identity: &str) -> BTreeSet<String> {
        let mut affected = BTreeSet::new();

        for (room, members) in self.rooms.iter_mut() {
            if members.remove(identity) {
                affected.insert(room.clone());
            }
        }

        if self.policy == EvictionPolicy::PruneEmpty {
            self.rooms.retain(|_, members| !members.is_empty());
        }

        debug!(
            identity = %identity,
            affected_rooms = affected.len(),
            "Purged identity from rosters"
        );
        affected
    }

    pub fn contains(&self, room: &str, identity: &str) -> bool {
        self.rooms
            .get(room)
            .is_some_and(|members| members.contains(identity))
    }

    /// Number of room entries currently allocated, empty ones included
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Number of distinct identities present in at least one room
    pub fn identity_count(&self) -> usize {
        self.rooms
            .values()
            .flatten()
            .collect::<BTreeSet<_>>()
            .len()
    }
}
