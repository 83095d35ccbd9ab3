//! Rooms and the process-wide room directory
//!
//! A [`Room`] is a bounded set of sessions sharing one broadcast stream. The
//! membership set sits behind a per-room lock so two rooms never contend with
//! each other; fan-out snapshots the membership under the lock and enqueues
//! outside it, so no send ever blocks a concurrent join or leave.
//!
//! The [`RoomDirectory`] exclusively owns all rooms. Rooms are created lazily
//! on first reference and reclaimed when a leave empties them, so the
//! directory never grows without bound. Reclamation closes the room under
//! the same lock that admits members: an admission attempt that raced the
//! reclamation sees [`JoinOutcome::Closed`] and must look the room up again
//! rather than land in a room the directory no longer holds.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use log::{debug, info};
use tokio::sync::Mutex;

use crate::session::Session;
use shared::{ServerMessage, ROOM_CAPACITY};

/// Result of an admission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The slot was granted.
    Joined,
    /// The room is at capacity.
    Full,
    /// The room has been reclaimed by the directory; look it up again.
    Closed,
}

struct RoomState {
    members: HashMap<String, Arc<Session>>,
    /// Capacity slots held by in-flight joins. A reserved session is not
    /// broadcast-visible until committed, but it keeps the room alive and
    /// counts toward capacity.
    pending: HashSet<String>,
    closed: bool,
}

impl RoomState {
    fn occupancy(&self) -> usize {
        self.members.len() + self.pending.len()
    }
}

pub struct Room {
    pub id: String,
    capacity: usize,
    state: Mutex<RoomState>,
}

impl Room {
    pub fn new(id: String) -> Arc<Self> {
        Self::with_capacity(id, ROOM_CAPACITY)
    }

    pub fn with_capacity(id: String, capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            id,
            capacity,
            state: Mutex::new(RoomState {
                members: HashMap::new(),
                pending: HashSet::new(),
                closed: false,
            }),
        })
    }

    /// Adds a session if the room is open and has space. Returns false when
    /// full or already reclaimed; the caller decides what to do with a
    /// failed join.
    pub async fn add_member(&self, session: Arc<Session>) -> bool {
        let mut state = self.state.lock().await;
        if state.closed || state.occupancy() >= self.capacity {
            return false;
        }
        state.members.insert(session.id.clone(), session);
        true
    }

    /// Holds a capacity slot for a session without making it
    /// broadcast-visible yet. The reservation keeps the room from being
    /// reclaimed until [`commit`](Self::commit) lands.
    pub async fn reserve(&self, session_id: &str) -> JoinOutcome {
        let mut state = self.state.lock().await;
        if state.closed {
            return JoinOutcome::Closed;
        }
        if state.occupancy() >= self.capacity {
            return JoinOutcome::Full;
        }
        state.pending.insert(session_id.to_string());
        JoinOutcome::Joined
    }

    /// Turns a reservation into full membership.
    pub async fn commit(&self, session: Arc<Session>) {
        let mut state = self.state.lock().await;
        state.pending.remove(&session.id);
        state.members.insert(session.id.clone(), session);
    }

    /// Removes a session. Idempotent: removing a session that is not a
    /// member is a no-op, never an error.
    pub async fn remove_member(&self, session_id: &str) {
        self.state.lock().await.members.remove(session_id);
    }

    /// Snapshot of the current membership. Reserved sessions are excluded
    /// until their join commits.
    pub async fn members(&self) -> Vec<Arc<Session>> {
        self.state.lock().await.members.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.members.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.members.is_empty()
    }

    /// Delivers the same message to every current member. An individual
    /// member's failed enqueue (connection already gone) does not abort
    /// delivery to the rest.
    pub async fn broadcast(&self, message: &ServerMessage) {
        let members = self.members().await;
        for member in members {
            if !member.send(message.clone()) {
                debug!(
                    "Dropping broadcast to session {} in room {}: connection closed",
                    member.id, self.id
                );
            }
        }
    }
}

/// Process-wide registry mapping room ids to rooms.
pub struct RoomDirectory {
    rooms: Mutex<HashMap<String, Arc<Room>>>,
}

impl RoomDirectory {
    pub fn new() -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
        }
    }

    /// Looks up a room, creating it on first reference.
    pub async fn get_or_create(&self, room_id: &str) -> Arc<Room> {
        let mut rooms = self.rooms.lock().await;
        if let Some(room) = rooms.get(room_id) {
            return Arc::clone(room);
        }
        info!("Creating new room: {}", room_id);
        let room = Room::new(room_id.to_string());
        rooms.insert(room_id.to_string(), Arc::clone(&room));
        room
    }

    pub async fn get(&self, room_id: &str) -> Option<Arc<Room>> {
        self.rooms.lock().await.get(room_id).cloned()
    }

    /// Snapshot of every room, for the broadcast tick.
    pub async fn all_rooms(&self) -> Vec<Arc<Room>> {
        self.rooms.lock().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.rooms.lock().await.len()
    }

    /// Drops the room from the directory if nothing occupies it: no
    /// members and no reservation held by an in-flight join. The room is
    /// closed under its own state lock before removal, so an admission
    /// attempt holding a stale handle fails instead of succeeding on a room
    /// the directory no longer knows. Lock order is directory then room,
    /// the same as every other path that holds both.
    pub async fn reclaim_if_empty(&self, room: &Arc<Room>) {
        let mut rooms = self.rooms.lock().await;
        let mut state = room.state.lock().await;
        if !state.members.is_empty() || !state.pending.is_empty() {
            return;
        }
        state.closed = true;
        drop(state);

        if let Some(current) = rooms.get(&room.id) {
            if Arc::ptr_eq(current, room) {
                rooms.remove(&room.id);
                info!("Reclaimed empty room: {}", room.id);
            }
        }
    }
}

impl Default for RoomDirectory {
    fn default() -> Self {
        Self::new()
    }
}
