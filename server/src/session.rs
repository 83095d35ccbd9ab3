//! Connected-player state and the registry of live sessions
//!
//! A [`Session`] is the server-side record of one connected player: its
//! identity, its last-known transform, and a membership link to the room it
//! currently occupies. Connection handlers mutate the transform while the
//! broadcast scheduler reads it, so both fields live behind locks.
//!
//! Outbound delivery is fire-and-forget: every session owns the sending half
//! of an unbounded queue drained by that connection's writer task, so no
//! caller ever blocks on a slow receiver.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use log::info;
use tokio::sync::{mpsc, RwLock};

use crate::room::Room;
use shared::{PlayerState, ServerMessage, Vec3, SPAWN_POSITION, SPAWN_ROTATION};

#[derive(Debug, Clone, Copy)]
struct Transform {
    pos: Vec3,
    rot: f32,
}

/// One connected player.
pub struct Session {
    /// Unique session identifier, stable for the connection's lifetime.
    pub id: String,
    /// Last transform received from the client, spawn point until then.
    transform: RwLock<Transform>,
    /// Membership link to the current room. Weak: rooms do not own sessions
    /// and a dropped room must not keep sessions alive (or vice versa).
    room: RwLock<Weak<Room>>,
    /// Queue drained by this connection's writer task.
    outbound: mpsc::UnboundedSender<ServerMessage>,
}

impl Session {
    pub fn new(id: String, outbound: mpsc::UnboundedSender<ServerMessage>) -> Self {
        Self {
            id,
            transform: RwLock::new(Transform {
                pos: SPAWN_POSITION,
                rot: SPAWN_ROTATION,
            }),
            room: RwLock::new(Weak::new()),
            outbound,
        }
    }

    /// Overwrites the transform with the client's values verbatim.
    pub async fn update_transform(&self, pos: Vec3, rot: f32) {
        let mut transform = self.transform.write().await;
        transform.pos = pos;
        transform.rot = rot;
    }

    pub async fn position(&self) -> Vec3 {
        self.transform.read().await.pos
    }

    /// Current `{id, pos, rot}` tuple as it appears in a `sync` snapshot.
    pub async fn snapshot(&self) -> PlayerState {
        let transform = self.transform.read().await;
        PlayerState {
            id: self.id.clone(),
            pos: transform.pos,
            rot: transform.rot,
        }
    }

    /// Enqueues a message for this session's writer task. Returns false if
    /// the connection is gone; callers treat that as a per-member failure,
    /// never an error to escalate.
    pub fn send(&self, message: ServerMessage) -> bool {
        self.outbound.send(message).is_ok()
    }

    /// The room this session currently occupies, if it still exists.
    pub async fn room(&self) -> Option<Arc<Room>> {
        self.room.read().await.upgrade()
    }

    pub async fn set_room(&self, room: &Arc<Room>) {
        *self.room.write().await = Arc::downgrade(room);
    }

    pub async fn clear_room(&self) {
        *self.room.write().await = Weak::new();
    }
}

/// All live sessions, keyed by id.
///
/// An explicit object handed to the acceptor rather than ambient global
/// state, so connection handling can be exercised with fakes in tests.
pub struct SessionRegistry {
    sessions: HashMap<String, Arc<Session>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }

    pub fn insert(&mut self, session: Arc<Session>) {
        info!("Session {} registered", session.id);
        self.sessions.insert(session.id.clone(), session);
    }

    /// Removes a session from the reachable set. Returns true if it was
    /// present; removing an unknown id is a no-op.
    pub fn remove(&mut self, id: &str) -> bool {
        if self.sessions.remove(id).is_some() {
            info!("Session {} deregistered", id);
            true
        } else {
            false
        }
    }

    pub fn get(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
