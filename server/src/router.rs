//! Inbound message dispatch
//!
//! Each connection handler feeds its text frames through a [`MessageRouter`].
//! Decode failures are local and recoverable: a malformed frame is logged and
//! dropped without ever closing the connection. Game messages arriving while
//! the session has no room are silently dropped as well.
//!
//! The router also owns the join/leave choreography between sessions, rooms,
//! and the directory, so the acceptor and the dispatch path share one
//! implementation.

use std::sync::Arc;

use log::{debug, info, warn};

use crate::hit;
use crate::room::{JoinOutcome, RoomDirectory};
use crate::session::Session;
use shared::ClientMessage;

pub struct MessageRouter {
    directory: Arc<RoomDirectory>,
}

impl MessageRouter {
    pub fn new(directory: Arc<RoomDirectory>) -> Self {
        Self { directory }
    }

    /// Decodes one inbound frame and dispatches on its `type`.
    pub async fn dispatch(&self, session: &Arc<Session>, frame: &str) {
        let message = match serde_json::from_str::<ClientMessage>(frame) {
            Ok(message) => message,
            Err(e) => {
                debug!("Ignoring malformed frame from session {}: {}", session.id, e);
                return;
            }
        };

        match message {
            ClientMessage::Pos { pos, rot } => {
                if session.room().await.is_none() {
                    debug!("Dropping pos from roomless session {}", session.id);
                    return;
                }
                session.update_transform(pos, rot).await;
            }
            ClientMessage::Shoot { .. } => match session.room().await {
                Some(room) => {
                    hit::resolve_shot(session, &room).await;
                }
                None => {
                    debug!("Dropping shoot from roomless session {}", session.id);
                }
            },
            ClientMessage::JoinRoom { room_id } => {
                self.join_room(session, &room_id).await;
            }
        }
    }

    /// Moves the session into the named room, creating it on first
    /// reference. On capacity failure the session keeps its current room and
    /// no notification is sent; the false return is the whole contract.
    ///
    /// The move is staged: a slot in the target is reserved first, then the
    /// previous membership is dropped, then the reservation commits. The
    /// reservation holds capacity and keeps the target alive without being
    /// broadcast-visible, so a sync tick taken mid-move lists the session in
    /// at most one room. A reservation that lands on a room the directory
    /// reclaimed in the meantime comes back [`JoinOutcome::Closed`] and the
    /// lookup is simply retried.
    pub async fn join_room(&self, session: &Arc<Session>, room_id: &str) -> bool {
        let previous = session.room().await;
        if let Some(prev) = &previous {
            if prev.id == room_id {
                return true;
            }
        }

        let target = loop {
            let candidate = self.directory.get_or_create(room_id).await;
            match candidate.reserve(&session.id).await {
                JoinOutcome::Joined => break candidate,
                JoinOutcome::Full => {
                    warn!(
                        "Join rejected for session {}: room {} is full",
                        session.id, room_id
                    );
                    return false;
                }
                JoinOutcome::Closed => continue,
            }
        };

        if let Some(prev) = previous {
            prev.remove_member(&session.id).await;
            self.directory.reclaim_if_empty(&prev).await;
        }
        target.commit(Arc::clone(session)).await;
        session.set_room(&target).await;
        info!("Session {} joined room {}", session.id, room_id);
        true
    }

    /// Detaches the session from its room, reclaiming the room if that left
    /// it empty. Safe to call on a session with no room.
    pub async fn leave_room(&self, session: &Session) {
        if let Some(room) = session.room().await {
            room.remove_member(&session.id).await;
            self.directory.reclaim_if_empty(&room).await;
            session.clear_room().await;
            info!("Session {} left room {}", session.id, room.id);
        }
    }
}
