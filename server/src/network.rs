//! WebSocket accept loop and per-connection plumbing
//!
//! Every accepted connection gets two tasks: a reader that feeds inbound text
//! frames to the [`MessageRouter`], and a writer that drains the session's
//! outbound queue onto the socket. The `welcome` frame is enqueued before the
//! reader starts, so it is always the first thing a client receives and no
//! game message is ever processed ahead of the handshake.
//!
//! Teardown runs exactly once per connection, on whichever path ends the read
//! loop first: clean close, transport error, or protocol-level failure.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, RwLock};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use uuid::Uuid;

use crate::router::MessageRouter;
use crate::session::{Session, SessionRegistry};
use shared::{ServerMessage, DEFAULT_ROOM_ID};

pub struct ConnectionAcceptor {
    registry: Arc<RwLock<SessionRegistry>>,
    router: Arc<MessageRouter>,
}

impl ConnectionAcceptor {
    pub fn new(registry: Arc<RwLock<SessionRegistry>>, router: Arc<MessageRouter>) -> Self {
        Self { registry, router }
    }

    /// Binds the listening endpoint. Split from [`serve`](Self::serve) so
    /// callers (and tests) can learn the bound address first.
    pub async fn bind(addr: &str) -> std::io::Result<TcpListener> {
        let listener = TcpListener::bind(addr).await?;
        info!("Server listening on ws://{}", listener.local_addr()?);
        Ok(listener)
    }

    /// Accepts connections forever, one handler task per connection.
    pub async fn serve(self: Arc<Self>, listener: TcpListener) {
        loop {
            match listener.accept().await {
                Ok((stream, addr)) => {
                    let acceptor = Arc::clone(&self);
                    tokio::spawn(async move {
                        acceptor.handle_connection(stream, addr).await;
                    });
                }
                Err(e) => {
                    error!("Accept error: {}", e);
                }
            }
        }
    }

    async fn handle_connection(&self, stream: TcpStream, addr: SocketAddr) {
        let ws_stream = match accept_async(stream).await {
            Ok(ws) => ws,
            Err(e) => {
                warn!("WebSocket handshake failed for {}: {}", addr, e);
                return;
            }
        };

        let (mut ws_sender, mut ws_receiver) = ws_stream.split();
        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<ServerMessage>();
        let session = Arc::new(Session::new(Uuid::new_v4().to_string(), outbound_tx));
        info!("Session {} connected from {}", session.id, addr);

        // Writer task: drains the outbound queue in order. Ends when the
        // last sender is dropped or the socket goes away.
        let writer_session_id = session.id.clone();
        tokio::spawn(async move {
            while let Some(message) = outbound_rx.recv().await {
                let text = match serde_json::to_string(&message) {
                    Ok(text) => text,
                    Err(e) => {
                        error!(
                            "Failed to serialize message for session {}: {}",
                            writer_session_id, e
                        );
                        continue;
                    }
                };
                if ws_sender.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
        });

        // Enqueued before the read loop starts: the welcome always precedes
        // any reaction to inbound traffic.
        session.send(ServerMessage::Welcome {
            id: session.id.clone(),
        });

        self.registry.write().await.insert(Arc::clone(&session));
        if !self.router.join_room(&session, DEFAULT_ROOM_ID).await {
            warn!(
                "Session {} could not join {}: room is full",
                session.id, DEFAULT_ROOM_ID
            );
        }

        while let Some(frame) = ws_receiver.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    self.router.dispatch(&session, &text).await;
                }
                Ok(Message::Close(_)) => break,
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
                Ok(other) => {
                    debug!(
                        "Ignoring non-text frame from session {}: {} bytes",
                        session.id,
                        other.len()
                    );
                }
                Err(e) => {
                    debug!("Transport error on session {}: {}", session.id, e);
                    break;
                }
            }
        }

        // Teardown: leave the room (reclaiming it if emptied), then drop out
        // of the reachable session set. Dropping our last Arc closes the
        // outbound queue, which ends the writer task.
        self.router.leave_room(&session).await;
        self.registry.write().await.remove(&session.id);
        info!("Session {} disconnected", session.id);
    }
}
