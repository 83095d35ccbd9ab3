//! # Arena Game Server Library
//!
//! Authoritative server for the multiplayer arena game. It accepts WebSocket
//! connections, keeps per-room player state, broadcasts a consistent snapshot
//! of each room at a fixed cadence, and adjudicates hits on the server so
//! clients cannot forge damage.
//!
//! ## Architecture
//!
//! One tokio task per connection reads inbound frames to completion or
//! failure; a paired writer task drains that connection's outbound queue; a
//! single scheduler task ticks at 30 Hz independent of any connection; one
//! acceptor loop hands sockets to handlers. Shared state is locked per room,
//! so sessions in different rooms never contend, and no lock is ever held
//! across a socket send.
//!
//! ## Module Organization
//!
//! - [`session`]: per-player state and the registry of live sessions
//! - [`room`]: bounded membership sets and the process-wide room directory
//! - [`router`]: inbound dispatch (`pos`, `shoot`, `join_room`) and the
//!   join/leave choreography
//! - [`hit`]: distance-based hit adjudication
//! - [`broadcast`]: the fixed-rate `sync` scheduler
//! - [`network`]: WebSocket accept loop, handshake, and teardown
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tokio::sync::RwLock;
//! use server::broadcast::BroadcastScheduler;
//! use server::network::ConnectionAcceptor;
//! use server::room::RoomDirectory;
//! use server::router::MessageRouter;
//! use server::session::SessionRegistry;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let directory = Arc::new(RoomDirectory::new());
//!     let registry = Arc::new(RwLock::new(SessionRegistry::new()));
//!     let router = Arc::new(MessageRouter::new(Arc::clone(&directory)));
//!     let acceptor = Arc::new(ConnectionAcceptor::new(registry, router));
//!
//!     let listener = ConnectionAcceptor::bind("0.0.0.0:8765").await?;
//!     tokio::spawn(BroadcastScheduler::new(directory, 30).run());
//!     acceptor.serve(listener).await;
//!     Ok(())
//! }
//! ```

pub mod broadcast;
pub mod hit;
pub mod network;
pub mod room;
pub mod router;
pub mod session;
