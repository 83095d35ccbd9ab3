//! Fixed-rate state broadcast
//!
//! One scheduler task runs for the life of the process, independent of any
//! connection. Every tick it snapshots each occupied room's membership and
//! fans a `sync` message out to that room only. A late tick is never
//! retried; the next tick simply carries fresher state
//! ([`MissedTickBehavior::Skip`]).

use std::sync::Arc;

use log::debug;
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::room::RoomDirectory;
use shared::ServerMessage;

pub struct BroadcastScheduler {
    directory: Arc<RoomDirectory>,
    tick_duration: Duration,
}

impl BroadcastScheduler {
    pub fn new(directory: Arc<RoomDirectory>, tick_rate: u32) -> Self {
        // A zero rate would make the interval infinite; run at 1 Hz instead.
        let tick_rate = tick_rate.max(1);
        Self {
            directory,
            tick_duration: Duration::from_secs_f32(1.0 / tick_rate as f32),
        }
    }

    /// Runs forever at the configured cadence.
    pub async fn run(self) {
        let mut tick_interval = interval(self.tick_duration);
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut tick: u64 = 0;

        loop {
            tick_interval.tick().await;
            tick += 1;

            let synced = broadcast_tick(&self.directory).await;

            // Periodic heartbeat in the log, roughly every five seconds at 30 Hz.
            if tick % 150 == 0 && synced > 0 {
                debug!("Tick {}: synced {} occupied rooms", tick, synced);
            }
        }
    }
}

/// Performs one tick's fan-out. Returns the number of rooms that received a
/// `sync`; rooms with no members are skipped, not an error.
pub async fn broadcast_tick(directory: &RoomDirectory) -> usize {
    let mut synced = 0;

    for room in directory.all_rooms().await {
        // One membership snapshot per room per tick: the player list and the
        // recipient list are the same set, even if joins race the tick.
        let members = room.members().await;
        if members.is_empty() {
            continue;
        }

        let mut players = Vec::with_capacity(members.len());
        for member in &members {
            players.push(member.snapshot().await);
        }
        let message = ServerMessage::Sync { players };

        for member in &members {
            if !member.send(message.clone()) {
                debug!(
                    "Dropping sync to session {} in room {}: connection closed",
                    member.id, room.id
                );
            }
        }
        synced += 1;
    }

    synced
}
