//! Server-authoritative hit adjudication
//!
//! A shot is resolved purely by positional proximity at the instant the
//! `shoot` message is processed: every other member of the shooter's room
//! within [`HIT_RANGE`] takes [`HIT_DAMAGE`]. No line of sight, no per-weapon
//! damage, no rate limiting, and no ammo bookkeeping on the server. Each
//! invocation is stateless; a single shot hitting several close targets sends
//! each of them an independent `hit` notification.

use log::{debug, info};

use crate::room::Room;
use crate::session::Session;
use shared::{distance, ServerMessage, HIT_DAMAGE, HIT_RANGE};

/// Resolves one shot from `shooter` against the members of `room`.
/// Returns the number of targets hit.
pub async fn resolve_shot(shooter: &Session, room: &Room) -> usize {
    let shooter_pos = shooter.position().await;
    debug!(
        "Session {} is shooting from {:?} in room {}",
        shooter.id, shooter_pos, room.id
    );

    let mut hits = 0;
    for target in room.members().await {
        if target.id == shooter.id {
            continue;
        }

        let dist = distance(shooter_pos, target.position().await);
        if dist < HIT_RANGE {
            info!(
                "Hit: {} -> {} at distance {:.2} in room {}",
                shooter.id, target.id, dist, room.id
            );
            target.send(ServerMessage::Hit {
                dmg: HIT_DAMAGE,
                from: shooter.id.clone(),
            });
            hits += 1;
        }
    }

    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    fn test_session(id: &str) -> (Arc<Session>, mpsc::UnboundedReceiver<ServerMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Session::new(id.to_string(), tx)), rx)
    }

    #[tokio::test]
    async fn test_close_target_takes_damage_once() {
        let room = Room::new("r".to_string());
        let (shooter, mut shooter_rx) = test_session("A");
        let (target, mut target_rx) = test_session("B");
        shooter.update_transform([0.0, 5.0, 0.0], 0.0).await;
        target.update_transform([1.0, 5.0, 0.0], 0.0).await;
        room.add_member(Arc::clone(&shooter)).await;
        room.add_member(Arc::clone(&target)).await;

        let hits = resolve_shot(&shooter, &room).await;
        assert_eq!(hits, 1);

        match target_rx.try_recv() {
            Ok(ServerMessage::Hit { dmg, from }) => {
                assert_eq!(dmg, 25);
                assert_eq!(from, "A");
            }
            other => panic!("Expected hit, got {:?}", other),
        }
        // Exactly once, and never back at the shooter.
        assert!(target_rx.try_recv().is_err());
        assert!(shooter_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_colocated_players_register_hit() {
        let room = Room::new("r".to_string());
        let (shooter, _srx) = test_session("A");
        let (target, mut target_rx) = test_session("B");
        room.add_member(Arc::clone(&shooter)).await;
        room.add_member(Arc::clone(&target)).await;

        // Both still at the spawn point.
        let hits = resolve_shot(&shooter, &room).await;
        assert_eq!(hits, 1);
        assert!(matches!(
            target_rx.try_recv(),
            Ok(ServerMessage::Hit { dmg: 25, .. })
        ));
    }

    #[tokio::test]
    async fn test_distant_target_is_missed() {
        let room = Room::new("r".to_string());
        let (shooter, _srx) = test_session("A");
        let (target, mut target_rx) = test_session("B");
        target.update_transform([10.0, 5.0, 0.0], 0.0).await;
        room.add_member(Arc::clone(&shooter)).await;
        room.add_member(Arc::clone(&target)).await;

        assert_eq!(resolve_shot(&shooter, &room).await, 0);
        assert!(target_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_range_boundary_is_exclusive() {
        let room = Room::new("r".to_string());
        let (shooter, _srx) = test_session("A");
        let (target, mut target_rx) = test_session("B");
        target.update_transform([HIT_RANGE, 5.0, 0.0], 0.0).await;
        room.add_member(Arc::clone(&shooter)).await;
        room.add_member(Arc::clone(&target)).await;

        // Exactly 2.0 units away: not a hit.
        assert_eq!(resolve_shot(&shooter, &room).await, 0);
        assert!(target_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_single_shot_fans_out_to_all_close_targets() {
        let room = Room::new("r".to_string());
        let (shooter, _srx) = test_session("A");
        let (b, mut rx_b) = test_session("B");
        let (c, mut rx_c) = test_session("C");
        b.update_transform([0.5, 5.0, 0.0], 0.0).await;
        c.update_transform([-0.5, 5.0, 0.5], 0.0).await;
        room.add_member(Arc::clone(&shooter)).await;
        room.add_member(b).await;
        room.add_member(c).await;

        assert_eq!(resolve_shot(&shooter, &room).await, 2);
        assert!(matches!(rx_b.try_recv(), Ok(ServerMessage::Hit { .. })));
        assert!(matches!(rx_c.try_recv(), Ok(ServerMessage::Hit { .. })));
    }
}
