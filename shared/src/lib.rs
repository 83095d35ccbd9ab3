use serde::{Deserialize, Serialize};

pub const SPAWN_POSITION: Vec3 = [0.0, 5.0, 0.0];
pub const SPAWN_ROTATION: f32 = 0.0;
pub const ROOM_CAPACITY: usize = 10;
pub const HIT_RANGE: f32 = 2.0;
pub const HIT_DAMAGE: u32 = 25;
pub const DEFAULT_ROOM_ID: &str = "default_room";
pub const DEFAULT_TICK_RATE: u32 = 30;

/// World-space position, `[x, y, z]` on the wire.
pub type Vec3 = [f32; 3];

/// Messages a client may send. The `type` tag is the wire contract:
/// a frame without a recognized `type` fails to decode entirely.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Pos {
        pos: Vec3,
        rot: f32,
    },
    Shoot {
        /// Weapon identifier. The hit model ignores it; clients may omit it.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        weapon: Option<String>,
    },
    JoinRoom {
        room_id: String,
    },
}

/// Messages the server sends.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome { id: String },
    Hit { dmg: u32, from: String },
    Sync { players: Vec<PlayerState> },
}

/// One member's entry in a `sync` snapshot.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlayerState {
    pub id: String,
    pub pos: Vec3,
    pub rot: f32,
}

/// Euclidean distance between two world positions.
pub fn distance(a: Vec3, b: Vec3) -> f32 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}
