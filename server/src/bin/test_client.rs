//! Headless test client: connects, walks a small circle while reporting
//! position, fires once, and prints everything the server sends back.

use futures_util::{SinkExt, StreamExt};
use shared::{ClientMessage, ServerMessage};
use tokio::time::{sleep, Duration};
use tokio_tungstenite::{connect_async, tungstenite::Message};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "ws://127.0.0.1:8765".to_string());

    println!("Connecting to {}", url);
    let (ws_stream, _) = connect_async(&url).await?;
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    // First frame must be the welcome
    let frame = ws_receiver
        .next()
        .await
        .ok_or("connection closed before welcome")??;
    let welcome: ServerMessage = serde_json::from_str(frame.to_text()?)?;
    let my_id = match welcome {
        ServerMessage::Welcome { id } => {
            println!("Welcome received, session id: {}", id);
            id
        }
        other => return Err(format!("expected welcome, got {:?}", other).into()),
    };

    // Reader task: print syncs and hits as they arrive
    let reader = tokio::spawn(async move {
        while let Some(Ok(frame)) = ws_receiver.next().await {
            let text = match frame.to_text() {
                Ok(t) => t,
                Err(_) => continue,
            };
            match serde_json::from_str::<ServerMessage>(text) {
                Ok(ServerMessage::Sync { players }) => {
                    println!("sync: {} players", players.len());
                    for p in players {
                        println!("  {} pos={:?} rot={:.2}", p.id, p.pos, p.rot);
                    }
                }
                Ok(ServerMessage::Hit { dmg, from }) => {
                    println!("hit! {} damage from {}", dmg, from);
                }
                Ok(other) => println!("server: {:?}", other),
                Err(e) => println!("undecodable frame: {}", e),
            }
        }
    });

    // Walk a circle of radius 3 around the spawn point
    for i in 0..30u32 {
        let angle = i as f32 / 30.0 * std::f32::consts::TAU;
        let pos_msg = ClientMessage::Pos {
            pos: [3.0 * angle.cos(), 5.0, 3.0 * angle.sin()],
            rot: angle,
        };
        ws_sender
            .send(Message::Text(serde_json::to_string(&pos_msg)?))
            .await?;
        sleep(Duration::from_millis(100)).await;
    }

    // Fire once from wherever we ended up
    let shoot = ClientMessage::Shoot { weapon: None };
    ws_sender
        .send(Message::Text(serde_json::to_string(&shoot)?))
        .await?;
    println!("Shot fired as {}", my_id);

    sleep(Duration::from_secs(1)).await;
    ws_sender.send(Message::Close(None)).await?;
    reader.abort();
    println!("Test client finished");

    Ok(())
}
