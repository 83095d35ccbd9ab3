use clap::Parser;
use server::broadcast::BroadcastScheduler;
use server::network::ConnectionAcceptor;
use server::room::RoomDirectory;
use server::router::MessageRouter;
use server::session::SessionRegistry;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Main-method of the application.
/// Parses command-line arguments, then starts the broadcast scheduler and
/// the connection acceptor.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Command line arguments
    #[derive(Parser, Debug)]
    #[clap(author, version, about)]
    struct Args {
        /// Server IP address to bind to
        #[clap(short = 'H', long, default_value = "0.0.0.0")]
        host: String,
        /// Server port to listen on
        #[clap(short, long, default_value = "8765")]
        port: u16,
        /// Broadcast rate (sync snapshots per second), at least 1
        #[clap(short, long, default_value_t = shared::DEFAULT_TICK_RATE,
               value_parser = clap::value_parser!(u32).range(1..))]
        tick_rate: u32,
    }

    let args = Args::parse();
    env_logger::init();

    // Shared state: the room directory and the session registry are explicit
    // objects handed to the components that need them.
    let directory = Arc::new(RoomDirectory::new());
    let registry = Arc::new(RwLock::new(SessionRegistry::new()));
    let router = Arc::new(MessageRouter::new(Arc::clone(&directory)));
    let acceptor = Arc::new(ConnectionAcceptor::new(registry, router));

    let address = format!("{}:{}", args.host, args.port);
    let listener = ConnectionAcceptor::bind(&address).await?;

    // Spawn the fixed-rate broadcast loop
    let scheduler_handle = {
        let scheduler = BroadcastScheduler::new(Arc::clone(&directory), args.tick_rate);
        tokio::spawn(scheduler.run())
    };

    // Spawn the accept loop
    let server_handle = tokio::spawn(acceptor.serve(listener));

    // Handle shutdown gracefully
    tokio::select! {
        result = server_handle => {
            if let Err(e) = result {
                eprintln!("Acceptor task panicked: {}", e);
            }
        }
        result = scheduler_handle => {
            if let Err(e) = result {
                eprintln!("Broadcast task panicked: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            println!("Received Ctrl+C, shutting down gracefully...");
        }
    }

    Ok(())
}
