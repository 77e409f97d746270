use clap::Parser;
use log::{error, info};
use server::engine::{Engine, COMMAND_QUEUE_DEPTH, REVEAL_DELAY};
use server::network;
use tokio::sync::mpsc;

/// Main-method of the application.
/// Parses command-line arguments, then starts the engine task and the
/// HTTP/WebSocket listener.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Command line arguments
    #[derive(Parser, Debug)]
    #[clap(author, version, about)]
    struct Args {
        /// Server IP address to bind to
        #[clap(short = 'H', long, default_value = "127.0.0.1")]
        host: String,
        /// Server port to listen on
        #[clap(short, long, default_value = "8080")]
        port: u16,
    }

    let args = Args::parse();

    // All commands for all games flow through this one channel.
    let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);

    let engine = Engine::new(command_tx.clone(), REVEAL_DELAY);
    let engine_handle = tokio::spawn(engine.run(command_rx));

    let address = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("listening on {}", address);

    let app = network::router(command_tx);

    // Handle shutdown gracefully
    tokio::select! {
        result = async { axum::serve(listener, app).await } => {
            if let Err(e) = result {
                error!("server error: {}", e);
            }
        }
        result = engine_handle => {
            if let Err(e) = result {
                error!("engine task panicked: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
