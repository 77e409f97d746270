//! WebSocket transport and the liveness probe.
//!
//! Each connection gets a process-unique id, an outbound channel
//! drained by a writer task, and a read loop that translates JSON text
//! frames into engine commands. Structural validation lives here:
//! frames that do not parse, or that name no game code, get a single
//! `errorMessage` reply and never reach the engine. Everything else,
//! including commands that are invalid for the current game state, is
//! the engine's business.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use shared::{ClientMessage, ServerMessage};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::engine::EngineCommand;
use crate::session::ConnectionId;

#[derive(Clone)]
pub struct AppState {
    command_tx: mpsc::Sender<EngineCommand>,
    next_connection_id: Arc<AtomicU64>,
}

/// Build the HTTP surface: the game WebSocket and a liveness probe.
pub fn router(command_tx: mpsc::Sender<EngineCommand>) -> Router {
    let state = AppState {
        command_tx,
        next_connection_id: Arc::new(AtomicU64::new(1)),
    };

    Router::new()
        .route("/healthz", get(healthz))
        .route("/ws", get(ws_handler))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let connection_id = state.next_connection_id.fetch_add(1, Ordering::Relaxed);
    info!("connection {} established", connection_id);

    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<ServerMessage>();

    if state
        .command_tx
        .send(EngineCommand::Connected {
            connection_id,
            sender: outbound_tx.clone(),
        })
        .await
        .is_err()
    {
        error!("engine is gone, dropping connection {}", connection_id);
        return;
    }

    // Writer: drain the outbound channel into text frames. Ends when
    // the engine drops its sender after processing our disconnect, or
    // when the peer stops accepting frames.
    let writer = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            let json = match serde_json::to_string(&message) {
                Ok(json) => json,
                Err(e) => {
                    error!("failed to serialize server message: {}", e);
                    continue;
                }
            };
            if ws_sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(frame)) = ws_receiver.next().await {
        match frame {
            Message::Text(text) => match parse_command(connection_id, text.as_str()) {
                Ok(command) => {
                    if state.command_tx.send(command).await.is_err() {
                        break;
                    }
                }
                Err(reason) => {
                    warn!("connection {}: {}", connection_id, reason);
                    let _ = outbound_tx.send(ServerMessage::ErrorMessage(reason));
                }
            },
            Message::Close(_) => break,
            // Pings are answered by the protocol layer; binary frames
            // carry no game meaning.
            _ => {}
        }
    }

    let _ = state
        .command_tx
        .send(EngineCommand::Disconnected { connection_id })
        .await;
    drop(outbound_tx);
    let _ = writer.await;
    debug!("connection {} closed", connection_id);
}

/// Translate one inbound frame into an engine command, rejecting
/// frames a well-behaved client would never send.
fn parse_command(connection_id: ConnectionId, text: &str) -> Result<EngineCommand, String> {
    let message: ClientMessage =
        serde_json::from_str(text).map_err(|_| "malformed message".to_string())?;

    if message.game_code().trim().is_empty() {
        return Err("game code is required".to_string());
    }

    Ok(match message {
        ClientMessage::JoinGame { game_code, name } => EngineCommand::Join {
            connection_id,
            game_code,
            name,
        },
        ClientMessage::InitializeGame {
            game_code,
            num_matches,
        } => EngineCommand::Initialize {
            connection_id,
            game_code,
            num_matches,
        },
        ClientMessage::CardFlip { game_code, index } => EngineCommand::Flip {
            connection_id,
            game_code,
            index,
        },
    })
}
