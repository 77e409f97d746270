//! Serialized command engine.
//!
//! Every inbound event (connection lifecycle, game commands, reveal
//! timers) arrives as an [`EngineCommand`] on one mpsc channel and is
//! processed strictly one at a time by the engine task. The engine is
//! the only code that touches session state, which makes the usual
//! read-modify-write races between racing sockets impossible without
//! any per-session locking.
//!
//! The reveal delay is the single deliberate suspension point in the
//! game rules: when a second card turns face-up, a timer task sleeps
//! and then feeds `ResolvePair` back into the same channel, so the
//! resolution step re-enters the serialized stream and re-validates
//! the session before mutating it. Between those two halves any other
//! command may legally run and observe the two-revealed state.

use log::{debug, info};
use shared::ServerMessage;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;

use crate::registry::SessionRegistry;
use crate::session::{ConnectionId, FlipOutcome};

/// Pause between a completed pair becoming visible and its resolution,
/// so players see both faces before the state changes again.
pub const REVEAL_DELAY: Duration = Duration::from_millis(900);

/// Depth of the inbound command queue.
pub const COMMAND_QUEUE_DEPTH: usize = 1000;

/// One unit of work for the engine task.
#[derive(Debug)]
pub enum EngineCommand {
    /// A client connection opened; `sender` is its outbound channel.
    Connected {
        connection_id: ConnectionId,
        sender: mpsc::UnboundedSender<ServerMessage>,
    },
    Join {
        connection_id: ConnectionId,
        game_code: String,
        name: String,
    },
    Initialize {
        connection_id: ConnectionId,
        game_code: String,
        num_matches: usize,
    },
    Flip {
        connection_id: ConnectionId,
        game_code: String,
        index: usize,
    },
    /// Fired by a reveal timer. `round` identifies the round the timer
    /// was scheduled in; a reinitialized session ignores it.
    ResolvePair { game_code: String, round: u64 },
    Disconnected { connection_id: ConnectionId },
}

/// Owns the registry and all outbound connection channels.
pub struct Engine {
    registry: SessionRegistry,
    connections: HashMap<ConnectionId, mpsc::UnboundedSender<ServerMessage>>,
    /// Clone of the inbound sender, used to schedule reveal timers.
    command_tx: mpsc::Sender<EngineCommand>,
    reveal_delay: Duration,
}

impl Engine {
    pub fn new(command_tx: mpsc::Sender<EngineCommand>, reveal_delay: Duration) -> Self {
        Self {
            registry: SessionRegistry::new(),
            connections: HashMap::new(),
            command_tx,
            reveal_delay,
        }
    }

    /// Drain the command channel until every sender is gone.
    pub async fn run(mut self, mut commands: mpsc::Receiver<EngineCommand>) {
        info!("engine started");
        while let Some(command) = commands.recv().await {
            self.handle_command(command);
        }
        info!("engine stopped");
    }

    fn handle_command(&mut self, command: EngineCommand) {
        match command {
            EngineCommand::Connected {
                connection_id,
                sender,
            } => {
                self.connections.insert(connection_id, sender);
            }
            EngineCommand::Join {
                connection_id,
                game_code,
                name,
            } => self.handle_join(connection_id, &game_code, &name),
            EngineCommand::Initialize {
                connection_id,
                game_code,
                num_matches,
            } => self.handle_initialize(connection_id, &game_code, num_matches),
            EngineCommand::Flip {
                connection_id,
                game_code,
                index,
            } => self.handle_flip(connection_id, game_code, index),
            EngineCommand::ResolvePair { game_code, round } => {
                self.handle_resolve(&game_code, round)
            }
            EngineCommand::Disconnected { connection_id } => {
                self.handle_disconnected(connection_id)
            }
        }
    }

    fn handle_join(&mut self, connection_id: ConnectionId, game_code: &str, name: &str) {
        let session = self.registry.get_or_create(game_code);
        let roster_changed = session.join(connection_id, name);
        let host = session.is_host(connection_id);
        let players = session.player_views();
        let snapshot = session.snapshot();
        let recipients = session.participant_ids();

        // The joiner learns its host status first, then the room hears
        // about the roster and the full state.
        self.send_to(connection_id, ServerMessage::JoinedGame { host });
        if roster_changed {
            self.send_many(&recipients, ServerMessage::PlayerJoined(players));
        }
        self.send_many(&recipients, ServerMessage::GameState(snapshot));
    }

    fn handle_initialize(
        &mut self,
        connection_id: ConnectionId,
        game_code: &str,
        num_matches: usize,
    ) {
        let Some(session) = self.registry.get_mut(game_code) else {
            return;
        };
        // Any participant may start or restart a round; everyone else
        // is dropped silently.
        if !session.has_participant(connection_id) {
            debug!("initialize for {} from non-participant {}", game_code, connection_id);
            return;
        }

        session.initialize(num_matches, &mut rand::thread_rng());
        let snapshot = session.snapshot();
        let recipients = session.participant_ids();
        self.send_many(&recipients, ServerMessage::GameState(snapshot));
    }

    fn handle_flip(&mut self, connection_id: ConnectionId, game_code: String, index: usize) {
        let Some(session) = self.registry.get_mut(&game_code) else {
            return;
        };

        let outcome = session.flip(connection_id, index);
        if outcome == FlipOutcome::Ignored {
            return;
        }

        let snapshot = session.snapshot();
        let recipients = session.participant_ids();
        let round = session.round();
        self.send_many(&recipients, ServerMessage::GameState(snapshot));

        if outcome == FlipOutcome::PairRevealed {
            self.schedule_resolution(game_code, round);
        }
    }

    /// Sleep out the reveal delay off the command stream, then hand
    /// resolution back to it as a regular command.
    fn schedule_resolution(&self, game_code: String, round: u64) {
        let command_tx = self.command_tx.clone();
        let delay = self.reveal_delay;
        tokio::spawn(async move {
            sleep(delay).await;
            let _ = command_tx
                .send(EngineCommand::ResolvePair { game_code, round })
                .await;
        });
    }

    fn handle_resolve(&mut self, game_code: &str, round: u64) {
        let Some(session) = self.registry.get_mut(game_code) else {
            // Session emptied out and was destroyed while the timer
            // was pending.
            return;
        };
        if session.round() != round {
            debug!("game {}: dropping reveal timer from a previous round", game_code);
            return;
        }
        if !session.resolve_pair() {
            return;
        }

        let snapshot = session.snapshot();
        let recipients = session.participant_ids();
        self.send_many(&recipients, ServerMessage::GameState(snapshot));
    }

    /// A closed connection leaves every session it was seated in.
    fn handle_disconnected(&mut self, connection_id: ConnectionId) {
        self.connections.remove(&connection_id);

        for code in self.registry.codes_for(connection_id) {
            let Some(session) = self.registry.get_mut(&code) else {
                continue;
            };
            if !session.leave(connection_id) {
                continue;
            }
            if session.is_empty() {
                self.registry.remove(&code);
                continue;
            }

            let players = session.player_views();
            let snapshot = session.snapshot();
            let recipients = session.participant_ids();
            self.send_many(&recipients, ServerMessage::PlayerJoined(players));
            self.send_many(&recipients, ServerMessage::GameState(snapshot));
        }
    }

    /// Fire-and-forget delivery; a connection that is gone just misses
    /// the broadcast.
    fn send_to(&self, connection_id: ConnectionId, message: ServerMessage) {
        if let Some(sender) = self.connections.get(&connection_id) {
            if sender.send(message).is_err() {
                debug!("connection {}: outbound channel closed", connection_id);
            }
        }
    }

    fn send_many(&self, recipients: &[ConnectionId], message: ServerMessage) {
        for &connection_id in recipients {
            self.send_to(connection_id, message.clone());
        }
    }
}
