//! # Memory Match Game Server
//!
//! This library provides the authoritative server for the multiplayer
//! memory-matching game. It owns the canonical state of every game in
//! progress, validates commands arriving from multiple untrusted
//! client connections, serializes them into a consistent sequence of
//! state transitions, and fans the resulting snapshots out to every
//! participant.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative Sessions
//! Each game code maps to exactly one session holding the shuffled
//! deck, the revealed and matched card sets, the roster and scores,
//! and whose turn it is. Clients render what the server says and
//! nothing else; a client that disagrees with a broadcast snapshot is
//! simply wrong.
//!
//! ### Command Serialization
//! Sockets race: two players can click at the same instant, a flip can
//! arrive for a card that was matched while the frame was in flight, a
//! player can vanish mid-turn. All inbound work therefore funnels into
//! one mpsc channel consumed by a single engine task. No two command
//! handlers ever interleave on session state, which makes the turn and
//! reveal invariants enforceable with plain sequential code.
//!
//! ### Delayed Pair Resolution
//! When the second card of a pair turns face-up the server broadcasts
//! the two faces, waits out a fixed reveal delay, and only then scores
//! the pair. The wait happens in a detached timer task that feeds a
//! resolution command back into the serialized stream; by the time it
//! runs, the session may have shrunk, reset, or vanished, and the
//! handler re-validates all of it before touching anything.
//!
//! ## Module Organization
//!
//! - [`session`]: the per-game state machine (join, initialize, flip,
//!   resolve, leave) with no I/O of its own.
//! - [`registry`]: the code-to-session map with create-on-first-join
//!   and destroy-on-empty lifecycle.
//! - [`engine`]: the command enum, the serialized command loop, and
//!   snapshot broadcasting.
//! - [`network`]: the axum WebSocket endpoint, per-connection plumbing
//!   and structural validation, plus the `/healthz` liveness probe.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::engine::{Engine, COMMAND_QUEUE_DEPTH, REVEAL_DELAY};
//! use server::network;
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
//!
//!     let engine = Engine::new(command_tx.clone(), REVEAL_DELAY);
//!     tokio::spawn(engine.run(command_rx));
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//!     axum::serve(listener, network::router(command_tx)).await?;
//!     Ok(())
//! }
//! ```

pub mod engine;
pub mod network;
pub mod registry;
pub mod session;
