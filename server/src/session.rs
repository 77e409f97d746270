//! Authoritative state machine for one game.

use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;
use shared::{GameSnapshot, PlayerView, DEFAULT_PLAYER_NAME, MAX_MATCH_COUNT, MIN_MATCH_COUNT, SYMBOL_PALETTE};

/// Unique handle for one live client connection. Assigned by the
/// transport layer and used as the only move-authorization token.
pub type ConnectionId = u64;

#[derive(Debug, Clone)]
pub struct Participant {
    pub connection_id: ConnectionId,
    pub name: String,
    pub score: u32,
}

/// Result of a flip attempt. `Ignored` covers every validation failure:
/// stale and racing flips are expected traffic, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipOutcome {
    Ignored,
    Revealed,
    /// Second card of a pair is now face-up; the caller must schedule
    /// the delayed resolution step.
    PairRevealed,
}

/// One game, keyed by its code. All mutation happens through the
/// serialized command stream; the session itself never does I/O.
#[derive(Debug)]
pub struct GameSession {
    code: String,
    deck: Vec<&'static str>,
    revealed: Vec<usize>,
    matched: Vec<usize>,
    participants: Vec<Participant>,
    turn_index: usize,
    completed: bool,
    match_count: usize,
    /// Bumped on every (re)initialization so reveal timers scheduled
    /// during a previous round can be recognized as stale.
    round: u64,
}

impl GameSession {
    pub fn new(code: &str) -> Self {
        Self {
            code: code.to_string(),
            deck: Vec::new(),
            revealed: Vec::new(),
            matched: Vec::new(),
            participants: Vec::new(),
            turn_index: 0,
            completed: false,
            match_count: 0,
            round: 0,
        }
    }

    /// Add a participant. Joining again with the same connection is a
    /// no-op; returns whether the roster actually changed. A blank name
    /// gets the default label.
    pub fn join(&mut self, connection_id: ConnectionId, name: &str) -> bool {
        if self.has_participant(connection_id) {
            return false;
        }

        let name = match name.trim() {
            "" => DEFAULT_PLAYER_NAME.to_string(),
            trimmed => trimmed.to_string(),
        };

        info!("game {}: {} joined (connection {})", self.code, name, connection_id);
        self.participants.push(Participant {
            connection_id,
            name,
            score: 0,
        });
        true
    }

    /// Host is a derived fact: the first seat on the roster.
    pub fn is_host(&self, connection_id: ConnectionId) -> bool {
        self.participants
            .first()
            .is_some_and(|p| p.connection_id == connection_id)
    }

    /// Start or restart a round: fresh shuffled deck, zeroed scores,
    /// turn back to the first seat.
    pub fn initialize<R: Rng>(&mut self, requested_matches: usize, rng: &mut R) {
        let match_count = requested_matches.clamp(MIN_MATCH_COUNT, MAX_MATCH_COUNT);

        let mut deck: Vec<&'static str> = SYMBOL_PALETTE[..match_count]
            .iter()
            .flat_map(|&symbol| [symbol, symbol])
            .collect();
        deck.shuffle(rng);

        self.deck = deck;
        self.match_count = match_count;
        self.revealed.clear();
        self.matched.clear();
        for participant in &mut self.participants {
            participant.score = 0;
        }
        self.turn_index = 0;
        self.completed = false;
        self.round += 1;

        info!(
            "game {}: round {} started with {} pairs",
            self.code, self.round, match_count
        );
    }

    /// Attempt to turn a card face-up. Validation order follows the
    /// rules of the game; the first failing check drops the command.
    pub fn flip(&mut self, connection_id: ConnectionId, index: usize) -> FlipOutcome {
        if self.completed || self.deck.is_empty() {
            return FlipOutcome::Ignored;
        }
        let Some(active) = self.participants.get(self.turn_index) else {
            return FlipOutcome::Ignored;
        };
        if active.connection_id != connection_id {
            debug!("game {}: flip from non-active connection {}", self.code, connection_id);
            return FlipOutcome::Ignored;
        }
        if self.revealed.len() >= 2 {
            return FlipOutcome::Ignored;
        }
        if index >= self.deck.len()
            || self.revealed.contains(&index)
            || self.matched.contains(&index)
        {
            return FlipOutcome::Ignored;
        }

        self.revealed.push(index);
        if self.revealed.len() == 2 {
            FlipOutcome::PairRevealed
        } else {
            FlipOutcome::Revealed
        }
    }

    /// Resolve the pending pair: a match scores for the active
    /// participant and keeps their turn, a mismatch passes the turn.
    /// Returns false when there is no pending pair to resolve (the
    /// round was reset, or the timer fired twice).
    pub fn resolve_pair(&mut self) -> bool {
        if self.revealed.len() != 2 {
            return false;
        }

        let (a, b) = (self.revealed[0], self.revealed[1]);
        if self.deck[a] == self.deck[b] {
            if let Some(active) = self.participants.get_mut(self.turn_index) {
                active.score += 1;
                debug!("game {}: {} matched {}", self.code, active.name, self.deck[a]);
            }
            self.matched.push(a);
            self.matched.push(b);
            self.revealed.clear();
            if self.matched.len() == self.deck.len() {
                self.completed = true;
                info!("game {}: round {} complete", self.code, self.round);
            }
        } else {
            self.revealed.clear();
            // Roster may have emptied out while the reveal timer was
            // pending; skip the rotation rather than divide by zero.
            if !self.participants.is_empty() {
                self.turn_index = (self.turn_index + 1) % self.participants.len();
            }
        }
        true
    }

    /// Remove a participant. Roster changes re-base the turn to the
    /// first seat whenever the removal disturbed the rotation. Returns
    /// whether the connection was actually seated here.
    pub fn leave(&mut self, connection_id: ConnectionId) -> bool {
        let Some(position) = self
            .participants
            .iter()
            .position(|p| p.connection_id == connection_id)
        else {
            return false;
        };

        let participant = self.participants.remove(position);
        info!("game {}: {} left", self.code, participant.name);

        if position < self.turn_index || self.turn_index == self.participants.len() {
            self.turn_index = 0;
        }
        true
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            game_code: self.code.clone(),
            num_matches: self.match_count,
            shuffled_images: self.deck.iter().map(|s| s.to_string()).collect(),
            flipped_cards: self.revealed.clone(),
            matched_cards: self.matched.clone(),
            players: self.player_views(),
            current_player_index: self.turn_index,
            game_won: self.completed,
        }
    }

    pub fn player_views(&self) -> Vec<PlayerView> {
        self.participants
            .iter()
            .map(|p| PlayerView {
                name: p.name.clone(),
                score: p.score,
            })
            .collect()
    }

    pub fn participant_ids(&self) -> Vec<ConnectionId> {
        self.participants.iter().map(|p| p.connection_id).collect()
    }

    pub fn has_participant(&self, connection_id: ConnectionId) -> bool {
        self.participants
            .iter()
            .any(|p| p.connection_id == connection_id)
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn round(&self) -> u64 {
        self.round
    }
}
