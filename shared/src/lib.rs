use serde::{Deserialize, Serialize};

pub mod bot;

/// Fixed palette of card faces. A round with `match_count = k` uses the
/// first `k` symbols, each appearing exactly twice in the deck.
pub const SYMBOL_PALETTE: [&str; 16] = [
    "🍎", "🍌", "🍇", "🍓", "🍒", "🍍", "🥝", "🍉", "🍋", "🍑", "🍏", "🍈", "🍔", "🍕", "🍩", "🍪",
];

pub const MIN_MATCH_COUNT: usize = 1;
pub const MAX_MATCH_COUNT: usize = SYMBOL_PALETTE.len();
pub const DEFAULT_MATCH_COUNT: usize = 8;

/// Label substituted for a blank display name on join.
pub const DEFAULT_PLAYER_NAME: &str = "Player";

/// Messages sent from a client to the server. Every command names the
/// game code it targets; a connection may take part in several games.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    #[serde(rename_all = "camelCase")]
    JoinGame { game_code: String, name: String },
    #[serde(rename_all = "camelCase")]
    InitializeGame { game_code: String, num_matches: usize },
    #[serde(rename_all = "camelCase")]
    CardFlip { game_code: String, index: usize },
}

impl ClientMessage {
    /// The game code this command is addressed to.
    pub fn game_code(&self) -> &str {
        match self {
            ClientMessage::JoinGame { game_code, .. }
            | ClientMessage::InitializeGame { game_code, .. }
            | ClientMessage::CardFlip { game_code, .. } => game_code,
        }
    }
}

/// Messages sent from the server to clients.
///
/// `GameState` is broadcast to every participant of a game after each
/// accepted transition. `JoinedGame` goes to the joining connection
/// alone. `ErrorMessage` is only used for structurally malformed
/// commands; invalid-but-well-formed commands are dropped silently.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ServerMessage {
    GameState(GameSnapshot),
    PlayerJoined(Vec<PlayerView>),
    #[serde(rename_all = "camelCase")]
    JoinedGame { host: bool },
    ErrorMessage(String),
}

/// Complete serializable state of one game, as clients render it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub game_code: String,
    pub num_matches: usize,
    pub shuffled_images: Vec<String>,
    pub flipped_cards: Vec<usize>,
    pub matched_cards: Vec<usize>,
    pub players: Vec<PlayerView>,
    pub current_player_index: usize,
    pub game_won: bool,
}

/// One seat on the scoreboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub name: String,
    pub score: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_symbols_are_distinct() {
        for i in 0..SYMBOL_PALETTE.len() {
            for j in (i + 1)..SYMBOL_PALETTE.len() {
                assert_ne!(SYMBOL_PALETTE[i], SYMBOL_PALETTE[j]);
            }
        }
    }

    #[test]
    fn join_game_wire_format() {
        let msg = ClientMessage::JoinGame {
            game_code: "AB12C".to_string(),
            name: "Alice".to_string(),
        };

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "joinGame");
        assert_eq!(json["data"]["gameCode"], "AB12C");
        assert_eq!(json["data"]["name"], "Alice");
    }

    #[test]
    fn initialize_game_wire_format() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"initializeGame","data":{"gameCode":"AB12C","numMatches":8}}"#,
        )
        .unwrap();

        match msg {
            ClientMessage::InitializeGame {
                game_code,
                num_matches,
            } => {
                assert_eq!(game_code, "AB12C");
                assert_eq!(num_matches, 8);
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn card_flip_wire_format() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"cardFlip","data":{"gameCode":"AB12C","index":3}}"#)
                .unwrap();

        match msg {
            ClientMessage::CardFlip { game_code, index } => {
                assert_eq!(game_code, "AB12C");
                assert_eq!(index, 3);
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn game_state_wire_format() {
        let snapshot = GameSnapshot {
            game_code: "AB12C".to_string(),
            num_matches: 2,
            shuffled_images: vec![
                "🍎".to_string(),
                "🍌".to_string(),
                "🍎".to_string(),
                "🍌".to_string(),
            ],
            flipped_cards: vec![0],
            matched_cards: vec![],
            players: vec![
                PlayerView {
                    name: "Alice".to_string(),
                    score: 0,
                },
                PlayerView {
                    name: "Bob".to_string(),
                    score: 1,
                },
            ],
            current_player_index: 1,
            game_won: false,
        };

        let json = serde_json::to_value(ServerMessage::GameState(snapshot.clone())).unwrap();
        assert_eq!(json["type"], "gameState");
        assert_eq!(json["data"]["gameCode"], "AB12C");
        assert_eq!(json["data"]["shuffledImages"][0], "🍎");
        assert_eq!(json["data"]["flippedCards"][0], 0);
        assert_eq!(json["data"]["matchedCards"].as_array().unwrap().len(), 0);
        assert_eq!(json["data"]["players"][1]["score"], 1);
        assert_eq!(json["data"]["currentPlayerIndex"], 1);
        assert_eq!(json["data"]["gameWon"], false);

        let back: ServerMessage = serde_json::from_value(json).unwrap();
        match back {
            ServerMessage::GameState(s) => assert_eq!(s, snapshot),
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn joined_game_and_error_wire_format() {
        let json = serde_json::to_value(ServerMessage::JoinedGame { host: true }).unwrap();
        assert_eq!(json["type"], "joinedGame");
        assert_eq!(json["data"]["host"], true);

        let json = serde_json::to_value(ServerMessage::ErrorMessage(
            "game code is required".to_string(),
        ))
        .unwrap();
        assert_eq!(json["type"], "errorMessage");
        assert_eq!(json["data"], "game code is required");
    }

    #[test]
    fn missing_game_code_fails_to_parse() {
        let result: Result<ClientMessage, _> =
            serde_json::from_str(r#"{"type":"joinGame","data":{"name":"Alice"}}"#);
        assert!(result.is_err());
    }
}
