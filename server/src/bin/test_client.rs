use futures::{SinkExt, StreamExt};
use rand::seq::SliceRandom;
use rand::Rng;
use shared::bot::{ArtificialPlayer, Skill};
use shared::{ClientMessage, GameSnapshot, ServerMessage, DEFAULT_MATCH_COUNT};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

// Manual smoke-test client. Joins a game (creating a fresh code when
// none is given) and prints every server message. With --bot it starts
// a round and plays it with the artificial player.
//
// Usage: test_client [GAME_CODE] [--bot]

fn generate_game_code() -> String {
    let alphabet: Vec<char> = ('A'..='Z').chain('0'..='9').collect();
    let mut rng = rand::thread_rng();
    (0..5)
        .map(|_| *alphabet.choose(&mut rng).expect("alphabet is non-empty"))
        .collect()
}

fn print_snapshot(snapshot: &GameSnapshot) {
    let board: Vec<String> = snapshot
        .shuffled_images
        .iter()
        .enumerate()
        .map(|(i, symbol)| {
            if snapshot.flipped_cards.contains(&i) || snapshot.matched_cards.contains(&i) {
                symbol.clone()
            } else {
                "■".to_string()
            }
        })
        .collect();
    println!("Board: {}", board.join(" "));
    for (i, player) in snapshot.players.iter().enumerate() {
        let marker = if i == snapshot.current_player_index {
            "->"
        } else {
            "  "
        };
        println!("{} {}: {}", marker, player.name, player.score);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let bot_mode = args.iter().any(|a| a == "--bot");
    let game_code = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .cloned()
        .unwrap_or_else(generate_game_code);

    let url = std::env::var("SERVER_URL").unwrap_or_else(|_| "ws://127.0.0.1:8080/ws".to_string());
    println!("Connecting to {}", url);
    let (ws_stream, _) = connect_async(url.as_str()).await?;
    let (mut write, mut read) = ws_stream.split();

    // Random suffix so this seat is findable in the roster.
    let my_name = format!(
        "{}-{}",
        if bot_mode { "Bot" } else { "Tester" },
        rand::thread_rng().gen_range(100..1000)
    );

    let join = ClientMessage::JoinGame {
        game_code: game_code.clone(),
        name: my_name.clone(),
    };
    write
        .send(Message::Text(serde_json::to_string(&join)?.into()))
        .await?;
    println!("Joining game {} as {}", game_code, my_name);

    let mut bot = ArtificialPlayer::new(Skill::Hard);

    while let Some(frame) = read.next().await {
        let frame = frame?;
        let Message::Text(text) = frame else {
            continue;
        };

        let message: ServerMessage = match serde_json::from_str(text.as_str()) {
            Ok(message) => message,
            Err(e) => {
                println!("Unparseable server frame: {}", e);
                continue;
            }
        };

        match message {
            ServerMessage::JoinedGame { host } => {
                println!("Joined (host: {})", host);
                if host && bot_mode {
                    let init = ClientMessage::InitializeGame {
                        game_code: game_code.clone(),
                        num_matches: DEFAULT_MATCH_COUNT,
                    };
                    write
                        .send(Message::Text(serde_json::to_string(&init)?.into()))
                        .await?;
                }
            }
            ServerMessage::PlayerJoined(players) => {
                let names: Vec<&str> = players.iter().map(|p| p.name.as_str()).collect();
                println!("Roster: {}", names.join(", "));
            }
            ServerMessage::ErrorMessage(reason) => {
                println!("Server error: {}", reason);
            }
            ServerMessage::GameState(snapshot) => {
                print_snapshot(&snapshot);
                bot.observe(&snapshot);

                if snapshot.game_won {
                    println!("Round over!");
                    continue;
                }

                let my_seat = snapshot.players.iter().position(|p| p.name == my_name);
                let my_turn = my_seat == Some(snapshot.current_player_index);
                if bot_mode && my_turn && snapshot.flipped_cards.is_empty() {
                    if let Some((first, second)) =
                        bot.choose_pair(&snapshot, &mut rand::thread_rng())
                    {
                        println!("Flipping {} and {}", first, second);
                        for index in [first, second] {
                            let flip = ClientMessage::CardFlip {
                                game_code: game_code.clone(),
                                index,
                            };
                            write
                                .send(Message::Text(serde_json::to_string(&flip)?.into()))
                                .await?;
                        }
                    }
                }
            }
        }
    }

    println!("Server closed the connection");
    Ok(())
}
