use chrono::Utc;
use reqwest::Client;
use serde_json::Value;

use insight_core::{GameRecord, PlayerSide};

const USER_AGENT: &str = "ChessInsight/1.0 (chess analysis tool)";

/// How far back to fetch games.
const FETCH_WINDOW_DAYS: i64 = 180;
const MAX_GAMES: usize = 500;

pub struct LichessClient {
    client: Client,
    base: String,
}

/// Map a generic time class to the Lichess perfType value.
pub fn perf_type(time_class: &str) -> Option<&'static str> {
    match time_class {
        "rapid" => Some("rapid"),
        "blitz" => Some("blitz"),
        "bullet" => Some("bullet"),
        "daily" => Some("correspondence"),
        _ => None,
    }
}

/// Convert Lichess winner/status into a Chess.com-style result string.
fn result_code(winner: Option<&str>, status: &str, color: &str) -> String {
    let Some(winner) = winner else {
        return if status == "stalemate" {
            "stalemate".to_string()
        } else {
            "agreed".to_string()
        };
    };

    if winner == color {
        return "win".to_string();
    }
    match status {
        "mate" => "checkmated".to_string(),
        "resign" => "resigned".to_string(),
        "timeout" | "outoftime" => "timeout".to_string(),
        "abandon" => "abandoned".to_string(),
        _ => "lose".to_string(),
    }
}

/// Map a Lichess speed to the common time-class vocabulary.
fn time_class_for_speed(speed: &str) -> String {
    match speed {
        "rapid" | "blitz" | "bullet" => speed.to_string(),
        "classical" => "rapid".to_string(),
        "correspondence" => "daily".to_string(),
        "ultraBullet" => "bullet".to_string(),
        _ => "rapid".to_string(),
    }
}

/// Build a minimal numbered PGN from a space-separated SAN move list, with
/// opening headers so the normalizer can recover the opening.
fn minimal_pgn(moves: &str, eco: &str, opening_name: &str) -> String {
    let move_list: Vec<&str> = moves.split_whitespace().collect();
    let mut pgn_moves = Vec::new();
    for (number, pair) in move_list.chunks(2).enumerate() {
        match pair {
            [white, black] => pgn_moves.push(format!("{}. {white} {black}", number + 1)),
            [white] => pgn_moves.push(format!("{}. {white}", number + 1)),
            _ => {}
        }
    }
    format!(
        "[ECO \"{eco}\"]\n[Opening \"{opening_name}\"]\n\n{}",
        pgn_moves.join(" ")
    )
}

/// Normalize one Lichess game object into the common record shape.
/// Returns None for games missing the fields the engine needs.
fn normalize_game(game: &Value) -> Option<GameRecord> {
    let players = game.get("players")?;
    let white = players.get("white")?;
    let black = players.get("black")?;

    let player_name = |side: &Value| -> String {
        let user = side.get("user");
        user.and_then(|u| u.get("name"))
            .or_else(|| user.and_then(|u| u.get("id")))
            .and_then(|v| v.as_str())
            .unwrap_or("Anonymous")
            .to_string()
    };

    let winner = game.get("winner").and_then(|v| v.as_str());
    let status = game.get("status").and_then(|v| v.as_str()).unwrap_or("");

    let opening = game.get("opening");
    let eco = opening
        .and_then(|o| o.get("eco"))
        .and_then(|v| v.as_str())
        .unwrap_or("");
    let opening_name = opening
        .and_then(|o| o.get("name"))
        .and_then(|v| v.as_str())
        .unwrap_or("Unknown Opening");

    let pgn = match game.get("pgn").and_then(|v| v.as_str()) {
        Some(pgn) if !pgn.is_empty() => pgn.to_string(),
        _ => {
            let moves = game.get("moves").and_then(|v| v.as_str()).unwrap_or("");
            if moves.is_empty() {
                return None;
            }
            minimal_pgn(moves, eco, opening_name)
        }
    };

    let speed = game.get("speed").and_then(|v| v.as_str()).unwrap_or("");

    // Lichess reports milliseconds.
    let mut end_time = game
        .get("lastMoveAt")
        .or_else(|| game.get("createdAt"))
        .and_then(|v| v.as_i64())
        .unwrap_or(0);
    if end_time > 1_000_000_000_000 {
        end_time /= 1000;
    }

    let game_id = game.get("id").and_then(|v| v.as_str()).unwrap_or("");
    let rating = |side: &Value| side.get("rating").and_then(|v| v.as_u64()).map(|r| r as u32);

    Some(GameRecord {
        white: PlayerSide {
            username: player_name(white),
            result: result_code(winner, status, "white"),
            rating: rating(white),
        },
        black: PlayerSide {
            username: player_name(black),
            result: result_code(winner, status, "black"),
            rating: rating(black),
        },
        pgn,
        eco: Some(eco.to_string()).filter(|e| !e.is_empty()),
        url: format!("https://lichess.org/{game_id}"),
        time_class: time_class_for_speed(speed),
        end_time,
        platform: Some("lichess".to_string()),
    })
}

impl LichessClient {
    pub fn new(base: &str) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .expect("reqwest client");
        Self {
            client,
            base: base.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the last six months of rated games for a user, normalized to
    /// the common record shape. `time_classes` uses the generic vocabulary;
    /// unknown entries are rejected by the route before this call.
    pub async fn fetch_recent_games(
        &self,
        username: &str,
        time_classes: &[String],
    ) -> Result<Vec<GameRecord>, String> {
        let perf_types: Vec<&str> = time_classes
            .iter()
            .filter_map(|tc| perf_type(tc))
            .collect();

        let since_ms = (Utc::now() - chrono::Duration::days(FETCH_WINDOW_DAYS)).timestamp_millis();

        let url = format!("{}/games/user/{username}", self.base);
        let params = [
            ("since", since_ms.to_string()),
            ("perfType", perf_types.join(",")),
            ("max", MAX_GAMES.to_string()),
            ("opening", "true".to_string()),
            ("pgnInJson", "true".to_string()),
            ("moves", "true".to_string()),
            ("rated", "true".to_string()),
            ("sort", "dateDesc".to_string()),
        ];

        // Rate limit
        tokio::time::sleep(std::time::Duration::from_secs(1)).await;

        let resp = self
            .client
            .get(&url)
            .query(&params)
            .header("Accept", "application/x-ndjson")
            .send()
            .await
            .map_err(|e| format!("Request error: {e}"))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err("User not found".to_string());
        }
        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err("Rate limited by Lichess".to_string());
        }
        if !resp.status().is_success() {
            return Err(format!("HTTP {}", resp.status()));
        }

        let text = resp
            .text()
            .await
            .map_err(|e| format!("Body read error: {e}"))?;

        let mut results = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<Value>(line) {
                Ok(game) => {
                    if let Some(record) = normalize_game(&game) {
                        results.push(record);
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to parse Lichess game JSON: {e}");
                }
            }
        }

        Ok(results)
    }

    /// Check whether a username exists on Lichess.
    pub async fn user_exists(&self, username: &str) -> Result<bool, String> {
        let url = format!("{}/user/{username}", self.base);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| format!("User check request error: {e}"))?;
        Ok(resp.status() != reqwest::StatusCode::NOT_FOUND)
    }
}
