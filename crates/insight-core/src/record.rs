//! Input and normalized game shapes.

use serde::{Deserialize, Serialize};

/// One side of a game as reported by the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSide {
    pub username: String,
    /// Raw platform result code ("win", "checkmated", "resigned", "timeout",
    /// "agreed", ...). Free-form; the normalizer only substring-matches it.
    pub result: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u32>,
}

/// A raw game record in the common shape both platform clients produce.
/// Owned by the caller; the engine never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub white: PlayerSide,
    pub black: PlayerSide,
    /// Move-notation text, typically a full PGN with headers.
    #[serde(default)]
    pub pgn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eco: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub time_class: String,
    /// Game end time, epoch seconds.
    #[serde(default)]
    pub end_time: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
}

/// Game outcome from the analyzed player's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

/// Per-game facts derived once by the normalizer. Never mutated afterwards.
#[derive(Debug, Clone)]
pub struct NormalizedGame {
    pub is_perspective_white: bool,
    pub outcome: Outcome,
    pub opening_key: String,
    pub opening_name: String,
    pub move_count: u32,
    pub hour_of_day: u32,
    pub time_class: String,
    pub lost_on_timeout: bool,
    pub won_on_timeout: bool,
    /// Decisive-loss markers, used by phase attribution and review buckets.
    pub is_resignation: bool,
    pub is_checkmate: bool,
    pub capture_count: u32,
    /// Headers/comments stripped; the tail classifiers scan this.
    pub movetext: String,
    pub opponent: String,
    pub end_time: i64,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserializes_chess_com_payload() {
        // Shape as returned by the Chess.com monthly archive API; extra
        // fields are ignored, absent optional fields default.
        let json = r#"{
            "white": {"username": "Hero", "result": "win", "rating": 1500},
            "black": {"username": "Villain", "result": "checkmated", "rating": 1480},
            "pgn": "[Event \"Live Chess\"]\n\n1. e4 e5",
            "time_class": "blitz",
            "end_time": 1700000000,
            "url": "https://www.chess.com/game/live/1",
            "rules": "chess",
            "rated": true
        }"#;

        let record: GameRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.white.username, "Hero");
        assert_eq!(record.black.result, "checkmated");
        assert_eq!(record.time_class, "blitz");
        assert_eq!(record.end_time, 1_700_000_000);
        assert!(record.eco.is_none());
        assert!(record.platform.is_none());
    }

    #[test]
    fn test_minimal_payload_defaults() {
        let json = r#"{
            "white": {"username": "a", "result": "win"},
            "black": {"username": "b", "result": "lose"}
        }"#;
        let record: GameRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.pgn, "");
        assert_eq!(record.end_time, 0);
        assert_eq!(record.url, "");
    }
}
