//! Shared fixture builders for the analysis integration tests.
#![allow(dead_code)]

use insight_core::{GameRecord, PlayerSide};

pub const USER: &str = "Hero";

/// A game from the user's perspective as white.
pub fn game(my_result: &str, their_result: &str, pgn: &str, end_time: i64) -> GameRecord {
    GameRecord {
        white: PlayerSide {
            username: USER.to_string(),
            result: my_result.to_string(),
            rating: Some(1500),
        },
        black: PlayerSide {
            username: "Villain".to_string(),
            result: their_result.to_string(),
            rating: Some(1490),
        },
        pgn: pgn.to_string(),
        eco: None,
        url: format!("https://example.com/game/{end_time}"),
        time_class: "blitz".to_string(),
        end_time,
        platform: None,
    }
}

/// Same, with the user playing black.
pub fn game_as_black(my_result: &str, their_result: &str, pgn: &str, end_time: i64) -> GameRecord {
    let mut record = game(their_result, my_result, pgn, end_time);
    record.white.username = "Villain".to_string();
    record.black.username = USER.to_string();
    record
}

/// Movetext with `n` full moves of shuffling.
pub fn moves(n: u32) -> String {
    (1..=n)
        .map(|i| format!("{i}. Nf3 Nf6"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Movetext with `n` moves whose final eight moves are all king-and-pawn
/// play, enough to fill the classifier's tail window.
pub fn moves_with_pawn_tail(n: u32) -> String {
    let quiet_from = n.saturating_sub(8) + 1;
    let mut out: Vec<String> = (1..quiet_from).map(|i| format!("{i}. Nf3 Nf6")).collect();
    for i in quiet_from..=n {
        out.push(format!("{i}. Kd4 a5"));
    }
    out.join(" ")
}

/// Movetext with `n` moves and `captures` capture markers.
pub fn moves_with_captures(n: u32, captures: u32) -> String {
    let mut out = Vec::new();
    for i in 1..=n {
        if i <= captures {
            out.push(format!("{i}. Nxe5 Nf6"));
        } else {
            out.push(format!("{i}. Nf3 Nf6"));
        }
    }
    out.join(" ")
}
