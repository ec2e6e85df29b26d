//! Phase attribution for lost games.
//!
//! Move count is a poor proxy for game phase near long tactical collapses, so
//! the endgame boundary carries a material-imbalance override: a loss in the
//! 41–49 move range that still looks materially or tactically unbalanced is
//! attributed to the middlegame rather than a clean technical ending. No
//! ground-truth material count is computed; games that are long but never
//! reach level material can still be misattributed.

use serde::{Deserialize, Serialize};

use crate::notation;
use crate::record::NormalizedGame;

/// Losses at or below this many moves are opening losses.
pub const OPENING_MOVE_LIMIT: u32 = 15;
/// Losses at or below this many moves (and above the opening limit) are
/// middlegame losses.
pub const MIDDLEGAME_MOVE_LIMIT: u32 = 40;
/// At or past this move count the override never fires; material is assumed
/// to have resolved.
const OVERRIDE_MOVE_CEILING: u32 = 50;
/// Capture markers needed for a resignation to read as a tactical collapse.
const OVERRIDE_CAPTURE_FLOOR: u32 = 8;
/// Character window inspected for heavy-piece activity before a checkmate.
const OVERRIDE_TAIL_CHARS: usize = 500;
/// Queen or rook patterns needed in the tail window.
const OVERRIDE_HEAVY_PIECE_FLOOR: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    Opening,
    Middlegame,
    Endgame,
}

impl GamePhase {
    pub fn name(&self) -> &'static str {
        match self {
            GamePhase::Opening => "Opening",
            GamePhase::Middlegame => "Middlegame",
            GamePhase::Endgame => "Endgame",
        }
    }
}

/// True when a long loss still reads as materially/tactically unbalanced:
/// a resignation mid-exchange, or a checkmate with multiple queens or rooks
/// active near the end.
fn material_imbalance(game: &NormalizedGame) -> bool {
    if game.is_resignation && game.capture_count >= OVERRIDE_CAPTURE_FLOOR {
        return true;
    }
    if game.is_checkmate {
        let tail = notation::tail_chars(&game.movetext, OVERRIDE_TAIL_CHARS);
        return notation::queen_activity(tail) >= OVERRIDE_HEAVY_PIECE_FLOOR
            || notation::rook_activity(tail) >= OVERRIDE_HEAVY_PIECE_FLOOR;
    }
    false
}

/// Attribute a lost game to a phase. Callers only invoke this for losses.
pub fn classify_loss(game: &NormalizedGame) -> GamePhase {
    if game.move_count <= OPENING_MOVE_LIMIT {
        return GamePhase::Opening;
    }
    if game.move_count <= MIDDLEGAME_MOVE_LIMIT {
        return GamePhase::Middlegame;
    }
    if game.move_count < OVERRIDE_MOVE_CEILING && material_imbalance(game) {
        return GamePhase::Middlegame;
    }
    GamePhase::Endgame
}
