//! Endgame-type classification by piece composition.
//!
//! Works off move-pattern counts in the final chunk window of the game
//! rather than a reconstructed position. Rules are ordered; later rules are
//! only reachable when earlier ones fail, which matters because piece types
//! commonly co-occur in the tail.

use serde::{Deserialize, Serialize};

use crate::notation::{self, PieceActivity, TAIL_WINDOW};

/// Pawn or king moves needed for a quiet tail to read as a pawn endgame.
const PAWN_KING_FLOOR: u32 = 3;

/// Piece-composition category for a true-endgame loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndgameType {
    PawnEndgame,
    QueenEndgame,
    QueenVsRook,
    QueenMinorPiece,
    RookEndgame,
    RookMinorPiece,
    BishopVsKnight,
    BishopEndgame,
    KnightEndgame,
    ComplexPosition,
    Unknown,
}

impl EndgameType {
    pub fn name(&self) -> &'static str {
        match self {
            EndgameType::PawnEndgame => "Pawn Endgame",
            EndgameType::QueenEndgame => "Queen Endgame",
            EndgameType::QueenVsRook => "Queen vs Rook",
            EndgameType::QueenMinorPiece => "Queen + Minor Piece",
            EndgameType::RookEndgame => "Rook Endgame",
            EndgameType::RookMinorPiece => "Rook + Minor Piece",
            EndgameType::BishopVsKnight => "Bishop vs Knight",
            EndgameType::BishopEndgame => "Bishop Endgame",
            EndgameType::KnightEndgame => "Knight Endgame",
            EndgameType::ComplexPosition => "Complex Position",
            EndgameType::Unknown => "Unknown",
        }
    }
}

/// Classify the tail of a lost endgame from its movetext.
/// Games with no recognizable moves at all classify as `Unknown`.
pub fn classify(movetext: &str) -> EndgameType {
    let moves = notation::san_moves(movetext);
    if moves.is_empty() {
        return EndgameType::Unknown;
    }
    classify_window(notation::tail_activity(&moves, TAIL_WINDOW))
}

fn classify_window(a: PieceActivity) -> EndgameType {
    let pieces = a.queen + a.rook + a.bishop + a.knight;

    if pieces == 0 && (a.pawn >= PAWN_KING_FLOOR || a.king >= PAWN_KING_FLOOR) {
        return EndgameType::PawnEndgame;
    }
    if a.queen >= 2 && a.rook == 0 && a.bishop == 0 && a.knight == 0 {
        return EndgameType::QueenEndgame;
    }
    if a.queen >= 1 && a.rook >= 1 {
        return EndgameType::QueenVsRook;
    }
    if a.queen >= 1 && (a.bishop >= 1 || a.knight >= 1) {
        return EndgameType::QueenMinorPiece;
    }
    if a.rook >= 2 && a.queen == 0 {
        return EndgameType::RookEndgame;
    }
    if a.rook >= 1 && a.queen == 0 && a.bishop == 0 && a.knight == 0 {
        return EndgameType::RookEndgame;
    }
    if a.rook == 1 && a.queen == 0 && (a.bishop >= 1 || a.knight >= 1) {
        return EndgameType::RookMinorPiece;
    }
    if a.bishop >= 1 && a.knight >= 1 && a.rook == 0 && a.queen == 0 {
        return EndgameType::BishopVsKnight;
    }
    if a.bishop >= 1 && a.knight == 0 && a.rook == 0 && a.queen == 0 {
        return EndgameType::BishopEndgame;
    }
    if a.knight >= 1 && a.bishop == 0 && a.rook == 0 && a.queen == 0 {
        return EndgameType::KnightEndgame;
    }
    EndgameType::ComplexPosition
}
