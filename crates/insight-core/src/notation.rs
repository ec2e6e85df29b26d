//! Move-notation scanning — lightweight regex-based heuristics.
//!
//! Everything downstream (phase attribution, endgame typing, review buckets)
//! works off free-text pattern counts rather than a reconstructed move tree.
//! All patterns live here so each classification rule can be unit tested
//! against the same scanner.

use std::sync::LazyLock;

use regex::Regex;

/// Number of trailing move chunks inspected by the endgame-type classifier.
pub const TAIL_WINDOW: usize = 15;

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[[^\]]*\]").unwrap());
static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{[^}]*\}").unwrap());
static VARIATION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\([^)]*\)").unwrap());

// "12." and "12..." both start a chunk; the latter is a black-to-move
// continuation, not a new move number.
static MOVE_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+\.+").unwrap());

static SAN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[KQRBN]?[a-h]?[1-8]?x?[a-h][1-8](?:=[QRBN])?[+#]?|O-O-O|O-O").unwrap()
});

static PROMOTION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"=[QRBN]").unwrap());

// Queen/rook activity in a character window: a piece move or a promotion to
// that piece. Used by the material-imbalance override.
static QUEEN_ACTIVITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"=Q|Q[a-h]?[1-8]?x?[a-h][1-8]").unwrap());
static ROOK_ACTIVITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"=R|R[a-h]?[1-8]?x?[a-h][1-8]").unwrap());

/// Strip PGN headers, brace comments, and parenthesized variations, leaving
/// only the move list. Headers must go first: dates like `2025.01.15` would
/// otherwise count as move-number markers.
pub fn movetext(raw: &str) -> String {
    let no_headers = HEADER_RE.replace_all(raw, "");
    let no_comments = COMMENT_RE.replace_all(&no_headers, "");
    VARIATION_RE.replace_all(&no_comments, "").into_owned()
}

/// Count move-number markers (`1.`, `2.` ...) in stripped movetext.
/// Continuation markers (`12...`) are not new moves and are skipped.
/// Text with no markers yields 0.
pub fn count_move_numbers(text: &str) -> u32 {
    MOVE_NUMBER_RE
        .find_iter(text)
        .filter(|m| !m.as_str().ends_with("..."))
        .count() as u32
}

/// Count capture markers in stripped movetext.
pub fn count_captures(text: &str) -> u32 {
    text.bytes().filter(|&b| b == b'x').count() as u32
}

/// Extract SAN move chunks from stripped movetext.
pub fn san_moves(text: &str) -> Vec<String> {
    SAN_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Per-piece move-pattern counts over a chunk window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PieceActivity {
    pub queen: u32,
    pub rook: u32,
    pub bishop: u32,
    pub knight: u32,
    pub king: u32,
    pub pawn: u32,
}

/// Count piece move patterns over the last `window` chunks of `moves`.
/// Promotion annotations are stripped first so `e8=Q` counts as a pawn move,
/// not a queen move.
pub fn tail_activity(moves: &[String], window: usize) -> PieceActivity {
    let start = moves.len().saturating_sub(window);
    let mut activity = PieceActivity::default();

    for chunk in &moves[start..] {
        let stripped = PROMOTION_RE.replace(chunk, "");
        match stripped.bytes().next() {
            Some(b'Q') => activity.queen += 1,
            Some(b'R') => activity.rook += 1,
            Some(b'B') => activity.bishop += 1,
            Some(b'N') => activity.knight += 1,
            // Castling is a king move for window purposes.
            Some(b'K') | Some(b'O') => activity.king += 1,
            Some(b'a'..=b'h') => activity.pawn += 1,
            _ => {}
        }
    }

    activity
}

/// The final `n` characters of the movetext (byte-window, clamped to a char
/// boundary). Used by the material-imbalance override.
pub fn tail_chars(text: &str, n: usize) -> &str {
    let mut start = text.len().saturating_sub(n);
    while start < text.len() && !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}

/// Count queen move-or-promotion patterns in a text window.
pub fn queen_activity(window: &str) -> u32 {
    QUEEN_ACTIVITY_RE.find_iter(window).count() as u32
}

/// Count rook move-or-promotion patterns in a text window.
pub fn rook_activity(window: &str) -> u32 {
    ROOK_ACTIVITY_RE.find_iter(window).count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movetext_strips_headers_and_comments() {
        let pgn = r#"[White "Player1"]
[Date "2025.01.15"]

1. e4 {[%clk 0:02:58]} e5 2. Nf3 (2. Nc3) Nc6 1-0"#;

        let text = movetext(pgn);
        assert!(!text.contains("Player1"));
        assert!(!text.contains("clk"));
        assert!(!text.contains("Nc3"));
        assert!(text.contains("Nf3"));
    }

    #[test]
    fn test_count_move_numbers() {
        assert_eq!(count_move_numbers("1. e4 e5 2. Nf3 Nc6 3. Bb5"), 3);
        assert_eq!(count_move_numbers("no moves here"), 0);
        assert_eq!(count_move_numbers(""), 0);
    }

    #[test]
    fn test_continuation_markers_not_counted() {
        // Chess.com interleaves black continuations after clock comments.
        let text = "1. e4 1... e5 2. Nf3 2... Nc6";
        assert_eq!(count_move_numbers(text), 2);
    }

    #[test]
    fn test_header_dates_do_not_leak_into_move_count() {
        let pgn = "[Date \"2025.01.15\"]\n\n1. e4 e5";
        assert_eq!(count_move_numbers(&movetext(pgn)), 1);
    }

    #[test]
    fn test_count_captures() {
        assert_eq!(count_captures("1. e4 d5 2. exd5 Qxd5 3. Nc3"), 2);
        assert_eq!(count_captures("1. e4 e5"), 0);
    }

    #[test]
    fn test_san_moves_extraction() {
        let moves = san_moves("1. e4 e5 2. Nf3 Nc6 3. O-O");
        assert_eq!(moves, vec!["e4", "e5", "Nf3", "Nc6", "O-O"]);
    }

    #[test]
    fn test_tail_activity_counts_by_piece() {
        let moves: Vec<String> = ["Qe2", "Rd1", "Bb5", "Nf3", "Kg1", "e4", "exd5"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let activity = tail_activity(&moves, TAIL_WINDOW);
        assert_eq!(activity.queen, 1);
        assert_eq!(activity.rook, 1);
        assert_eq!(activity.bishop, 1);
        assert_eq!(activity.knight, 1);
        assert_eq!(activity.king, 1);
        assert_eq!(activity.pawn, 2);
    }

    #[test]
    fn test_tail_activity_window_limits() {
        let mut moves: Vec<String> = vec!["Qe2".to_string()];
        moves.extend((0..TAIL_WINDOW).map(|_| "e4".to_string()));
        // The queen move falls outside the window.
        let activity = tail_activity(&moves, TAIL_WINDOW);
        assert_eq!(activity.queen, 0);
        assert_eq!(activity.pawn, TAIL_WINDOW as u32);
    }

    #[test]
    fn test_promotion_counts_as_pawn_move() {
        let moves = vec!["e8=Q".to_string(), "a1=R+".to_string()];
        let activity = tail_activity(&moves, TAIL_WINDOW);
        assert_eq!(activity.queen, 0);
        assert_eq!(activity.rook, 0);
        assert_eq!(activity.pawn, 2);
    }

    #[test]
    fn test_castling_counts_as_king_move() {
        let moves = vec!["O-O".to_string(), "O-O-O".to_string()];
        let activity = tail_activity(&moves, TAIL_WINDOW);
        assert_eq!(activity.king, 2);
    }

    #[test]
    fn test_queen_rook_activity_in_window() {
        let window = "44. Qe8+ Rxe8 45. e8=Q Qd7 46. Rb1";
        assert_eq!(queen_activity(window), 3);
        assert_eq!(rook_activity(window), 2);
    }

    #[test]
    fn test_tail_chars_clamps_to_boundary() {
        let text = "abcdef";
        assert_eq!(tail_chars(text, 3), "def");
        assert_eq!(tail_chars(text, 100), "abcdef");
    }
}
