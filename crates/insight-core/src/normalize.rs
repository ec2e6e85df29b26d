//! Record normalization — raw platform record to per-game facts.

use std::sync::LazyLock;

use chrono::{TimeZone, Timelike, Utc};
use regex::Regex;

use crate::notation;
use crate::record::{GameRecord, NormalizedGame, Outcome};

pub const UNKNOWN_OPENING_NAME: &str = "Unknown Opening";
pub const UNKNOWN_OPENING_KEY: &str = "Unknown";

// Platforms encode many terminal states ("timeout", "abandoned", "resigned",
// "checkmated", "stalemate", "insufficient", ...). Only an explicit "lose"
// code or a resignation/checkmate marker counts as a loss; everything else
// that is not "win" falls through to draw. Deliberately permissive substring
// matching — tightening it would silently misclassify result strings from
// either platform.
const LOSS_MARKERS: [&str; 2] = ["resign", "checkmate"];
const TIMEOUT_MARKERS: [&str; 2] = ["timeout", "abandon"];

static ECO_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\[ECOUrl\s+"[^"]*/([^"]+)"\]"#).unwrap());
static ECO_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\[ECO\s+"([^"]+)"\]"#).unwrap());
static OPENING_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\[Opening\s+"([^"]+)"\]"#).unwrap());

/// Map the perspective side's raw result code to an outcome.
pub fn outcome_from_result(result: &str) -> Outcome {
    if result == "win" {
        Outcome::Win
    } else if result == "lose" || LOSS_MARKERS.iter().any(|m| result.contains(m)) {
        Outcome::Loss
    } else {
        Outcome::Draw
    }
}

fn contains_timeout_marker(result: &str) -> bool {
    TIMEOUT_MARKERS.iter().any(|m| result.contains(m))
}

/// "kings-indian-defense" -> "Kings Indian Defense".
fn title_case_slug(slug: &str) -> String {
    slug.split('-')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Display name preference: opening-URL slug, then `Opening` header, then the
/// unknown sentinel.
fn opening_name(pgn: &str) -> String {
    if let Some(cap) = ECO_URL_RE.captures(pgn) {
        return title_case_slug(&cap[1]);
    }
    if let Some(cap) = OPENING_HEADER_RE.captures(pgn) {
        return cap[1].to_string();
    }
    UNKNOWN_OPENING_NAME.to_string()
}

/// Opening key: the record's ECO-like identifier, else the `ECO` header, else
/// the unknown sentinel.
fn opening_key(record: &GameRecord) -> String {
    if let Some(eco) = record.eco.as_deref().filter(|e| !e.is_empty()) {
        return eco.to_string();
    }
    if let Some(cap) = ECO_HEADER_RE.captures(&record.pgn) {
        return cap[1].to_string();
    }
    UNKNOWN_OPENING_KEY.to_string()
}

fn hour_of_day(end_time: i64) -> u32 {
    Utc.timestamp_opt(end_time, 0)
        .single()
        .map(|dt| dt.hour())
        .unwrap_or(0)
}

/// Derive per-game facts for the given user. Pure function of its inputs;
/// missing or empty move text degrades to zero counts rather than failing.
pub fn normalize(record: &GameRecord, username: &str) -> NormalizedGame {
    let is_white = record.white.username.eq_ignore_ascii_case(username);
    let (mine, theirs) = if is_white {
        (&record.white, &record.black)
    } else {
        (&record.black, &record.white)
    };

    let my_result = mine.result.to_ascii_lowercase();
    let their_result = theirs.result.to_ascii_lowercase();

    let movetext = notation::movetext(&record.pgn);

    NormalizedGame {
        is_perspective_white: is_white,
        outcome: outcome_from_result(&my_result),
        opening_key: opening_key(record),
        opening_name: opening_name(&record.pgn),
        move_count: notation::count_move_numbers(&movetext),
        hour_of_day: hour_of_day(record.end_time),
        time_class: record.time_class.clone(),
        lost_on_timeout: contains_timeout_marker(&my_result),
        won_on_timeout: contains_timeout_marker(&their_result),
        is_resignation: my_result.contains("resign"),
        is_checkmate: my_result.contains("checkmate"),
        capture_count: notation::count_captures(&movetext),
        movetext,
        opponent: theirs.username.clone(),
        end_time: record.end_time,
        url: record.url.clone(),
    }
}
