//! The statistics accumulator and the fold over game records.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::endgame;
use crate::normalize;
use crate::phase::{self, GamePhase};
use crate::record::{GameRecord, NormalizedGame, Outcome};
use crate::streak::{self, Streak};

/// Losses under this many moves are flagged as quick collapses.
const QUICK_COLLAPSE_MOVES: u32 = 25;
/// Capture markers needed to flag a loss as a tactical game.
const TACTICAL_CAPTURE_FLOOR: u32 = 8;
/// Sample games retained per endgame-type bucket.
const ENDGAME_SAMPLE_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ColorRecord {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

impl ColorRecord {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Loss => self.losses += 1,
            Outcome::Draw => self.draws += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.wins + self.losses + self.draws
    }

    /// Win rate in percent, 0 when no games were played.
    pub fn win_rate(&self) -> f64 {
        percentage(self.wins, self.total())
    }
}

/// Rate in percent with a zero-denominator guard.
pub fn percentage(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        0.0
    } else {
        round1(part as f64 / whole as f64 * 100.0)
    }
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningStats {
    pub name: String,
    pub white: ColorRecord,
    pub black: ColorRecord,
}

impl OpeningStats {
    pub fn combined(&self) -> ColorRecord {
        ColorRecord {
            wins: self.white.wins + self.black.wins,
            losses: self.white.losses + self.black.losses,
            draws: self.white.draws + self.black.draws,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseLosses {
    pub opening: u32,
    pub middlegame: u32,
    pub endgame: u32,
}

impl PhaseLosses {
    pub fn total(&self) -> u32 {
        self.opening + self.middlegame + self.endgame
    }

    /// The phase with the most losses; ties resolve in opening → middlegame
    /// → endgame order.
    pub fn worst(&self) -> GamePhase {
        let mut worst = (GamePhase::Opening, self.opening);
        for candidate in [
            (GamePhase::Middlegame, self.middlegame),
            (GamePhase::Endgame, self.endgame),
        ] {
            if candidate.1 > worst.1 {
                worst = candidate;
            }
        }
        worst.0
    }
}

/// A denormalized loss worth manual review. Membership in the review buckets
/// is decided by independent predicates; one game can land in several.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewGame {
    pub opponent: String,
    pub opening: String,
    pub move_count: u32,
    pub time_class: String,
    pub date: i64,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captures: Option<u32>,
}

impl ReviewGame {
    fn from_game(game: &NormalizedGame) -> Self {
        ReviewGame {
            opponent: game.opponent.clone(),
            opening: game.opening_name.clone(),
            move_count: game.move_count,
            time_class: game.time_class.clone(),
            date: game.end_time,
            url: game.url.clone(),
            captures: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewBuckets {
    pub quick_collapses: Vec<ReviewGame>,
    pub opening_disasters: Vec<ReviewGame>,
    pub middlegame_blunders: Vec<ReviewGame>,
    pub tactical_games: Vec<ReviewGame>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndgameLossBucket {
    pub count: u32,
    pub sample_games: Vec<ReviewGame>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct OutcomeCounts {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

impl OutcomeCounts {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Loss => self.losses += 1,
            Outcome::Draw => self.draws += 1,
        }
    }
}

/// Per-time-control outcome counts with the time-trouble split.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeClassStats {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    /// Games whose own result carried a timeout/abandonment marker.
    pub timeout_losses: u32,
    /// Wins where the opponent's result carried a timeout marker.
    pub timeout_wins: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentGame {
    pub outcome: Outcome,
    pub end_time: i64,
    pub opponent: String,
    pub url: String,
}

/// The aggregate performance profile for one analysis run.
///
/// Created fresh per run, mutated monotonically while folding games, and
/// read-only once returned. Invariant: `wins + losses + draws == total_games`
/// and every per-color/per-opening/per-hour/per-time-control counter sums to
/// the same totals.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_games: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub white: ColorRecord,
    pub black: ColorRecord,
    pub openings: HashMap<String, OpeningStats>,
    pub phase_losses: PhaseLosses,
    pub endgame_losses: HashMap<String, EndgameLossBucket>,
    pub hourly: BTreeMap<u32, OutcomeCounts>,
    pub time_classes: HashMap<String, TimeClassStats>,
    /// Losses whose own result carried a timeout marker, across all games.
    pub timeout_losses: u32,
    /// All games, sorted most recent first after the fold.
    pub recent_games: Vec<RecentGame>,
    pub streaks: Vec<Streak>,
    pub review: ReviewBuckets,
}

impl Statistics {
    /// Fold one normalized game into the aggregate.
    fn record_game(&mut self, game: &NormalizedGame) {
        self.total_games += 1;
        match game.outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Loss => self.losses += 1,
            Outcome::Draw => self.draws += 1,
        }

        if game.is_perspective_white {
            self.white.record(game.outcome);
        } else {
            self.black.record(game.outcome);
        }

        let opening = self
            .openings
            .entry(game.opening_key.clone())
            .or_insert_with(|| OpeningStats {
                name: game.opening_name.clone(),
                white: ColorRecord::default(),
                black: ColorRecord::default(),
            });
        if game.is_perspective_white {
            opening.white.record(game.outcome);
        } else {
            opening.black.record(game.outcome);
        }

        self.hourly
            .entry(game.hour_of_day)
            .or_default()
            .record(game.outcome);

        let tc = self.time_classes.entry(game.time_class.clone()).or_default();
        match game.outcome {
            Outcome::Win => tc.wins += 1,
            Outcome::Loss => tc.losses += 1,
            Outcome::Draw => tc.draws += 1,
        }
        if game.lost_on_timeout {
            tc.timeout_losses += 1;
            self.timeout_losses += 1;
        }
        if game.won_on_timeout {
            tc.timeout_wins += 1;
        }

        self.recent_games.push(RecentGame {
            outcome: game.outcome,
            end_time: game.end_time,
            opponent: game.opponent.clone(),
            url: game.url.clone(),
        });

        if game.outcome == Outcome::Loss {
            self.record_loss(game);
        }
    }

    fn record_loss(&mut self, game: &NormalizedGame) {
        let phase = phase::classify_loss(game);
        match phase {
            GamePhase::Opening => self.phase_losses.opening += 1,
            GamePhase::Middlegame => self.phase_losses.middlegame += 1,
            GamePhase::Endgame => self.phase_losses.endgame += 1,
        }

        if phase == GamePhase::Endgame {
            let endgame_type = endgame::classify(&game.movetext);
            let bucket = self
                .endgame_losses
                .entry(endgame_type.name().to_string())
                .or_default();
            bucket.count += 1;
            if bucket.sample_games.len() < ENDGAME_SAMPLE_LIMIT {
                bucket.sample_games.push(ReviewGame::from_game(game));
            }
        }

        // Review buckets are independent predicates; a game may land in
        // several or none.
        if game.move_count < QUICK_COLLAPSE_MOVES {
            self.review.quick_collapses.push(ReviewGame::from_game(game));
        }
        if game.move_count <= phase::OPENING_MOVE_LIMIT {
            self.review.opening_disasters.push(ReviewGame::from_game(game));
        }
        if game.is_resignation
            && game.move_count > phase::OPENING_MOVE_LIMIT
            && game.move_count <= phase::MIDDLEGAME_MOVE_LIMIT
        {
            self.review.middlegame_blunders.push(ReviewGame::from_game(game));
        }
        if game.capture_count >= TACTICAL_CAPTURE_FLOOR {
            let mut review = ReviewGame::from_game(game);
            review.captures = Some(game.capture_count);
            self.review.tactical_games.push(review);
        }
    }

    /// Sort recency-dependent views and derive streaks. Counters are already
    /// order-independent; only this step is order-sensitive.
    fn finish(&mut self) {
        self.recent_games.sort_by_key(|g| std::cmp::Reverse(g.end_time));
        self.streaks = streak::detect(&self.recent_games);
    }
}

/// Run the engine: normalize and fold every record for `username`, then
/// derive the recency views. Each call owns its accumulator; concurrent runs
/// share nothing.
pub fn analyze(records: &[GameRecord], username: &str) -> Statistics {
    let mut stats = Statistics::default();
    for record in records {
        let game = normalize::normalize(record, username);
        stats.record_game(&game);
    }
    stats.finish();
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::PlayerSide;

    fn record(my_result: &str, their_result: &str, pgn: &str, end_time: i64) -> GameRecord {
        GameRecord {
            white: PlayerSide {
                username: "Hero".to_string(),
                result: my_result.to_string(),
                rating: None,
            },
            black: PlayerSide {
                username: "Villain".to_string(),
                result: their_result.to_string(),
                rating: None,
            },
            pgn: pgn.to_string(),
            eco: None,
            url: String::new(),
            time_class: "blitz".to_string(),
            end_time,
            platform: None,
        }
    }

    fn pgn_with_moves(n: u32) -> String {
        (1..=n)
            .map(|i| format!("{i}. e4 e5"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_totals_invariant() {
        let records = vec![
            record("win", "resigned", &pgn_with_moves(30), 100),
            record("resigned", "win", &pgn_with_moves(20), 200),
            record("agreed", "agreed", &pgn_with_moves(50), 300),
        ];
        let stats = analyze(&records, "Hero");

        assert_eq!(stats.total_games, 3);
        assert_eq!(stats.wins + stats.losses + stats.draws, stats.total_games);
        assert_eq!(
            stats.white.total() + stats.black.total(),
            stats.total_games
        );

        let hourly_total: u32 = stats
            .hourly
            .values()
            .map(|c| c.wins + c.losses + c.draws)
            .sum();
        assert_eq!(hourly_total, stats.total_games);

        let tc_total: u32 = stats
            .time_classes
            .values()
            .map(|c| c.wins + c.losses + c.draws)
            .sum();
        assert_eq!(tc_total, stats.total_games);
    }

    #[test]
    fn test_every_loss_attributed_to_exactly_one_phase() {
        let records = vec![
            record("resigned", "win", &pgn_with_moves(10), 100),
            record("resigned", "win", &pgn_with_moves(30), 200),
            record("checkmated", "win", &pgn_with_moves(60), 300),
        ];
        let stats = analyze(&records, "Hero");
        assert_eq!(stats.phase_losses.total(), stats.losses);
        assert_eq!(stats.phase_losses.opening, 1);
        assert_eq!(stats.phase_losses.middlegame, 1);
        assert_eq!(stats.phase_losses.endgame, 1);
    }

    #[test]
    fn test_endgame_buckets_sum_to_endgame_losses() {
        let records = vec![
            record("checkmated", "win", &pgn_with_moves(55), 100),
            record("resigned", "win", &pgn_with_moves(60), 200),
        ];
        let stats = analyze(&records, "Hero");
        let bucket_total: u32 = stats.endgame_losses.values().map(|b| b.count).sum();
        assert_eq!(bucket_total, stats.phase_losses.endgame);
    }

    #[test]
    fn test_counters_order_independent() {
        let mut records = vec![
            record("win", "timeout", &pgn_with_moves(30), 100),
            record("resigned", "win", &pgn_with_moves(12), 200),
            record("agreed", "agreed", &pgn_with_moves(45), 300),
            record("checkmated", "win", &pgn_with_moves(50), 400),
        ];
        let forward = analyze(&records, "Hero");
        records.reverse();
        let backward = analyze(&records, "Hero");

        assert_eq!(forward.wins, backward.wins);
        assert_eq!(forward.losses, backward.losses);
        assert_eq!(forward.draws, backward.draws);
        assert_eq!(forward.phase_losses.opening, backward.phase_losses.opening);
        assert_eq!(
            forward.phase_losses.middlegame,
            backward.phase_losses.middlegame
        );
        assert_eq!(forward.phase_losses.endgame, backward.phase_losses.endgame);
        assert_eq!(forward.timeout_losses, backward.timeout_losses);
        // Recency views sort by date, so they agree too.
        assert_eq!(forward.recent_games.len(), backward.recent_games.len());
        assert_eq!(forward.recent_games[0].end_time, 400);
        assert_eq!(backward.recent_games[0].end_time, 400);
    }

    #[test]
    fn test_opening_entry_created_on_first_sight() {
        let pgn = format!(
            "[ECO \"B20\"]\n[ECOUrl \"https://www.chess.com/openings/Sicilian-Defense\"]\n\n{}",
            pgn_with_moves(25)
        );
        let records = vec![
            record("win", "resigned", &pgn, 100),
            record("resigned", "win", &pgn, 200),
        ];
        let stats = analyze(&records, "Hero");
        let opening = stats.openings.get("B20").expect("opening entry");
        assert_eq!(opening.name, "Sicilian Defense");
        assert_eq!(opening.white.wins, 1);
        assert_eq!(opening.white.losses, 1);
    }

    #[test]
    fn test_review_buckets_are_not_exclusive() {
        // A 12-move resignation loss with 9 captures: quick collapse,
        // opening disaster, and tactical — but not a middlegame blunder.
        let pgn = "1. e4 d5 2. exd5 Qxd5 3. Nc3 Qxd2 4. Qxd2 axb1 5. Qxb1 \
                   bxa2 6. Qxa2 cxb2 7. Qxb2 e5 8. g3 e4 9. Bg2 e3 10. Bxe4 \
                   exf2+ 11. Kxf2 f5 12. Nf3 fxe4";
        let records = vec![record("resigned", "win", pgn, 100)];
        let stats = analyze(&records, "Hero");

        assert_eq!(stats.review.quick_collapses.len(), 1);
        assert_eq!(stats.review.opening_disasters.len(), 1);
        assert!(stats.review.middlegame_blunders.is_empty());
        assert_eq!(stats.review.tactical_games.len(), 1);
        let captures = stats.review.tactical_games[0].captures.unwrap();
        assert!(captures >= 8, "expected >= 8 captures, got {captures}");
    }

    #[test]
    fn test_middlegame_blunder_bucket() {
        let records = vec![record("resigned", "win", &pgn_with_moves(30), 100)];
        let stats = analyze(&records, "Hero");
        assert_eq!(stats.review.middlegame_blunders.len(), 1);
        // 30 moves is not a quick collapse or opening disaster.
        assert!(stats.review.quick_collapses.is_empty());
        assert!(stats.review.opening_disasters.is_empty());
    }

    #[test]
    fn test_timeout_split_per_time_class() {
        let records = vec![
            record("win", "timeout", &pgn_with_moves(30), 100),
            record("timeout", "win", &pgn_with_moves(30), 200),
            record("win", "resigned", &pgn_with_moves(30), 300),
        ];
        let stats = analyze(&records, "Hero");
        let tc = stats.time_classes.get("blitz").expect("blitz bucket");
        assert_eq!(tc.timeout_wins, 1);
        assert_eq!(tc.timeout_losses, 1);
        assert_eq!(stats.timeout_losses, 1);
    }

    #[test]
    fn test_zero_games_degenerate_output() {
        let stats = analyze(&[], "Hero");
        assert_eq!(stats.total_games, 0);
        assert!(stats.openings.is_empty());
        assert!(stats.streaks.is_empty());
        assert!(stats.recent_games.is_empty());
    }

    #[test]
    fn test_endgame_sample_games_capped() {
        let records: Vec<GameRecord> = (0..5)
            .map(|i| record("checkmated", "win", &pgn_with_moves(60), i * 100))
            .collect();
        let stats = analyze(&records, "Hero");
        let bucket_total: u32 = stats.endgame_losses.values().map(|b| b.count).sum();
        assert_eq!(bucket_total, 5);
        for bucket in stats.endgame_losses.values() {
            assert!(bucket.sample_games.len() <= ENDGAME_SAMPLE_LIMIT);
        }
    }
}
