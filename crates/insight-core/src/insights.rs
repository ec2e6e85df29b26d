//! Weakness/strength synthesis over a finished `Statistics` aggregate.
//!
//! Pure read: builds the human-readable weakness and strength lists plus the
//! flat machine-readable payload handed to the study-plan generator.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::phase::GamePhase;
use crate::stats::{percentage, round1, Statistics};

/// Win-rate gap between colors (percentage points) that counts as imbalance.
const COLOR_IMBALANCE_POINTS: f64 = 12.0;
/// Openings with fewer games than this are excluded from worst/best lists.
const MIN_OPENING_SAMPLE: u32 = 3;
/// Win-rate cutoff below which an opening is a weakness.
const WORST_OPENING_RATE: f64 = 40.0;
/// Win-rate cutoff at or above which an opening is a strength.
const BEST_OPENING_RATE: f64 = 55.0;
const WORST_OPENING_LIMIT: usize = 3;
const BEST_OPENING_LIMIT: usize = 2;
/// Losses in one endgame category that make it a named weakness.
const MIN_ENDGAME_CATEGORY_LOSSES: u32 = 3;
/// Share of losses on time that flags a time-management problem.
const TIME_PRESSURE_SHARE: f64 = 0.15;
/// Distinct openings at or under this, with a meaningful sample, reads as a
/// narrow repertoire.
const NARROW_REPERTOIRE_OPENINGS: usize = 3;
const NARROW_REPERTOIRE_MIN_GAMES: u32 = 20;
/// Overall or per-color win rate at or above this is worth calling out.
const STRONG_WIN_RATE: f64 = 55.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpeningReport {
    pub name: String,
    pub win_rate: f64,
    /// "3W-5L-1D" style record string.
    pub record: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EndgameReport {
    pub losses: u32,
    /// Share of all endgame losses, percent. 0 when there are none.
    pub percentage: f64,
}

/// Machine-readable issue flags for the text-generation collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecificIssues {
    #[serde(rename = "openingProblems")]
    pub opening_problems: bool,
    #[serde(rename = "timePressure")]
    pub time_pressure: bool,
    #[serde(rename = "colorWeakness", skip_serializing_if = "Option::is_none")]
    pub color_weakness: Option<String>,
    #[serde(rename = "endgameTypes")]
    pub endgame_types: Vec<String>,
}

/// Flat, JSON-compatible summary payload for the study-plan generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyPlanSummary {
    pub username: String,
    pub total_games: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub opening_phase_losses: u32,
    pub middlegame_losses: u32,
    pub endgame_losses: u32,
    pub time_pressure_losses: u32,
    pub white_wins: u32,
    pub white_losses: u32,
    pub white_draws: u32,
    pub black_wins: u32,
    pub black_losses: u32,
    pub black_draws: u32,
    pub worst_openings: Vec<OpeningReport>,
    pub best_openings: Vec<OpeningReport>,
    pub endgame_types: BTreeMap<String, EndgameReport>,
    pub weaknesses: Vec<String>,
    pub strengths: Vec<String>,
    pub specific_issues: SpecificIssues,
}

/// Derive weaknesses, strengths, and the study-plan payload from a finished
/// aggregate. No side effects beyond building the return value.
pub fn synthesize(stats: &Statistics, username: &str) -> StudyPlanSummary {
    let mut weaknesses = Vec::new();
    let mut strengths = Vec::new();
    let mut issues = SpecificIssues::default();

    // Openings, worst and best, with the sample-size floor.
    let mut sampled: Vec<(&str, f64, String, u32)> = stats
        .openings
        .values()
        .filter_map(|opening| {
            let combined = opening.combined();
            if combined.total() < MIN_OPENING_SAMPLE {
                return None;
            }
            let record = format!(
                "{}W-{}L-{}D",
                combined.wins, combined.losses, combined.draws
            );
            Some((
                opening.name.as_str(),
                combined.win_rate(),
                record,
                combined.total(),
            ))
        })
        .collect();
    // Deterministic across runs: rate, then name.
    sampled.sort_by(|a, b| {
        a.1.partial_cmp(&b.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });

    let worst_openings: Vec<OpeningReport> = sampled
        .iter()
        .filter(|(_, rate, _, _)| *rate < WORST_OPENING_RATE)
        .take(WORST_OPENING_LIMIT)
        .map(|(name, rate, record, _)| OpeningReport {
            name: name.to_string(),
            win_rate: *rate,
            record: record.clone(),
        })
        .collect();

    let best_openings: Vec<OpeningReport> = sampled
        .iter()
        .rev()
        .filter(|(_, rate, _, _)| *rate >= BEST_OPENING_RATE)
        .take(BEST_OPENING_LIMIT)
        .map(|(name, rate, record, _)| OpeningReport {
            name: name.to_string(),
            win_rate: *rate,
            record: record.clone(),
        })
        .collect();

    for (name, rate, _, total) in sampled
        .iter()
        .filter(|(_, rate, _, _)| *rate < WORST_OPENING_RATE)
        .take(WORST_OPENING_LIMIT)
    {
        weaknesses.push(format!(
            "Struggling in the {name} ({rate}% over {total} games)"
        ));
    }
    for report in &best_openings {
        strengths.push(format!(
            "Strong results with the {} ({}% win rate)",
            report.name, report.win_rate
        ));
    }

    // Phase attribution.
    let worst_phase = stats.phase_losses.worst();
    if stats.losses > 0 {
        let worst_count = match worst_phase {
            GamePhase::Opening => stats.phase_losses.opening,
            GamePhase::Middlegame => stats.phase_losses.middlegame,
            GamePhase::Endgame => stats.phase_losses.endgame,
        };
        if worst_count > 0 {
            weaknesses.push(format!(
                "Most losses come in the {} ({} of {} losses)",
                worst_phase.name().to_lowercase(),
                worst_count,
                stats.losses
            ));
        }
    }

    // Color imbalance.
    let white_rate = stats.white.win_rate();
    let black_rate = stats.black.win_rate();
    if stats.white.total() > 0 && stats.black.total() > 0 {
        let gap = (white_rate - black_rate).abs();
        if gap >= COLOR_IMBALANCE_POINTS {
            let (weak_color, weak_rate, strong_rate) = if white_rate < black_rate {
                ("White", white_rate, black_rate)
            } else {
                ("Black", black_rate, white_rate)
            };
            weaknesses.push(format!(
                "Noticeably weaker with the {} pieces ({weak_rate}% vs {strong_rate}% win rate)",
                weak_color.to_lowercase()
            ));
            issues.color_weakness = Some(weak_color.to_string());
        }
    }

    // Repertoire breadth.
    let breadth = stats.openings.len();
    if stats.total_games >= NARROW_REPERTOIRE_MIN_GAMES && breadth <= NARROW_REPERTOIRE_OPENINGS {
        weaknesses.push(format!(
            "Narrow opening repertoire ({breadth} distinct openings in {} games)",
            stats.total_games
        ));
    }

    // Endgame-type weaknesses.
    let endgame_total = stats.phase_losses.endgame;
    let mut endgame_types = BTreeMap::new();
    for (label, bucket) in &stats.endgame_losses {
        if bucket.count >= MIN_ENDGAME_CATEGORY_LOSSES {
            endgame_types.insert(
                label.clone(),
                EndgameReport {
                    losses: bucket.count,
                    percentage: percentage(bucket.count, endgame_total),
                },
            );
        }
    }
    for (label, report) in &endgame_types {
        weaknesses.push(format!(
            "{} technique needs work ({} losses)",
            label, report.losses
        ));
    }
    issues.endgame_types = endgame_types.keys().cloned().collect();

    // Time management.
    if stats.losses > 0
        && stats.timeout_losses as f64 >= stats.losses as f64 * TIME_PRESSURE_SHARE
        && stats.timeout_losses > 0
    {
        weaknesses.push(format!(
            "Frequent losses on time ({} of {} losses)",
            stats.timeout_losses, stats.losses
        ));
        issues.time_pressure = true;
    }

    issues.opening_problems = worst_phase == GamePhase::Opening || !worst_openings.is_empty();

    // Strengths beyond openings.
    let overall_rate = percentage(stats.wins, stats.total_games);
    if stats.total_games > 0 && overall_rate >= STRONG_WIN_RATE {
        strengths.push(format!("Healthy overall win rate ({overall_rate}%)"));
    }
    for (color, record) in [("white", &stats.white), ("black", &stats.black)] {
        if record.total() >= MIN_OPENING_SAMPLE && record.win_rate() >= STRONG_WIN_RATE {
            strengths.push(format!(
                "Confident with the {color} pieces ({}% win rate)",
                record.win_rate()
            ));
        }
    }

    StudyPlanSummary {
        username: username.to_string(),
        total_games: stats.total_games,
        wins: stats.wins,
        losses: stats.losses,
        draws: stats.draws,
        opening_phase_losses: stats.phase_losses.opening,
        middlegame_losses: stats.phase_losses.middlegame,
        endgame_losses: stats.phase_losses.endgame,
        time_pressure_losses: stats.timeout_losses,
        white_wins: stats.white.wins,
        white_losses: stats.white.losses,
        white_draws: stats.white.draws,
        black_wins: stats.black.wins,
        black_losses: stats.black.losses,
        black_draws: stats.black.draws,
        worst_openings,
        best_openings,
        endgame_types,
        weaknesses,
        strengths,
        specific_issues: issues,
    }
}

/// Color win-rate gap in percentage points; 0 when either side is unplayed.
pub fn color_imbalance(stats: &Statistics) -> f64 {
    if stats.white.total() == 0 || stats.black.total() == 0 {
        return 0.0;
    }
    round1((stats.white.win_rate() - stats.black.win_rate()).abs())
}
