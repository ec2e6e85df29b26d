//! Run-length streak detection over recent results.

use serde::{Deserialize, Serialize};

use crate::record::Outcome;
use crate::stats::RecentGame;

/// How many of the most recent games the detector looks at.
pub const STREAK_WINDOW: usize = 20;
/// Runs shorter than this are discarded.
pub const MIN_STREAK_LEN: usize = 3;

/// A run of consecutive same-outcome games, most recent first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Streak {
    pub outcome: Outcome,
    pub count: u32,
    pub games: Vec<RecentGame>,
}

/// Scan the recent-games list (sorted most recent first) for runs of
/// same-outcome games. Plain run-length encoding with a minimum-length
/// filter; a trailing run touching the window boundary still counts.
pub fn detect(recent: &[RecentGame]) -> Vec<Streak> {
    let window = &recent[..recent.len().min(STREAK_WINDOW)];

    let mut streaks = Vec::new();
    let mut run: Vec<RecentGame> = Vec::new();

    for game in window {
        if run.last().is_some_and(|last| last.outcome != game.outcome) {
            close_run(&mut streaks, std::mem::take(&mut run));
        }
        run.push(game.clone());
    }
    close_run(&mut streaks, run);

    streaks
}

fn close_run(streaks: &mut Vec<Streak>, run: Vec<RecentGame>) {
    if run.len() >= MIN_STREAK_LEN {
        streaks.push(Streak {
            outcome: run[0].outcome,
            count: run.len() as u32,
            games: run,
        });
    }
}
