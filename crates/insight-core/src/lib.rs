//! Heuristic analysis of chess game records.
//!
//! One pass over a user's raw game records derives a performance profile:
//! win/loss/draw breakdowns by color, time control, and hour of day; loss
//! attribution by game phase; endgame-type classification; streak detection;
//! review-game buckets; and a weakness synthesis payload for study-plan
//! generation. Classification is deliberately heuristic — free-text pattern
//! matching over move notation, not position reconstruction — and never
//! fails: unclassifiable input falls back to named sentinels.

pub mod endgame;
pub mod insights;
pub mod normalize;
pub mod notation;
pub mod phase;
pub mod record;
pub mod stats;
pub mod streak;

pub use insights::{synthesize, StudyPlanSummary};
pub use record::{GameRecord, NormalizedGame, Outcome, PlayerSide};
pub use stats::{analyze, Statistics};
