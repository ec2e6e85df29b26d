//! Study-plan generation via an OpenAI-compatible chat-completions API.
//!
//! The engine's summary payload is rendered into a coaching prompt; the
//! remote model writes the plan. Prompt construction is pure and tested;
//! only `generate` talks to the network.

use reqwest::Client;
use serde_json::{json, Value};

use insight_core::{stats::percentage, StudyPlanSummary};

const SYSTEM_MESSAGE: &str = "You are a professional chess coach with expertise in player \
    development and personalized training plans. You create detailed, actionable study plans \
    based on game analysis data.";

/// Color win-rate gap (percentage points) that earns an imbalance warning.
const IMBALANCE_WARNING_POINTS: f64 = 12.0;
/// Share of losses on time that earns a critical warning.
const TIME_PRESSURE_WARNING_SHARE: f64 = 0.15;

const APPROVED_RESOURCES: &str = "\
- Tactics Training: https://lichess.org/training (free unlimited puzzles)
- Endgame Puzzles: https://lichess.org/training/endgame
- Lichess Practice Positions: https://lichess.org/practice (common positions to master)
- Lichess Opening Explorer: https://lichess.org/opening
- Lichess Studies: https://lichess.org/study (community studies)
- Chess.com Lessons: https://www.chess.com/lessons
- Chess.com Puzzles: https://www.chess.com/puzzles
- Chess.com Endgame Practice: https://www.chess.com/practice/drills/endgame-practice
- Chess.com Opening Explorer: https://www.chess.com/openings
- YouTube — GM Daniel Naroditsky: https://www.youtube.com/@DanielNaroditskyGM (endgames, rating climbs, all levels)
- YouTube — John Bartholomew (IM): https://www.youtube.com/@JohnBartholomewChess (structured lessons, climbing ratings)
- YouTube — Hanging Pawns (Stjepan Tomic): https://www.youtube.com/@HangingPawns (strategy, middlegame, advanced)
- YouTube — St. Louis Chess Club: https://www.youtube.com/@STLChessClub (GM lectures, all topics)
- Book: \"Silman's Complete Endgame Course\" by Jeremy Silman (endgames)
- Book: \"Logical Chess: Move by Move\" by Irving Chernev (game understanding)
- Book: \"My System\" by Aron Nimzowitsch (positional play)";

pub struct StudyPlanClient {
    client: Client,
    base: String,
    api_key: String,
    model: String,
}

/// Pick the phase with the most losses; ties resolve opening-first.
fn worst_phase(summary: &StudyPlanSummary) -> &'static str {
    let phases = [
        ("Opening", summary.opening_phase_losses),
        ("Middlegame", summary.middlegame_losses),
        ("Endgame", summary.endgame_losses),
    ];
    let mut worst = phases[0];
    for candidate in &phases[1..] {
        if candidate.1 > worst.1 {
            worst = *candidate;
        }
    }
    worst.0
}

fn bullet_list(items: &[String], fallback: &str) -> String {
    if items.is_empty() {
        format!("- {fallback}")
    } else {
        items
            .iter()
            .map(|item| format!("- {item}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Render the coaching prompt from the engine's summary payload.
pub fn build_prompt(summary: &StudyPlanSummary) -> String {
    let total_losses = summary.losses.max(1);

    let opening_pct = percentage(summary.opening_phase_losses, total_losses);
    let middlegame_pct = percentage(summary.middlegame_losses, total_losses);
    let endgame_pct = percentage(summary.endgame_losses, total_losses);
    let timeout_rate = percentage(summary.time_pressure_losses, total_losses);

    let worst_phase = worst_phase(summary);

    let white_games = summary.white_wins + summary.white_losses + summary.white_draws;
    let black_games = summary.black_wins + summary.black_losses + summary.black_draws;
    let white_win_rate = percentage(summary.white_wins, white_games);
    let black_win_rate = percentage(summary.black_wins, black_games);
    let color_imbalance = (white_win_rate - black_win_rate).abs();
    let overall_win_rate = percentage(summary.wins, summary.total_games);

    let worst_openings_text = if summary.worst_openings.is_empty() {
        "- Need more games for opening analysis".to_string()
    } else {
        let lines: Vec<String> = summary
            .worst_openings
            .iter()
            .map(|o| format!("  - {}: {}% ({})", o.name, o.win_rate, o.record))
            .collect();
        format!("Weakest Openings:\n{}", lines.join("\n"))
    };

    let endgame_types_text = if summary.specific_issues.endgame_types.is_empty() {
        "- Endgame performance acceptable".to_string()
    } else {
        let lines: Vec<String> = summary
            .specific_issues
            .endgame_types
            .iter()
            .map(|t| format!("  - {t}"))
            .collect();
        format!("Specific endgame weaknesses:\n{}", lines.join("\n"))
    };

    let weaknesses_text = bullet_list(&summary.weaknesses, "General improvement needed");
    let strengths_text = bullet_list(&summary.strengths, "Building on current foundation");

    let mut focus_areas = Vec::new();
    if summary.specific_issues.opening_problems {
        focus_areas.push("- Opening theory and principles".to_string());
    }
    if summary.specific_issues.time_pressure {
        focus_areas.push("- Time management and clock discipline".to_string());
    }
    if let Some(color) = &summary.specific_issues.color_weakness {
        focus_areas.push(format!("- {color} piece play"));
    }
    if !summary.specific_issues.endgame_types.is_empty() {
        focus_areas.push(format!(
            "- Endgame technique in: {}",
            summary.specific_issues.endgame_types.join(", ")
        ));
    }
    let focus_text = focus_areas.join("\n");

    let color_imbalance_text = if color_imbalance >= IMBALANCE_WARNING_POINTS {
        format!("- Warning: IMBALANCE DETECTED: {color_imbalance:.1}% difference")
    } else {
        String::new()
    };

    let time_pressure_text = if summary.time_pressure_losses as f64
        >= total_losses as f64 * TIME_PRESSURE_WARNING_SHARE
        && summary.time_pressure_losses > 0
    {
        "- Warning: CRITICAL TIME PRESSURE ISSUE".to_string()
    } else {
        String::new()
    };

    format!(
        "You are a professional chess coach analyzing a tournament player's performance. \
Create a detailed, actionable 4-week study plan.

COMPREHENSIVE PLAYER STATISTICS:

OVERALL PERFORMANCE:
- Total Games Analyzed: {total_games}
- Win Rate: {overall_win_rate}%
- Record: {wins}W - {losses}L - {draws}D

CRITICAL WEAKNESSES (PRIORITIZE THESE):
{weaknesses_text}

PHASE BREAKDOWN:
- Opening Phase Losses: {opening_losses} ({opening_pct}% of total losses)
- Middlegame Losses: {middlegame_losses} ({middlegame_pct}% of total losses)
- Endgame Losses: {endgame_losses} ({endgame_pct}% of total losses)
- WORST PHASE: {worst_phase}

COLOR PERFORMANCE:
- As White: {white_win_rate}% win rate ({white_wins}W - {white_losses}L - {white_draws}D)
- As Black: {black_win_rate}% win rate ({black_wins}W - {black_losses}L - {black_draws}D)
{color_imbalance_text}

TIME MANAGEMENT:
- Timeout Losses: {timeout_losses} ({timeout_rate}% of all losses)
{time_pressure_text}

OPENING REPERTOIRE:
{worst_openings_text}

ENDGAME ISSUES:
{endgame_types_text}

YOUR STRENGTHS:
{strengths_text}

SPECIFIC FOCUS AREAS IDENTIFIED:
{focus_text}

TASK: Create a comprehensive, personalized 4-week study plan that:

1. **PRIORITIZES THE MOST CRITICAL WEAKNESSES FIRST** (especially {worst_phase} phase and any critical issues)
2. Provides week-by-week breakdown with specific daily focus areas (30-60 min sessions)
3. Includes concrete, actionable tasks for each day
4. Recommends resources ONLY from the APPROVED LIST below — do NOT invent or hallucinate any URLs
5. Sets measurable improvement goals
6. Addresses time management if it's an issue
7. Balances opening study, tactical training, endgame practice, and game analysis
8. Makes it practical for someone with limited time

APPROVED RESOURCE LIST (use ONLY these links — do NOT generate any other URLs):
{resources}

IMPORTANT: When recommending YouTube channels, link to the channel URL from the list above. \
Do NOT create specific video links as they may not exist. Instead, say \"Search [channel name] for [topic]\".

Format each week clearly with:
## Week [Number]: [Theme]
### Day 1-7: Specific daily tasks
- Include exact exercises, puzzle counts, and resource recommendations from the approved list

Make this actionable and specific, not generic advice. The player needs concrete steps to improve.",
        total_games = summary.total_games,
        wins = summary.wins,
        losses = summary.losses,
        draws = summary.draws,
        opening_losses = summary.opening_phase_losses,
        middlegame_losses = summary.middlegame_losses,
        endgame_losses = summary.endgame_losses,
        timeout_losses = summary.time_pressure_losses,
        white_wins = summary.white_wins,
        white_losses = summary.white_losses,
        white_draws = summary.white_draws,
        black_wins = summary.black_wins,
        black_losses = summary.black_losses,
        black_draws = summary.black_draws,
        resources = APPROVED_RESOURCES,
    )
}

impl StudyPlanClient {
    pub fn new(base: &str, api_key: &str, model: &str) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .expect("reqwest client");
        Self {
            client,
            base: base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    /// Generate a study plan for the given summary. Returns the plan text.
    pub async fn generate(&self, summary: &StudyPlanSummary) -> Result<String, String> {
        let prompt = build_prompt(summary);

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "model": self.model,
                "messages": [
                    {"role": "system", "content": SYSTEM_MESSAGE},
                    {"role": "user", "content": prompt},
                ],
                "temperature": 0.7,
                "max_tokens": 4000,
            }))
            .send()
            .await
            .map_err(|e| format!("Request error: {e}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let detail = resp
                .json::<Value>()
                .await
                .ok()
                .and_then(|v| {
                    v.pointer("/error/message")
                        .and_then(|m| m.as_str())
                        .map(|s| s.to_string())
                })
                .unwrap_or_else(|| "Unknown error".to_string());
            return Err(format!("Upstream {status}: {detail}"));
        }

        let data: Value = resp
            .json()
            .await
            .map_err(|e| format!("Response parse error: {e}"))?;

        data.pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| "Malformed completion response".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insight_core::insights::{OpeningReport, SpecificIssues};
    use std::collections::BTreeMap;

    fn summary() -> StudyPlanSummary {
        StudyPlanSummary {
            username: "Hero".to_string(),
            total_games: 40,
            wins: 15,
            losses: 20,
            draws: 5,
            opening_phase_losses: 4,
            middlegame_losses: 10,
            endgame_losses: 6,
            time_pressure_losses: 4,
            white_wins: 10,
            white_losses: 8,
            white_draws: 2,
            black_wins: 5,
            black_losses: 12,
            black_draws: 3,
            worst_openings: vec![OpeningReport {
                name: "Sicilian Defense".to_string(),
                win_rate: 25.0,
                record: "1W-3L-0D".to_string(),
            }],
            best_openings: Vec::new(),
            endgame_types: BTreeMap::new(),
            weaknesses: vec!["Most losses come in the middlegame (10 of 20 losses)".to_string()],
            strengths: Vec::new(),
            specific_issues: SpecificIssues {
                opening_problems: true,
                time_pressure: true,
                color_weakness: Some("Black".to_string()),
                endgame_types: vec!["Rook Endgame".to_string()],
            },
        }
    }

    #[test]
    fn test_prompt_names_worst_phase() {
        let prompt = build_prompt(&summary());
        assert!(prompt.contains("WORST PHASE: Middlegame"));
    }

    #[test]
    fn test_prompt_includes_warnings() {
        let prompt = build_prompt(&summary());
        // 4 of 20 losses on time: 20% >= 15%.
        assert!(prompt.contains("CRITICAL TIME PRESSURE ISSUE"));
        // White 50% vs black 25%: over the 12-point bar.
        assert!(prompt.contains("IMBALANCE DETECTED"));
    }

    #[test]
    fn test_prompt_lists_focus_areas() {
        let prompt = build_prompt(&summary());
        assert!(prompt.contains("Opening theory and principles"));
        assert!(prompt.contains("Time management and clock discipline"));
        assert!(prompt.contains("Black piece play"));
        assert!(prompt.contains("Endgame technique in: Rook Endgame"));
    }

    #[test]
    fn test_prompt_survives_zero_losses() {
        let mut s = summary();
        s.losses = 0;
        s.time_pressure_losses = 0;
        let prompt = build_prompt(&s);
        assert!(prompt.contains("Timeout Losses: 0"));
    }

    #[test]
    fn test_worst_phase_tie_prefers_opening() {
        let mut s = summary();
        s.opening_phase_losses = 5;
        s.middlegame_losses = 5;
        s.endgame_losses = 5;
        assert_eq!(worst_phase(&s), "Opening");
    }
}
