use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::Value as JsonValue;

use insight_core::{analyze, synthesize, GameRecord};

use crate::clients::{chess_com::ChessComClient, lichess::LichessClient};
use crate::config::Config;
use crate::error::AppError;
use crate::routes::games::{parse_time_classes, validate_username, GamesQuery};

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    pub username: String,
    pub games: Vec<GameRecord>,
}

/// POST /api/analyze — run the engine over caller-supplied records.
pub async fn analyze_games(
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<JsonValue>, AppError> {
    validate_username(&request.username)?;

    let stats = analyze(&request.games, &request.username);
    let insights = synthesize(&stats, &request.username);

    tracing::info!(
        "Analyzed {} games for {} ({} losses)",
        stats.total_games,
        request.username,
        stats.losses
    );

    Ok(Json(serde_json::json!({
        "statistics": stats,
        "insights": insights,
    })))
}

/// GET /api/analyze/{platform}/{username} — fetch from the platform, then
/// run the engine over the result.
pub async fn analyze_platform_games(
    Extension(config): Extension<Config>,
    Path((platform, username)): Path<(String, String)>,
    Query(query): Query<GamesQuery>,
) -> Result<Json<JsonValue>, AppError> {
    validate_username(&username)?;
    let time_classes = parse_time_classes(query.game_types.as_deref())?;

    let games = match platform.as_str() {
        "chesscom" => ChessComClient::new(&config.chess_com_api_base)
            .fetch_recent_games(&username, &time_classes)
            .await
            .map_err(AppError::BadGateway)?,
        "lichess" => LichessClient::new(&config.lichess_api_base)
            .fetch_recent_games(&username, &time_classes)
            .await
            .map_err(AppError::BadGateway)?,
        other => {
            return Err(AppError::BadRequest(format!(
                "Unknown platform: {other}. Allowed: chesscom, lichess"
            )))
        }
    };

    let stats = analyze(&games, &username);
    let insights = synthesize(&stats, &username);

    tracing::info!(
        "Analyzed {} {platform} games for {username}",
        stats.total_games
    );

    Ok(Json(serde_json::json!({
        "statistics": stats,
        "insights": insights,
    })))
}
