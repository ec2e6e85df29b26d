use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::sync::LazyLock;

use crate::clients::{chess_com::ChessComClient, lichess::LichessClient};
use crate::config::Config;
use crate::error::AppError;

static USERNAME_RE: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"^[a-zA-Z0-9_-]{1,50}$").unwrap());

const ALLOWED_TIME_CLASSES: [&str; 4] = ["rapid", "blitz", "bullet", "daily"];

#[derive(Deserialize)]
pub struct GamesQuery {
    pub game_types: Option<String>,
}

pub fn validate_username(username: &str) -> Result<(), AppError> {
    if USERNAME_RE.is_match(username) {
        Ok(())
    } else {
        Err(AppError::BadRequest("Invalid username format".to_string()))
    }
}

pub fn parse_time_classes(raw: Option<&str>) -> Result<Vec<String>, AppError> {
    let raw = raw.unwrap_or("rapid,blitz");
    let classes: Vec<String> = raw
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    for class in &classes {
        if !ALLOWED_TIME_CLASSES.contains(&class.as_str()) {
            return Err(AppError::BadRequest(format!(
                "Invalid game type: {class}. Allowed: {}",
                ALLOWED_TIME_CLASSES.join(", ")
            )));
        }
    }
    Ok(classes)
}

/// GET /api/games/{username} — Chess.com proxy, last 6 months.
pub async fn fetch_chesscom_games(
    Extension(config): Extension<Config>,
    Path(username): Path<String>,
    Query(query): Query<GamesQuery>,
) -> Result<Json<JsonValue>, AppError> {
    validate_username(&username)?;
    let time_classes = parse_time_classes(query.game_types.as_deref())?;

    let client = ChessComClient::new(&config.chess_com_api_base);
    let games = client
        .fetch_recent_games(&username, &time_classes)
        .await
        .map_err(AppError::BadGateway)?;

    if games.is_empty() && !client.user_exists(&username).await.unwrap_or(true) {
        return Err(AppError::NotFound("User not found on Chess.com".to_string()));
    }

    tracing::info!("Fetched {} games for {username}", games.len());
    Ok(Json(serde_json::json!({
        "games": games,
        "total": games.len(),
    })))
}

/// GET /api/lichess/games/{username} — Lichess proxy, last 6 months,
/// normalized to the common record shape.
pub async fn fetch_lichess_games(
    Extension(config): Extension<Config>,
    Path(username): Path<String>,
    Query(query): Query<GamesQuery>,
) -> Result<Json<JsonValue>, AppError> {
    validate_username(&username)?;
    let time_classes = parse_time_classes(query.game_types.as_deref())?;

    let client = LichessClient::new(&config.lichess_api_base);
    let games = match client.fetch_recent_games(&username, &time_classes).await {
        Ok(games) => games,
        Err(e) if e == "User not found" => {
            return Err(AppError::NotFound("User not found on Lichess".to_string()))
        }
        Err(e) if e.starts_with("Rate limited") => {
            return Err(AppError::RateLimited(
                "Rate limited by Lichess. Please try again in a minute.".to_string(),
            ))
        }
        Err(e) => return Err(AppError::BadGateway(format!("Lichess API error: {e}"))),
    };

    if games.is_empty() && !client.user_exists(&username).await.unwrap_or(true) {
        return Err(AppError::NotFound("User not found on Lichess".to_string()));
    }

    tracing::info!("Fetched {} Lichess games for {username}", games.len());
    Ok(Json(serde_json::json!({
        "games": games,
        "total": games.len(),
    })))
}
