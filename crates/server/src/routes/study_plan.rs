use axum::{Extension, Json};
use serde_json::Value as JsonValue;

use insight_core::StudyPlanSummary;

use crate::clients::study_plan::StudyPlanClient;
use crate::config::Config;
use crate::error::AppError;

/// POST /api/study-plan — render the summary into a coaching prompt and ask
/// the text-generation service for a 4-week plan.
pub async fn generate_study_plan(
    Extension(config): Extension<Config>,
    Json(summary): Json<StudyPlanSummary>,
) -> Result<Json<JsonValue>, AppError> {
    let api_key = config.groq_api_key.as_deref().ok_or_else(|| {
        AppError::ServiceUnavailable("Study-plan generation is not configured".to_string())
    })?;

    let client = StudyPlanClient::new(&config.groq_api_base, api_key, &config.groq_model);
    let plan = client.generate(&summary).await.map_err(|e| {
        tracing::error!("Study-plan generation failed: {e}");
        AppError::BadGateway("AI service temporarily unavailable. Please try again later.".to_string())
    })?;

    tracing::info!(
        "Study plan generated for {} ({} games)",
        summary.username,
        summary.total_games
    );
    Ok(Json(serde_json::json!({ "plan": plan })))
}
