use server::config;
use server::routes;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env();

    if config.groq_api_key.is_some() {
        tracing::info!("Study-plan generation configured");
    } else {
        tracing::info!("GROQ_API_KEY not set - study-plan generation disabled");
    }

    // CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router — order matters: specific routes before parameterized
    let app = Router::new()
        // Health
        .route("/health", get(routes::health::health_check))
        // Game fetch proxies
        .route(
            "/api/lichess/games/{username}",
            get(routes::games::fetch_lichess_games),
        )
        .route(
            "/api/games/{username}",
            get(routes::games::fetch_chesscom_games),
        )
        // Analysis
        .route("/api/analyze", post(routes::analysis::analyze_games))
        .route(
            "/api/analyze/{platform}/{username}",
            get(routes::analysis::analyze_platform_games),
        )
        // Study plan
        .route(
            "/api/study-plan",
            post(routes::study_plan::generate_study_plan),
        )
        // Shared state
        .layer(Extension(config.clone()))
        .layer(cors);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");

    axum::serve(listener, app).await.expect("Server error");
}
