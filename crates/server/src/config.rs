use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub chess_com_api_base: String,
    pub lichess_api_base: String,
    pub groq_api_base: String,
    pub groq_api_key: Option<String>,
    pub groq_model: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
            chess_com_api_base: env::var("CHESS_COM_API_BASE")
                .unwrap_or_else(|_| "https://api.chess.com/pub".to_string()),
            lichess_api_base: env::var("LICHESS_API_BASE")
                .unwrap_or_else(|_| "https://lichess.org/api".to_string()),
            groq_api_base: env::var("GROQ_API_BASE")
                .unwrap_or_else(|_| "https://api.groq.com/openai/v1".to_string()),
            groq_api_key: env::var("GROQ_API_KEY").ok().filter(|k| !k.is_empty()),
            groq_model: env::var("GROQ_MODEL")
                .unwrap_or_else(|_| "llama-3.3-70b-versatile".to_string()),
        }
    }
}
