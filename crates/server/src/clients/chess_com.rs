use chrono::{Datelike, Utc};
use reqwest::Client;
use serde_json::Value;

use insight_core::GameRecord;

const USER_AGENT: &str = "ChessInsight/1.0 (chess analysis tool)";

/// How many months of archives to pull for an analysis run.
const MONTHS_BACK: usize = 6;

pub struct ChessComClient {
    client: Client,
    base: String,
}

/// (year, zero-padded month) pairs for the last `n` months, newest first.
pub fn months_range(n: usize) -> Vec<(i32, String)> {
    let now = Utc::now();
    let mut result = Vec::with_capacity(n);
    let mut year = now.year();
    let mut month = now.month() as i32;
    for _ in 0..n {
        result.push((year, format!("{month:02}")));
        month -= 1;
        if month == 0 {
            month = 12;
            year -= 1;
        }
    }
    result
}

impl ChessComClient {
    pub fn new(base: &str) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("reqwest client");
        Self {
            client,
            base: base.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the last six months of games for a user, filtered to the given
    /// time classes. Months that 404 or rate-limit are skipped, not fatal.
    pub async fn fetch_recent_games(
        &self,
        username: &str,
        time_classes: &[String],
    ) -> Result<Vec<GameRecord>, String> {
        let mut all_games = Vec::new();

        for (year, month) in months_range(MONTHS_BACK) {
            let url = format!("{}/player/{username}/games/{year}/{month}", self.base);

            // Rate limit
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;

            let resp = match self.client.get(&url).send().await {
                Ok(resp) => resp,
                Err(e) => {
                    tracing::error!("Chess.com request error for {username} ({year}/{month}): {e}");
                    continue;
                }
            };

            if resp.status() == reqwest::StatusCode::NOT_FOUND {
                continue;
            }
            if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
                tracing::warn!("Chess.com rate limited us for {username} ({year}/{month})");
                continue;
            }
            if !resp.status().is_success() {
                tracing::warn!(
                    "Chess.com returned {} for {username} ({year}/{month})",
                    resp.status()
                );
                continue;
            }

            let data: Value = match resp.json().await {
                Ok(data) => data,
                Err(e) => {
                    tracing::warn!("Chess.com JSON parse error for {username}: {e}");
                    continue;
                }
            };

            for game in data["games"].as_array().cloned().unwrap_or_default() {
                let time_class = game.get("time_class").and_then(|v| v.as_str()).unwrap_or("");
                if !time_classes.iter().any(|tc| tc == time_class) {
                    continue;
                }
                match serde_json::from_value::<GameRecord>(game) {
                    Ok(record) => all_games.push(record),
                    Err(e) => tracing::warn!("Skipping malformed Chess.com game: {e}"),
                }
            }
        }

        Ok(all_games)
    }

    /// Check whether a username exists on Chess.com.
    pub async fn user_exists(&self, username: &str) -> Result<bool, String> {
        let url = format!("{}/player/{username}", self.base);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| format!("User check request error: {e}"))?;
        Ok(resp.status() != reqwest::StatusCode::NOT_FOUND)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_months_range_counts_back() {
        let months = months_range(6);
        assert_eq!(months.len(), 6);
        // Zero-padded month strings.
        for (_, month) in &months {
            assert_eq!(month.len(), 2);
        }
        // Newest first, strictly decreasing month-by-month.
        let as_index: Vec<i32> = months
            .iter()
            .map(|(y, m)| y * 12 + m.parse::<i32>().unwrap())
            .collect();
        for pair in as_index.windows(2) {
            assert_eq!(pair[0] - pair[1], 1);
        }
    }
}
