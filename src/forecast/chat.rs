//! OpenAI-compatible chat-completions forecaster.
//!
//! The model is instructed to answer with bare JSON matching
//! [`ForecastResult`]; code fences are stripped defensively before parsing.

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::ForecastConfig;
use crate::domain::{Category, ForecastResult};
use crate::error::{Result, TipoffError};
use crate::forecast::{ForecastFacts, Forecaster};

const BASKETBALL_SYSTEM_PROMPT: &str = r#"You are an expert basketball analyst specializing in game prediction and betting analysis.

Analyze matchups considering recent form, home/away splits, offensive and defensive ratings, pace, key player availability and injuries, and head-to-head history.

Your confidence score (0-1) reflects analytical certainty.

Respond ONLY with valid JSON (no markdown code fences):
{
  "home_win_probability": 0.XX,
  "away_win_probability": 0.XX,
  "confidence": 0.XX,
  "total_points_analysis": {
    "predicted_total": XXX.X,
    "over_probability": 0.XX,
    "under_probability": 0.XX
  },
  "key_factors": ["factor1", "factor2"],
  "reasoning": "..."
}"#;

const FOOTBALL_SYSTEM_PROMPT: &str = r#"You are an expert football analyst specializing in match prediction and betting analysis.

Analyze matches considering recent form, home/away splits, head-to-head history, injuries and suspensions, tactical matchups, and motivation. A higher draw probability is common in football - account for this realistically.

Your confidence score (0-1) reflects analytical certainty.

Respond ONLY with valid JSON (no markdown code fences):
{
  "home_win_probability": 0.XX,
  "away_win_probability": 0.XX,
  "draw_probability": 0.XX,
  "confidence": 0.XX,
  "goal_difference_analysis": {
    "predicted_goal_diff": X.X,
    "over_under_goals": X.X
  },
  "key_factors": ["factor1", "factor2"],
  "reasoning": "..."
}"#;

const ESPORTS_SYSTEM_PROMPT: &str = r#"You are an expert esports analyst specializing in competitive gaming prediction.

Analyze matches with a simplified two-way approach (no draws): recent results, current meta and patch relevance, roster performance, head-to-head history, tournament stakes. Keep analysis concise - esports matches are volatile.

Your confidence score (0-1) reflects analytical certainty.

Respond ONLY with valid JSON (no markdown code fences):
{
  "home_win_probability": 0.XX,
  "away_win_probability": 0.XX,
  "confidence": 0.XX,
  "map_analysis": { "predicted_maps": X },
  "key_factors": ["factor1", "factor2"],
  "reasoning": "..."
}"#;

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

fn system_prompt(category: Category) -> &'static str {
    match category {
        Category::Basketball => BASKETBALL_SYSTEM_PROMPT,
        Category::Football => FOOTBALL_SYSTEM_PROMPT,
        Category::Esports => ESPORTS_SYSTEM_PROMPT,
    }
}

fn pct(p: Decimal) -> Decimal {
    (p * dec!(100)).round()
}

/// Render the fixture facts the way the model expects them
fn build_user_prompt(facts: &ForecastFacts) -> String {
    let mut prompt = format!(
        "## Match: {} vs {}\n## Date: {}\n## Event: {}\n\n### Current Market Odds:\n",
        facts.home_team, facts.away_team, facts.match_date, facts.event_title
    );

    if let Some(home) = facts.odds.moneyline_home {
        prompt.push_str(&format!("- Home Win: {}%\n", pct(home)));
    }
    if let Some(away) = facts.odds.moneyline_away {
        prompt.push_str(&format!("- Away Win: {}%\n", pct(away)));
    }
    if let Some(draw) = facts.odds.draw {
        prompt.push_str(&format!("- Draw: {}%\n", pct(draw)));
    }
    if let Some(line) = facts.odds.over_under_line {
        prompt.push_str(&format!("- Over/Under Line: {line}\n"));
    }

    if let Some(basketball) = &facts.basketball {
        // Raw JSON keeps the prompt builder independent of stat fields
        if let Ok(stats) = serde_json::to_string_pretty(basketball) {
            prompt.push_str("\n### Team Data:\n");
            prompt.push_str(&stats);
            prompt.push('\n');
        }
    }

    prompt.push_str("\nAnalyze this match and provide your prediction.");
    prompt
}

/// Strip optional markdown code fences around a JSON payload
fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.trim_start_matches(['\r', '\n'])
        .trim_end_matches('`')
        .trim()
}

/// Forecaster backed by an OpenAI-compatible chat-completions API
pub struct ChatForecaster {
    config: ForecastConfig,
    http: Client,
}

impl ChatForecaster {
    pub fn new(config: ForecastConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                TipoffError::Internal(format!("failed to build forecast HTTP client: {e}"))
            })?;

        Ok(Self { config, http })
    }

    async fn chat(&self, system: &str, user: String) -> Result<String> {
        if self.config.api_key.is_empty() {
            return Err(TipoffError::Forecast(
                "forecast API key not configured".to_string(),
            ));
        }

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: 0.7,
        };

        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TipoffError::Forecast(format!(
                "forecast API error: {status} - {body}"
            )));
        }

        let chat: ChatResponse = response.json().await?;
        chat.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| TipoffError::Forecast("forecast API returned no choices".to_string()))
    }
}

#[async_trait]
impl Forecaster for ChatForecaster {
    async fn forecast(&self, facts: &ForecastFacts) -> Result<ForecastResult> {
        debug!(
            "requesting forecast for {} vs {} ({})",
            facts.home_team, facts.away_team, facts.category
        );

        let content = self
            .chat(system_prompt(facts.category), build_user_prompt(facts))
            .await?;

        serde_json::from_str(strip_code_fences(&content)).map_err(|e| {
            TipoffError::Forecast(format!("unparseable forecast payload: {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_and_bare_payloads_both_parse() {
        let bare = r#"{"home_win_probability": 0.61, "away_win_probability": 0.39, "confidence": 0.72}"#;
        let fenced = format!("```json\n{bare}\n```");

        let from_bare: ForecastResult = serde_json::from_str(strip_code_fences(bare)).unwrap();
        let from_fenced: ForecastResult =
            serde_json::from_str(strip_code_fences(&fenced)).unwrap();

        assert_eq!(from_bare.home_win_probability, from_fenced.home_win_probability);
        assert_eq!(from_fenced.confidence, rust_decimal_macros::dec!(0.72));
        assert!(from_fenced.draw_probability.is_none());
    }

    #[test]
    fn user_prompt_mentions_known_odds_only() {
        let facts = ForecastFacts {
            category: Category::Football,
            home_team: "Arsenal FC".to_string(),
            away_team: "Chelsea FC".to_string(),
            match_date: "2026-02-01".to_string(),
            event_title: "Arsenal FC vs Chelsea FC".to_string(),
            odds: crate::domain::ExtractedOdds {
                moneyline_home: Some(rust_decimal_macros::dec!(0.45)),
                draw: Some(rust_decimal_macros::dec!(0.27)),
                ..Default::default()
            },
            basketball: None,
        };

        let prompt = build_user_prompt(&facts);
        assert!(prompt.contains("Home Win: 45%"));
        assert!(prompt.contains("Draw: 27%"));
        assert!(!prompt.contains("Away Win"));
        assert!(!prompt.contains("Over/Under"));
    }
}
