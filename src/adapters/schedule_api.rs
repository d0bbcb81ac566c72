//! Schedule-provider HTTP client.
//!
//! Every method degrades to an empty/default result on provider failure:
//! ordinary upstream unavailability is logged and absorbed here, never
//! surfaced as an error to the pipeline.

use chrono::{Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration as StdDuration;
use tracing::warn;

use crate::domain::{GameInfo, HeadToHead, PlayerStats, TeamStats};
use crate::error::{Result, TipoffError};

#[derive(Debug, Deserialize)]
struct GamesResponse {
    #[serde(default)]
    games: Vec<GameInfo>,
}

#[derive(Debug, Deserialize)]
struct PlayersResponse {
    #[serde(default)]
    players: Vec<PlayerStats>,
}

/// Client for the schedule/stats service
#[derive(Clone)]
pub struct ScheduleClient {
    http: Client,
    base_url: String,
}

impl ScheduleClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(StdDuration::from_secs(15))
            .build()
            .map_err(|e| {
                TipoffError::Internal(format!("failed to build schedule HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Games scheduled `day_offset` days from today (0 = today).
    ///
    /// Offsets beyond today query the upcoming window and filter to the
    /// target date, since the provider has no per-date endpoint.
    pub async fn fetch_schedule(&self, day_offset: u32) -> Vec<GameInfo> {
        if day_offset == 0 {
            return self.fetch_games("/api/schedule/today").await;
        }

        let target = (Utc::now() + Duration::days(day_offset as i64))
            .format("%Y-%m-%d")
            .to_string();
        let path = format!("/api/schedule/upcoming?days={}", day_offset + 1);
        self.fetch_games(&path)
            .await
            .into_iter()
            .filter(|game| game.game_date == target)
            .collect()
    }

    async fn fetch_games(&self, path: &str) -> Vec<GameInfo> {
        let url = format!("{}{}", self.base_url, path);
        let response = match self.http.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("schedule: {path} connection error: {e}");
                return Vec::new();
            }
        };
        if !response.status().is_success() {
            warn!("schedule: {path} failed: {}", response.status());
            return Vec::new();
        }
        match response.json::<GamesResponse>().await {
            Ok(body) => body.games,
            Err(e) => {
                warn!("schedule: {path} malformed body: {e}");
                Vec::new()
            }
        }
    }

    pub async fn fetch_team_stats(&self, team_id: i64) -> TeamStats {
        let url = format!("{}/api/teams/{team_id}/stats", self.base_url);
        match self.get_json::<TeamStats>(&url).await {
            Some(stats) => stats,
            None => {
                warn!("schedule: team stats unavailable for {team_id}");
                TeamStats::empty_for(team_id)
            }
        }
    }

    pub async fn fetch_team_players(&self, team_id: i64) -> Vec<PlayerStats> {
        let url = format!("{}/api/players/{team_id}/players", self.base_url);
        match self.get_json::<PlayersResponse>(&url).await {
            Some(body) => body.players,
            None => {
                warn!("schedule: players unavailable for {team_id}");
                Vec::new()
            }
        }
    }

    pub async fn fetch_head_to_head(&self, home_team_id: i64, away_team_id: i64) -> HeadToHead {
        let url = format!(
            "{}/api/teams/h2h?home={home_team_id}&away={away_team_id}",
            self.base_url
        );
        match self.get_json::<HeadToHead>(&url).await {
            Some(h2h) => h2h,
            None => {
                warn!("schedule: h2h unavailable for {home_team_id}/{away_team_id}");
                HeadToHead::default()
            }
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Option<T> {
        let response = self.http.get(url).send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }
        response.json::<T>().await.ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn games_response_tolerates_missing_field() {
        let body: GamesResponse = serde_json::from_str("{\"count\": 0}").unwrap();
        assert!(body.games.is_empty());
    }

    #[test]
    fn games_response_decodes_provider_shape() {
        let raw = r#"{
            "games": [{
                "gameId": "0022500321",
                "gameDate": "2026-01-15",
                "homeTeam": {
                    "teamId": 1610612738,
                    "teamName": "Boston Celtics",
                    "teamAbbreviation": "BOS",
                    "record": "30-10"
                },
                "awayTeam": {
                    "teamId": 1610612748,
                    "teamName": "Miami Heat",
                    "teamAbbreviation": "MIA",
                    "record": "22-18"
                },
                "status": "7:30 pm ET"
            }],
            "count": 1
        }"#;
        let body: GamesResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(body.games.len(), 1);
        assert_eq!(body.games[0].home_team.team_abbreviation, "BOS");
    }
}
