//! Schedule-provider records: games, team stats, rosters, head-to-head.
//!
//! All shapes mirror the schedule service's JSON (camelCase on the wire).
//! They are immutable once fetched and re-fetched per cache TTL.

use serde::{Deserialize, Serialize};

/// One team's entry in a scheduled game
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamInfo {
    pub team_id: i64,
    pub team_name: String,
    pub team_abbreviation: String,
    /// Season win-loss record, e.g. "34-12"
    #[serde(default)]
    pub record: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_record: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub away_record: Option<String>,
}

/// A single scheduled fixture between two teams
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameInfo {
    pub game_id: String,
    /// Game date as provided, "YYYY-MM-DD"
    pub game_date: String,
    pub home_team: TeamInfo,
    pub away_team: TeamInfo,
    /// Free text: tip-off time, live-period marker, or "Final"
    pub status: String,
}

impl GameInfo {
    /// True when the provider marks the game as completed
    pub fn is_final(&self) -> bool {
        let status = self.status.trim().to_lowercase();
        status == "final" || status.starts_with("final/")
    }
}

/// True when every game in the slate has gone final.
///
/// An empty slate is not "finished" (there was nothing to finish).
pub fn all_games_finished(games: &[GameInfo]) -> bool {
    if games.is_empty() {
        return false;
    }
    games.iter().all(GameInfo::is_final)
}

/// Season-to-date team statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStats {
    pub team_id: i64,
    pub team_name: String,
    pub last10_record: String,
    pub home_record: String,
    pub away_record: String,
    pub offensive_rating: f64,
    pub defensive_rating: f64,
    pub net_rating: f64,
    pub pace: f64,
    pub points_per_game: f64,
    pub opponent_points_per_game: f64,
}

impl TeamStats {
    /// Placeholder stats used when the provider is unavailable
    pub fn empty_for(team_id: i64) -> Self {
        Self {
            team_id,
            team_name: "Unknown".to_string(),
            last10_record: "0-0".to_string(),
            home_record: "0-0".to_string(),
            away_record: "0-0".to_string(),
            offensive_rating: 0.0,
            defensive_rating: 0.0,
            net_rating: 0.0,
            pace: 0.0,
            points_per_game: 0.0,
            opponent_points_per_game: 0.0,
        }
    }
}

/// Per-player season averages and availability
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub player_id: i64,
    pub player_name: String,
    pub position: String,
    pub points_per_game: f64,
    pub assists_per_game: f64,
    pub rebounds_per_game: f64,
    pub minutes_per_game: f64,
    pub is_injured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub injury_status: Option<String>,
}

/// Recent meeting between the two teams
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadToHeadGame {
    pub date: String,
    pub home_score: i32,
    pub away_score: i32,
    pub winner: String,
}

/// Head-to-head summary for a fixture
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadToHead {
    pub home_wins: u32,
    pub away_wins: u32,
    #[serde(default)]
    pub games: Vec<HeadToHeadGame>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(status: &str) -> GameInfo {
        GameInfo {
            game_id: "0022500001".to_string(),
            game_date: "2026-01-15".to_string(),
            home_team: TeamInfo {
                team_id: 1,
                team_name: "Boston Celtics".to_string(),
                team_abbreviation: "BOS".to_string(),
                record: "30-10".to_string(),
                home_record: None,
                away_record: None,
            },
            away_team: TeamInfo {
                team_id: 2,
                team_name: "Miami Heat".to_string(),
                team_abbreviation: "MIA".to_string(),
                record: "22-18".to_string(),
                home_record: None,
                away_record: None,
            },
            status: status.to_string(),
        }
    }

    #[test]
    fn final_status_variants() {
        assert!(game("Final").is_final());
        assert!(game("final/OT").is_final());
        assert!(!game("7:30 pm ET").is_final());
        assert!(!game("Q3 04:12").is_final());
    }

    #[test]
    fn slate_finished_requires_all_final() {
        assert!(!all_games_finished(&[]));
        assert!(!all_games_finished(&[game("Final"), game("Q4 01:00")]));
        assert!(all_games_finished(&[game("Final"), game("Final/OT")]));
    }
}
