//! Canonical team identities and alias resolution.
//!
//! The alias table is pure data: canonical name → informal variants (city,
//! nickname, common abbreviations). Resolution is case-insensitive substring
//! containment in either direction, full name tried before aliases.

use serde::{Deserialize, Serialize};

/// League conference, used to sanity-check conference futures markets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Conference {
    Eastern,
    Western,
}

/// One canonical team with its alias set
#[derive(Debug, Clone, Copy)]
pub struct TeamEntry {
    pub name: &'static str,
    pub conference: Conference,
    pub aliases: &'static [&'static str],
}

use Conference::{Eastern, Western};

/// All 30 NBA teams. Alias order is match order; table order breaks ties.
pub const NBA_TEAMS: &[TeamEntry] = &[
    TeamEntry { name: "Atlanta Hawks", conference: Eastern, aliases: &["hawks", "atlanta"] },
    TeamEntry { name: "Boston Celtics", conference: Eastern, aliases: &["celtics", "boston"] },
    TeamEntry { name: "Brooklyn Nets", conference: Eastern, aliases: &["nets", "brooklyn"] },
    TeamEntry { name: "Charlotte Hornets", conference: Eastern, aliases: &["hornets", "charlotte"] },
    TeamEntry { name: "Chicago Bulls", conference: Eastern, aliases: &["bulls", "chicago"] },
    TeamEntry { name: "Cleveland Cavaliers", conference: Eastern, aliases: &["cavaliers", "cleveland", "cavs"] },
    TeamEntry { name: "Dallas Mavericks", conference: Western, aliases: &["mavericks", "dallas", "mavs"] },
    TeamEntry { name: "Denver Nuggets", conference: Western, aliases: &["nuggets", "denver"] },
    TeamEntry { name: "Detroit Pistons", conference: Eastern, aliases: &["pistons", "detroit"] },
    TeamEntry { name: "Golden State Warriors", conference: Western, aliases: &["warriors", "golden state"] },
    TeamEntry { name: "Houston Rockets", conference: Western, aliases: &["rockets", "houston"] },
    TeamEntry { name: "Indiana Pacers", conference: Eastern, aliases: &["pacers", "indiana"] },
    TeamEntry { name: "LA Clippers", conference: Western, aliases: &["clippers", "la clippers"] },
    TeamEntry { name: "Los Angeles Lakers", conference: Western, aliases: &["lakers", "los angeles lakers", "la lakers"] },
    TeamEntry { name: "Memphis Grizzlies", conference: Western, aliases: &["grizzlies", "memphis"] },
    TeamEntry { name: "Miami Heat", conference: Eastern, aliases: &["heat", "miami"] },
    TeamEntry { name: "Milwaukee Bucks", conference: Eastern, aliases: &["bucks", "milwaukee"] },
    TeamEntry { name: "Minnesota Timberwolves", conference: Western, aliases: &["timberwolves", "minnesota", "wolves"] },
    TeamEntry { name: "New Orleans Pelicans", conference: Western, aliases: &["pelicans", "new orleans"] },
    TeamEntry { name: "New York Knicks", conference: Eastern, aliases: &["knicks", "new york", "ny knicks"] },
    TeamEntry { name: "Oklahoma City Thunder", conference: Western, aliases: &["thunder", "oklahoma city", "okc"] },
    TeamEntry { name: "Orlando Magic", conference: Eastern, aliases: &["magic", "orlando"] },
    TeamEntry { name: "Philadelphia 76ers", conference: Eastern, aliases: &["76ers", "philadelphia", "sixers", "philly"] },
    TeamEntry { name: "Phoenix Suns", conference: Western, aliases: &["suns", "phoenix"] },
    TeamEntry { name: "Portland Trail Blazers", conference: Western, aliases: &["trail blazers", "portland", "blazers"] },
    TeamEntry { name: "Sacramento Kings", conference: Western, aliases: &["kings", "sacramento"] },
    TeamEntry { name: "San Antonio Spurs", conference: Western, aliases: &["spurs", "san antonio"] },
    TeamEntry { name: "Toronto Raptors", conference: Eastern, aliases: &["raptors", "toronto"] },
    TeamEntry { name: "Utah Jazz", conference: Western, aliases: &["jazz", "utah"] },
    TeamEntry { name: "Washington Wizards", conference: Eastern, aliases: &["wizards", "washington"] },
];

/// Immutable alias lookup over a set of canonical teams
#[derive(Debug, Clone, Copy)]
pub struct TeamDirectory {
    teams: &'static [TeamEntry],
}

impl TeamDirectory {
    pub fn nba() -> Self {
        Self { teams: NBA_TEAMS }
    }

    pub fn teams(&self) -> &'static [TeamEntry] {
        self.teams
    }

    /// Resolve free text to a canonical team.
    ///
    /// Three passes across the whole table, strongest rule first, so that a
    /// full-name or exact-alias hit always beats the fuzzy first-token rule
    /// of an earlier table entry ("new york" must reach the Knicks, not trip
    /// over New Orleans).
    pub fn resolve(&self, text: &str) -> Option<&'static TeamEntry> {
        let lower = text.to_lowercase();
        let first_token = lower.split_whitespace().next().unwrap_or("");

        for team in self.teams {
            if lower.contains(&team.name.to_lowercase()) {
                return Some(team);
            }
        }

        for team in self.teams {
            if team.aliases.iter().any(|alias| lower.contains(alias)) {
                return Some(team);
            }
        }

        if !first_token.is_empty() {
            for team in self.teams {
                if team.name.to_lowercase().contains(first_token)
                    || team.aliases.iter().any(|alias| alias.contains(first_token))
                {
                    return Some(team);
                }
            }
        }

        None
    }

    /// Whether a market-event title looks related to this league at all
    pub fn is_league_related(&self, title: &str, league_keyword: &str) -> bool {
        let lower = title.to_lowercase();
        if lower.contains(league_keyword) {
            return true;
        }
        self.teams.iter().any(|team| {
            lower.contains(&team.name.to_lowercase())
                || team.aliases.iter().any(|alias| lower.contains(alias))
        })
    }
}

/// One side of a fixture as used by the odds extractor: either a resolved
/// canonical team (with its alias set) or literal title text.
#[derive(Debug, Clone)]
pub struct TeamIdentity {
    pub canonical: String,
    aliases: Vec<String>,
}

impl TeamIdentity {
    pub fn from_entry(entry: &TeamEntry) -> Self {
        Self {
            canonical: entry.name.to_string(),
            aliases: entry.aliases.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Identity for an unresolved segment. The name's first token doubles as
    /// an alias so "Will Arsenal win?" still matches "Arsenal FC".
    pub fn literal(text: &str) -> Self {
        let aliases = text
            .to_lowercase()
            .split_whitespace()
            .next()
            .map(|token| vec![token.to_string()])
            .unwrap_or_default();
        Self {
            canonical: text.to_string(),
            aliases,
        }
    }

    /// Same containment rule as [`TeamDirectory::resolve`], applied to one
    /// identity: text contains the name or an alias, or the name/alias
    /// contains the text's first token.
    pub fn matches(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        let first_token = lower.split_whitespace().next().unwrap_or("");
        let canonical_lower = self.canonical.to_lowercase();

        if lower.contains(&canonical_lower) {
            return true;
        }
        if self.aliases.iter().any(|alias| lower.contains(alias)) {
            return true;
        }
        if first_token.is_empty() {
            return false;
        }
        canonical_lower.contains(first_token)
            || self.aliases.iter().any(|alias| alias.contains(first_token))
    }
}
