//! Fixture parsing and schedule/market pairing.

use std::collections::HashMap;

use chrono::Utc;

use crate::domain::{ExtractedOdds, GameInfo, MarketEvent};
use crate::matching::teams::{TeamDirectory, TeamEntry, TeamIdentity};
use crate::odds::extract_odds;

/// Case-insensitive search for an ASCII separator; byte positions are valid
/// char boundaries because the separator starts and ends with a space.
fn find_separator(text: &str, needle: &str) -> Option<usize> {
    text.as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
}

/// Split an event title on a case-insensitive " vs " / " vs. " separator.
///
/// Titles that do not produce exactly two non-empty trimmed segments are not
/// single-game fixtures (futures/season events fall out here).
pub fn parse_fixture_title(title: &str) -> Option<(String, String)> {
    let (index, sep_len) = [" vs. ", " vs "]
        .iter()
        .filter_map(|sep| find_separator(title, sep).map(|i| (i, sep.len())))
        .min_by_key(|(i, _)| *i)?;

    let home = title[..index].trim();
    let away = title[index + sep_len..].trim();
    if home.is_empty() || away.is_empty() {
        return None;
    }
    // A second separator means the title is not a two-team fixture
    if find_separator(away, " vs ").is_some() || find_separator(away, " vs. ").is_some() {
        return None;
    }
    Some((home.to_string(), away.to_string()))
}

/// A market event recognized as a two-team fixture, with the identities used
/// for odds extraction. Owned by the matcher for one reconciliation pass.
#[derive(Debug, Clone)]
pub struct MatchedFixture {
    pub event: MarketEvent,
    pub home: TeamIdentity,
    pub away: TeamIdentity,
    /// Canonical entries when both segments resolved against the directory
    pub canonical: Option<(&'static TeamEntry, &'static TeamEntry)>,
}

impl MatchedFixture {
    /// Classify a market event; `None` means futures/season event or expired.
    ///
    /// When a directory is given, title segments are resolved to canonical
    /// identities; unresolved segments stay literal text (display only, no
    /// canonical-key lookup).
    pub fn from_event(event: MarketEvent, directory: Option<&TeamDirectory>) -> Option<Self> {
        if event.has_ended(Utc::now()) {
            return None;
        }
        let (home_text, away_text) = parse_fixture_title(&event.title)?;

        let canonical = directory.and_then(|dir| {
            match (dir.resolve(&home_text), dir.resolve(&away_text)) {
                (Some(home), Some(away)) if home.name != away.name => Some((home, away)),
                _ => None,
            }
        });

        let (home, away) = match canonical {
            Some((home, away)) => (
                TeamIdentity::from_entry(home),
                TeamIdentity::from_entry(away),
            ),
            None => (
                TeamIdentity::literal(&home_text),
                TeamIdentity::literal(&away_text),
            ),
        };

        Some(Self {
            event,
            home,
            away,
            canonical,
        })
    }
}

/// Odds per fixture, queryable from either orientation.
///
/// Keys are `"Home|Away"` over canonical names; the reversed key carries
/// swapped moneyline fields since probabilities are orientation-dependent.
#[derive(Debug, Default)]
pub struct FixtureOddsIndex {
    entries: HashMap<String, ExtractedOdds>,
}

impl FixtureOddsIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(home: &str, away: &str) -> String {
        format!("{home}|{away}")
    }

    /// Insert under both orientations. The forward key is authoritative; a
    /// reversed key is only added when not already present so a real
    /// opposite-orientation fixture is never clobbered.
    pub fn insert(&mut self, home: &str, away: &str, odds: ExtractedOdds) {
        let reverse_key = Self::key(away, home);
        if !self.entries.contains_key(&reverse_key) {
            self.entries.insert(reverse_key, odds.reversed());
        }
        self.entries.insert(Self::key(home, away), odds);
    }

    pub fn get(&self, home: &str, away: &str) -> Option<&ExtractedOdds> {
        self.entries.get(&Self::key(home, away))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build the single-game odds index from league market events.
///
/// Events whose titles do not resolve to two distinct canonical teams are
/// skipped; their absence degrades to "no odds" for that fixture. Only events
/// that yielded a moneyline are indexed — spread/total-only events cannot be
/// oriented reliably without one.
pub fn build_game_odds_index(
    events: Vec<MarketEvent>,
    directory: &TeamDirectory,
    league_keyword: &str,
) -> FixtureOddsIndex {
    let mut index = FixtureOddsIndex::new();

    for event in events {
        if !directory.is_league_related(&event.title, league_keyword) {
            continue;
        }
        let Some(fixture) = MatchedFixture::from_event(event, Some(directory)) else {
            continue;
        };
        let Some((home, away)) = fixture.canonical else {
            continue;
        };

        let odds = extract_odds(
            &fixture.event.markets,
            &fixture.home,
            &fixture.away,
            fixture.event.category,
        );
        if odds.has_moneyline() {
            index.insert(home.name, away.name, odds);
        }
    }

    index
}

/// Pair schedule entries with the odds index they matched.
///
/// The schedule entry's home/away assignment is authoritative for
/// orientation; unmatched games simply get `None`.
pub fn pair_games_with_odds<'a>(
    games: &'a [GameInfo],
    index: &'a FixtureOddsIndex,
) -> Vec<(&'a GameInfo, Option<&'a ExtractedOdds>)> {
    games
        .iter()
        .map(|game| {
            let odds = index.get(&game.home_team.team_name, &game.away_team.team_name);
            (game, odds)
        })
        .collect()
}

/// Split category events into vs-match fixtures and futures/season events,
/// both sorted by traded volume descending and truncated to `limit`.
pub fn split_matches_and_futures(
    events: Vec<MarketEvent>,
    limit: usize,
) -> (Vec<MatchedFixture>, Vec<MarketEvent>) {
    let mut matches = Vec::new();
    let mut futures = Vec::new();

    for event in events {
        match MatchedFixture::from_event(event.clone(), None) {
            Some(fixture) => matches.push(fixture),
            None => {
                if !event.has_ended(Utc::now()) {
                    futures.push(event);
                }
            }
        }
    }

    matches.sort_by(|a, b| b.event.volume.cmp(&a.event.volume));
    matches.truncate(limit);
    futures.sort_by(|a, b| b.volume.cmp(&a.volume));
    futures.truncate(limit);

    (matches, futures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, Market};
    use rust_decimal_macros::dec;

    #[test]
    fn title_splits_on_both_separators() {
        assert_eq!(
            parse_fixture_title("Thunder vs Nuggets"),
            Some(("Thunder".to_string(), "Nuggets".to_string()))
        );
        assert_eq!(
            parse_fixture_title("West Ham United FC vs. Manchester United FC"),
            Some((
                "West Ham United FC".to_string(),
                "Manchester United FC".to_string()
            ))
        );
        assert_eq!(
            parse_fixture_title("Lakers VS Celtics"),
            Some(("Lakers".to_string(), "Celtics".to_string()))
        );
    }

    #[test]
    fn futures_titles_are_not_fixtures() {
        assert_eq!(parse_fixture_title("2026 NBA Champion"), None);
        assert_eq!(parse_fixture_title("vs Nuggets"), None);
        assert_eq!(parse_fixture_title("Thunder vs "), None);
        // three-team title is not a single fixture
        assert_eq!(parse_fixture_title("A vs B vs C"), None);
    }

    fn event(title: &str, markets: Vec<Market>) -> MarketEvent {
        MarketEvent {
            id: title.to_lowercase().replace(' ', "-"),
            slug: title.to_lowercase().replace(' ', "-"),
            title: title.to_string(),
            description: String::new(),
            start_date: None,
            end_date: None,
            volume: dec!(1000),
            liquidity: dec!(0),
            markets,
            category: Category::Basketball,
        }
    }

    fn moneyline_market(home: &str, away: &str) -> Market {
        Market {
            id: "m1".to_string(),
            question: format!("{home} vs {away} Winner"),
            group_item_title: None,
            outcomes: vec![home.to_string(), away.to_string()],
            outcome_prices: vec![dec!(0.62), dec!(0.38)],
            clob_token_ids: vec!["tok-h".to_string(), "tok-a".to_string()],
            active: true,
            closed: false,
        }
    }

    #[test]
    fn index_serves_both_orientations_with_swapped_moneyline() {
        let events = vec![event(
            "Oklahoma City Thunder vs Denver Nuggets",
            vec![moneyline_market("Thunder", "Nuggets")],
        )];
        let index = build_game_odds_index(events, &TeamDirectory::nba(), "nba");

        let forward = index
            .get("Oklahoma City Thunder", "Denver Nuggets")
            .expect("forward key");
        assert_eq!(forward.moneyline_home, Some(dec!(0.62)));
        assert_eq!(forward.moneyline_away, Some(dec!(0.38)));

        let reversed = index
            .get("Denver Nuggets", "Oklahoma City Thunder")
            .expect("reversed key");
        assert_eq!(reversed.moneyline_home, Some(dec!(0.38)));
        assert_eq!(reversed.moneyline_away, Some(dec!(0.62)));
    }

    #[test]
    fn unresolved_titles_are_excluded_from_the_index() {
        let events = vec![event(
            "Fenerbahce vs Galatasaray",
            vec![moneyline_market("Fenerbahce", "Galatasaray")],
        )];
        let index = build_game_odds_index(events, &TeamDirectory::nba(), "nba");
        assert!(index.is_empty());
    }

    #[test]
    fn split_keeps_futures_separate_and_ordered() {
        let mut low = event("2026 NBA Champion", vec![moneyline_market("a", "b")]);
        low.volume = dec!(10);
        let mut high = event("Eastern Conference Champion", vec![moneyline_market("a", "b")]);
        high.volume = dec!(500);
        let fixture = event("Thunder vs Nuggets", vec![moneyline_market("t", "n")]);

        let (matches, futures) = split_matches_and_futures(vec![low, high, fixture], 20);
        assert_eq!(matches.len(), 1);
        assert_eq!(futures.len(), 2);
        assert_eq!(futures[0].title, "Eastern Conference Champion");
    }
}
