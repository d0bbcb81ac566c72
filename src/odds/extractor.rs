//! Heuristic odds extraction from free-text market questions.
//!
//! Classification is an ordered list of `(predicate, extractor)` rules
//! evaluated in sequence per market; the first predicate that matches claims
//! the market. Predicates also see the odds accumulated so far, which lets
//! the seed rule honor its first-writer-wins contract.

use rust_decimal::Decimal;

use crate::domain::{Category, ExtractedOdds, Market, OddsSource};
use crate::matching::TeamIdentity;

/// Everything a rule may look at for one market
pub struct RuleInput<'a> {
    pub market: &'a Market,
    pub question_lower: String,
    pub home: &'a TeamIdentity,
    pub away: &'a TeamIdentity,
    pub category: Category,
}

struct Rule {
    label: &'static str,
    matches: fn(&RuleInput, &ExtractedOdds) -> bool,
    extract: fn(&RuleInput, &mut ExtractedOdds),
}

/// Classification order; first match wins per market.
const RULES: &[Rule] = &[
    Rule {
        label: "spread",
        matches: spread_matches,
        extract: spread_extract,
    },
    Rule {
        label: "over_under",
        matches: over_under_matches,
        extract: over_under_extract,
    },
    Rule {
        label: "draw",
        matches: draw_matches,
        extract: draw_extract,
    },
    Rule {
        label: "moneyline",
        matches: moneyline_matches,
        extract: moneyline_extract,
    },
    Rule {
        label: "moneyline_seed",
        matches: seed_matches,
        extract: seed_extract,
    },
];

/// Parse the first decimal number in free text (e.g. "O/U 225.5" → 225.5)
pub fn parse_first_number(text: &str) -> Option<Decimal> {
    let bytes = text.as_bytes();
    let start = bytes.iter().position(u8::is_ascii_digit)?;

    let mut end = start;
    let mut seen_dot = false;
    while end < bytes.len() {
        let b = bytes[end];
        if b.is_ascii_digit() {
            end += 1;
        } else if b == b'.' && !seen_dot && bytes.get(end + 1).is_some_and(u8::is_ascii_digit) {
            seen_dot = true;
            end += 1;
        } else {
            break;
        }
    }

    text[start..end].parse().ok()
}

fn spread_matches(input: &RuleInput, _odds: &ExtractedOdds) -> bool {
    input.question_lower.contains("spread")
}

fn spread_extract(input: &RuleInput, odds: &mut ExtractedOdds) {
    odds.spread_label = Some(input.market.question.clone());
    odds.spread_price = input.market.outcome_prices.first().copied();
}

fn over_under_matches(input: &RuleInput, _odds: &ExtractedOdds) -> bool {
    let q = &input.question_lower;
    q.contains("o/u")
        || (q.contains("over") && q.contains("under"))
        || q.contains("total points")
        || q.contains("total goals")
}

fn over_under_extract(input: &RuleInput, odds: &mut ExtractedOdds) {
    odds.over_under_line = parse_first_number(&input.market.question);
    if input.market.outcome_prices.len() == 2 {
        odds.over_price = Some(input.market.outcome_prices[0]);
        odds.under_price = Some(input.market.outcome_prices[1]);
    }
}

fn draw_matches(input: &RuleInput, _odds: &ExtractedOdds) -> bool {
    input.category.has_draw()
        && (input.question_lower.contains("draw") || input.question_lower.contains("tie"))
}

fn draw_extract(input: &RuleInput, odds: &mut ExtractedOdds) {
    odds.draw = input.market.outcome_prices.first().copied();
}

/// Orientation of a two-way market's outcome labels against the fixture
fn label_orientation(input: &RuleInput) -> Option<bool> {
    let o0 = &input.market.outcomes[0];
    let o1 = &input.market.outcomes[1];
    if input.home.matches(o0) && input.away.matches(o1) {
        Some(true)
    } else if input.home.matches(o1) && input.away.matches(o0) {
        Some(false)
    } else {
        None
    }
}

/// Which side a Yes/No win question is about
fn yes_no_side(input: &RuleInput) -> Option<bool> {
    let q = &input.question_lower;
    if !(q.contains("win") || q.contains("winner")) {
        return None;
    }
    if input.home.matches(&input.market.question) {
        Some(true)
    } else if input.away.matches(&input.market.question) {
        Some(false)
    } else {
        None
    }
}

fn moneyline_matches(input: &RuleInput, odds: &ExtractedOdds) -> bool {
    if !input.market.is_two_way() {
        return false;
    }
    if input.market.is_yes_no() {
        // first writer wins per side; a later win market never overwrites
        match yes_no_side(input) {
            Some(true) => odds.moneyline_home.is_none(),
            Some(false) => odds.moneyline_away.is_none(),
            None => false,
        }
    } else {
        label_orientation(input).is_some()
    }
}

fn moneyline_extract(input: &RuleInput, odds: &mut ExtractedOdds) {
    let prices = &input.market.outcome_prices;
    let tokens = &input.market.clob_token_ids;

    if input.market.is_yes_no() {
        // The Yes price belongs to whichever side the question names
        match yes_no_side(input) {
            Some(true) => {
                odds.moneyline_home = Some(prices[0]);
                odds.home_token_id = tokens.first().cloned();
            }
            Some(false) => {
                odds.moneyline_away = Some(prices[0]);
                odds.away_token_id = tokens.first().cloned();
            }
            None => return,
        }
    } else {
        match label_orientation(input) {
            Some(true) => {
                odds.moneyline_home = Some(prices[0]);
                odds.moneyline_away = Some(prices[1]);
                odds.home_token_id = tokens.first().cloned();
                odds.away_token_id = tokens.get(1).cloned();
            }
            Some(false) => {
                odds.moneyline_home = Some(prices[1]);
                odds.moneyline_away = Some(prices[0]);
                odds.home_token_id = tokens.get(1).cloned();
                odds.away_token_id = tokens.first().cloned();
            }
            None => return,
        }
    }
    odds.source = Some(OddsSource::NameMatched);
}

/// Football-only: a "Will X win?" Yes market seeds a still-unset moneyline
/// field, so later neutral markets cannot overwrite a named one.
fn seed_matches(input: &RuleInput, odds: &ExtractedOdds) -> bool {
    if input.category != Category::Football {
        return false;
    }
    let market = input.market;
    if market.outcomes.len() != 2
        || market.outcome_prices.is_empty()
        || !market.outcomes[0].eq_ignore_ascii_case("yes")
    {
        return false;
    }
    let q = &input.question_lower;
    if !(q.contains("win") || q.contains("winner")) {
        return false;
    }
    (input.home.matches(&market.question) && odds.moneyline_home.is_none())
        || (input.away.matches(&market.question) && odds.moneyline_away.is_none())
}

fn seed_extract(input: &RuleInput, odds: &mut ExtractedOdds) {
    let price = input.market.outcome_prices[0];
    let token = input.market.clob_token_ids.first().cloned();
    if input.home.matches(&input.market.question) && odds.moneyline_home.is_none() {
        odds.moneyline_home = Some(price);
        odds.home_token_id = token;
    } else if input.away.matches(&input.market.question) && odds.moneyline_away.is_none() {
        odds.moneyline_away = Some(price);
        odds.away_token_id = token;
    } else {
        return;
    }
    odds.source.get_or_insert(OddsSource::NameMatched);
}

/// Classify every market of a matched event and populate [`ExtractedOdds`].
///
/// If no rule produced a moneyline and the event still has a two-outcome
/// market, that market is taken verbatim in listed order and flagged as the
/// low-confidence fallback.
pub fn extract_odds(
    markets: &[Market],
    home: &TeamIdentity,
    away: &TeamIdentity,
    category: Category,
) -> ExtractedOdds {
    let mut odds = ExtractedOdds::default();

    for market in markets.iter().filter(|m| m.active && !m.closed) {
        let input = RuleInput {
            market,
            question_lower: market.question.to_lowercase(),
            home,
            away,
            category,
        };
        for rule in RULES {
            if (rule.matches)(&input, &odds) {
                tracing::trace!(rule = rule.label, question = %market.question, "market classified");
                (rule.extract)(&input, &mut odds);
                break;
            }
        }
    }

    if !odds.has_moneyline() {
        if let Some(primary) = markets
            .iter()
            .find(|m| m.active && !m.closed && m.is_two_way())
        {
            odds.moneyline_home = Some(primary.outcome_prices[0]);
            odds.moneyline_away = Some(primary.outcome_prices[1]);
            odds.home_token_id = primary.clob_token_ids.first().cloned();
            odds.away_token_id = primary.clob_token_ids.get(1).cloned();
            odds.source = Some(OddsSource::FallbackFirstBinary);
        }
    }

    odds
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn market(question: &str, outcomes: &[&str], prices: &[Decimal]) -> Market {
        Market {
            id: question.to_string(),
            question: question.to_string(),
            group_item_title: None,
            outcomes: outcomes.iter().map(|o| o.to_string()).collect(),
            outcome_prices: prices.to_vec(),
            clob_token_ids: vec![],
            active: true,
            closed: false,
        }
    }

    fn nba_identities() -> (TeamIdentity, TeamIdentity) {
        let directory = crate::matching::TeamDirectory::nba();
        (
            TeamIdentity::from_entry(directory.resolve("Los Angeles Lakers").unwrap()),
            TeamIdentity::from_entry(directory.resolve("Boston Celtics").unwrap()),
        )
    }

    #[test]
    fn over_under_line_and_prices() {
        let (home, away) = nba_identities();
        let markets = vec![market(
            "Total Points O/U 225.5",
            &["Over", "Under"],
            &[dec!(0.55), dec!(0.45)],
        )];
        let odds = extract_odds(&markets, &home, &away, Category::Basketball);

        assert_eq!(odds.over_under_line, Some(dec!(225.5)));
        assert_eq!(odds.over_price, Some(dec!(0.55)));
        assert_eq!(odds.under_price, Some(dec!(0.45)));
        // an O/U market is never mistaken for a moneyline, but the fallback
        // then claims it verbatim since nothing else populated a moneyline
        assert_eq!(odds.source, Some(OddsSource::FallbackFirstBinary));
    }

    #[test]
    fn spread_keeps_question_as_label() {
        let (home, away) = nba_identities();
        let markets = vec![market(
            "Lakers spread -6.5",
            &["Lakers", "Celtics"],
            &[dec!(0.48), dec!(0.52)],
        )];
        let odds = extract_odds(&markets, &home, &away, Category::Basketball);

        assert_eq!(odds.spread_label.as_deref(), Some("Lakers spread -6.5"));
        assert_eq!(odds.spread_price, Some(dec!(0.48)));
        // the spread rule claimed the market, so no name-matched moneyline;
        // the fallback still picks it up as the only binary market
        assert_eq!(odds.source, Some(OddsSource::FallbackFirstBinary));
    }

    #[test]
    fn moneyline_by_outcome_labels_either_orientation() {
        let (home, away) = nba_identities();

        let forward = vec![market(
            "Lakers vs Celtics Winner",
            &["Lakers", "Celtics"],
            &[dec!(0.58), dec!(0.42)],
        )];
        let odds = extract_odds(&forward, &home, &away, Category::Basketball);
        assert_eq!(odds.moneyline_home, Some(dec!(0.58)));
        assert_eq!(odds.moneyline_away, Some(dec!(0.42)));
        assert_eq!(odds.source, Some(OddsSource::NameMatched));

        let reversed = vec![market(
            "Lakers vs Celtics Winner",
            &["Celtics", "Lakers"],
            &[dec!(0.42), dec!(0.58)],
        )];
        let odds = extract_odds(&reversed, &home, &away, Category::Basketball);
        assert_eq!(odds.moneyline_home, Some(dec!(0.58)));
        assert_eq!(odds.moneyline_away, Some(dec!(0.42)));
    }

    #[test]
    fn yes_no_win_question_assigns_named_side() {
        let (home, away) = nba_identities();
        let markets = vec![market(
            "Will the Celtics win?",
            &["Yes", "No"],
            &[dec!(0.44), dec!(0.56)],
        )];
        let odds = extract_odds(&markets, &home, &away, Category::Basketball);

        assert_eq!(odds.moneyline_away, Some(dec!(0.44)));
        assert_eq!(odds.moneyline_home, None);
        assert_eq!(odds.source, Some(OddsSource::NameMatched));
    }

    #[test]
    fn draw_rule_is_football_only() {
        let home = TeamIdentity::literal("Arsenal FC");
        let away = TeamIdentity::literal("Chelsea FC");
        let markets = vec![market("Draw?", &["Yes", "No"], &[dec!(0.27), dec!(0.73)])];

        let football = extract_odds(&markets, &home, &away, Category::Football);
        assert_eq!(football.draw, Some(dec!(0.27)));

        let esports = extract_odds(&markets, &home, &away, Category::Esports);
        assert_eq!(esports.draw, None);
    }

    #[test]
    fn win_markets_are_first_writer_wins() {
        let home = TeamIdentity::literal("Arsenal FC");
        let away = TeamIdentity::literal("Chelsea FC");
        let markets = vec![
            market(
                "Will Arsenal win the match?",
                &["Yes", "No"],
                &[dec!(0.41), dec!(0.59)],
            ),
            // a later Arsenal win market must not overwrite the first
            market(
                "Will Arsenal win both halves?",
                &["Yes", "No"],
                &[dec!(0.12), dec!(0.88)],
            ),
        ];
        let odds = extract_odds(&markets, &home, &away, Category::Football);
        assert_eq!(odds.moneyline_home, Some(dec!(0.41)));
    }

    #[test]
    fn fallback_takes_first_binary_market_verbatim() {
        let home = TeamIdentity::literal("Cloud9");
        let away = TeamIdentity::literal("Fnatic");
        let markets = vec![
            // three-outcome market cannot be the fallback
            market(
                "Exact maps",
                &["2-0", "2-1", "1-2"],
                &[dec!(0.3), dec!(0.3), dec!(0.4)],
            ),
            market(
                "Match result",
                &["Team Alpha", "Team Beta"],
                &[dec!(0.64), dec!(0.36)],
            ),
        ];
        let odds = extract_odds(&markets, &home, &away, Category::Esports);

        assert_eq!(odds.moneyline_home, Some(dec!(0.64)));
        assert_eq!(odds.moneyline_away, Some(dec!(0.36)));
        assert_eq!(odds.source, Some(OddsSource::FallbackFirstBinary));
    }

    #[test]
    fn unpopulated_fields_stay_none() {
        let (home, away) = nba_identities();
        let odds = extract_odds(&[], &home, &away, Category::Basketball);
        assert_eq!(odds.moneyline_home, None);
        assert_eq!(odds.moneyline_away, None);
        assert_eq!(odds.over_under_line, None);
        assert_eq!(odds.draw, None);
        assert_eq!(odds.source, None);
    }

    #[test]
    fn first_number_parsing() {
        assert_eq!(parse_first_number("O/U 225.5"), Some(dec!(225.5)));
        assert_eq!(parse_first_number("Total goals over 2.5?"), Some(dec!(2.5)));
        assert_eq!(parse_first_number("Total 210"), Some(dec!(210)));
        assert_eq!(parse_first_number("no numbers here"), None);
        // trailing dot is not part of the number
        assert_eq!(parse_first_number("over 3. maps"), Some(dec!(3)));
    }
}
