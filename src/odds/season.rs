//! Season futures odds: championship and conference winner prices per team.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::domain::{Market, SeasonOdds};
use crate::matching::{Conference, TeamDirectory};

/// Markets of the three season futures events
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct SeasonMarkets {
    pub championship: Vec<Market>,
    pub eastern: Vec<Market>,
    pub western: Vec<Market>,
}

/// Yes price of a grouped futures market (first outcome price)
fn yes_price(market: &Market) -> Option<Decimal> {
    market.outcome_prices.first().copied()
}

/// Label used to match a futures market to a team
fn market_label(market: &Market) -> &str {
    market
        .group_item_title
        .as_deref()
        .unwrap_or(&market.question)
}

/// Build team name → [`SeasonOdds`] from the season futures markets.
///
/// Every team gets an entry (empty odds when no market matched); conference
/// prices are only accepted from the matching conference's event.
pub fn build_season_odds_map(
    season: &SeasonMarkets,
    directory: &TeamDirectory,
) -> HashMap<String, SeasonOdds> {
    let mut map: HashMap<String, SeasonOdds> = directory
        .teams()
        .iter()
        .map(|team| (team.name.to_string(), SeasonOdds::default()))
        .collect();

    for market in &season.championship {
        let Some(team) = directory.resolve(market_label(market)) else {
            continue;
        };
        if let Some(odds) = map.get_mut(team.name) {
            odds.championship_price = yes_price(market);
            odds.championship_market_id = Some(market.id.clone());
        }
    }

    let mut fill_conference = |markets: &[Market], conference: Conference| {
        for market in markets {
            let Some(team) = directory.resolve(market_label(market)) else {
                continue;
            };
            if team.conference != conference {
                continue;
            }
            if let Some(odds) = map.get_mut(team.name) {
                odds.conference_price = yes_price(market);
                odds.conference_market_id = Some(market.id.clone());
            }
        }
    };

    fill_conference(&season.eastern, Conference::Eastern);
    fill_conference(&season.western, Conference::Western);

    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn futures_market(id: &str, label: &str, price: Decimal) -> Market {
        Market {
            id: id.to_string(),
            question: format!("Will the {label} win?"),
            group_item_title: Some(label.to_string()),
            outcomes: vec!["Yes".to_string(), "No".to_string()],
            outcome_prices: vec![price, Decimal::ONE - price],
            clob_token_ids: vec![],
            active: true,
            closed: false,
        }
    }

    #[test]
    fn championship_and_conference_prices_fill_in() {
        let season = SeasonMarkets {
            championship: vec![futures_market("c1", "Celtics", dec!(0.18))],
            eastern: vec![futures_market("e1", "Celtics", dec!(0.31))],
            western: vec![futures_market("w1", "Thunder", dec!(0.29))],
        };
        let map = build_season_odds_map(&season, &TeamDirectory::nba());

        let celtics = &map["Boston Celtics"];
        assert_eq!(celtics.championship_price, Some(dec!(0.18)));
        assert_eq!(celtics.conference_price, Some(dec!(0.31)));

        let thunder = &map["Oklahoma City Thunder"];
        assert_eq!(thunder.championship_price, None);
        assert_eq!(thunder.conference_price, Some(dec!(0.29)));
    }

    #[test]
    fn wrong_conference_market_is_ignored() {
        let season = SeasonMarkets {
            championship: vec![],
            // a western team listed in the eastern event is a provider glitch
            eastern: vec![futures_market("e1", "Lakers", dec!(0.20))],
            western: vec![],
        };
        let map = build_season_odds_map(&season, &TeamDirectory::nba());
        assert_eq!(map["Los Angeles Lakers"].conference_price, None);
    }

    #[test]
    fn every_team_has_an_entry() {
        let map = build_season_odds_map(&SeasonMarkets::default(), &TeamDirectory::nba());
        assert_eq!(map.len(), 30);
        assert!(map.values().all(|odds| odds.championship_price.is_none()));
    }
}
