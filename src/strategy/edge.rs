//! Edge computation and side recommendation.
//!
//! Pure functions: identical inputs always produce identical decisions.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::{MIN_CONFIDENCE, MIN_EDGE};
use crate::domain::{EdgeDecision, ExtractedOdds, ForecastResult, Recommendation};

/// Market-implied probabilities for the sides of one fixture
#[derive(Debug, Clone, Copy, Default)]
pub struct MarketProbabilities {
    pub home: Option<Decimal>,
    pub away: Option<Decimal>,
    pub draw: Option<Decimal>,
}

impl From<&ExtractedOdds> for MarketProbabilities {
    fn from(odds: &ExtractedOdds) -> Self {
        Self {
            home: odds.moneyline_home,
            away: odds.moneyline_away,
            draw: odds.draw,
        }
    }
}

/// Signed edge: forecast minus market, rounded to 2 decimals
pub fn edge(forecast: Decimal, market: Decimal) -> Decimal {
    (forecast - market).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Decide which side, if any, to recommend.
///
/// Only sides with both a forecast and a market probability participate.
/// Below the confidence floor the side is always `none`; otherwise the
/// maximum edge wins if it clears the edge floor. Ties resolve in the fixed
/// home, away, draw evaluation order.
pub fn decide(forecast: &ForecastResult, market: &MarketProbabilities) -> EdgeDecision {
    let home_pair = market.home.map(|m| (forecast.home_win_probability, m));
    let away_pair = market.away.map(|m| (forecast.away_win_probability, m));
    let draw_pair = match (forecast.draw_probability, market.draw) {
        (Some(f), Some(m)) => Some((f, m)),
        _ => None,
    };

    let home_edge = home_pair.map(|(f, m)| edge(f, m));
    let away_edge = away_pair.map(|(f, m)| edge(f, m));
    let draw_edge = draw_pair.map(|(f, m)| edge(f, m));

    let candidates = [
        (Recommendation::Home, home_pair, home_edge),
        (Recommendation::Away, away_pair, away_edge),
        (Recommendation::Draw, draw_pair, draw_edge),
    ];

    let mut best: Option<(Recommendation, (Decimal, Decimal), Decimal)> = None;
    for (side, pair, side_edge) in candidates {
        let (Some(pair), Some(side_edge)) = (pair, side_edge) else {
            continue;
        };
        // strict comparison keeps the first side on ties
        if best.map_or(true, |(_, _, best_edge)| side_edge > best_edge) {
            best = Some((side, pair, side_edge));
        }
    }

    let best_edge = best.map(|(_, _, e)| e).unwrap_or(Decimal::ZERO);
    let recommended = match best {
        Some((side, pair, side_edge))
            if forecast.confidence >= MIN_CONFIDENCE && side_edge >= MIN_EDGE =>
        {
            Some((side, pair))
        }
        _ => None,
    };

    match recommended {
        Some((side, (forecast_p, market_p))) => EdgeDecision {
            side,
            edge_percent: best_edge,
            forecast_probability: Some(forecast_p),
            market_probability: Some(market_p),
            home_edge,
            away_edge,
            draw_edge,
        },
        None => EdgeDecision {
            side: Recommendation::None,
            edge_percent: best_edge,
            forecast_probability: None,
            market_probability: None,
            home_edge,
            away_edge,
            draw_edge,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn forecast(home: Decimal, away: Decimal, confidence: Decimal) -> ForecastResult {
        ForecastResult {
            home_win_probability: home,
            away_win_probability: away,
            draw_probability: None,
            confidence,
            key_factors: vec![],
            reasoning: String::new(),
            goal_difference_analysis: None,
            map_analysis: None,
            total_points_analysis: None,
        }
    }

    fn market(home: Decimal, away: Decimal) -> MarketProbabilities {
        MarketProbabilities {
            home: Some(home),
            away: Some(away),
            draw: None,
        }
    }

    #[test]
    fn edge_preserves_sign_and_rounds() {
        assert_eq!(edge(dec!(0.70), dec!(0.60)), dec!(0.10));
        assert_eq!(edge(dec!(0.40), dec!(0.60)), dec!(-0.20));
        assert_eq!(edge(dec!(0.333), dec!(0.30)), dec!(0.03));
    }

    #[test]
    fn low_confidence_forces_none_despite_large_edge() {
        let decision = decide(
            &forecast(dec!(0.90), dec!(0.10), dec!(0.55)),
            &market(dec!(0.60), dec!(0.40)),
        );
        assert_eq!(decision.side, Recommendation::None);
        // the edge table is still reported
        assert_eq!(decision.home_edge, Some(dec!(0.30)));
    }

    #[test]
    fn max_edge_side_wins_above_threshold() {
        // home edge 0.03, away edge 0.07 -> away
        let decision = decide(
            &forecast(dec!(0.63), dec!(0.37), dec!(0.8)),
            &market(dec!(0.60), dec!(0.30)),
        );
        assert_eq!(decision.side, Recommendation::Away);
        assert_eq!(decision.edge_percent, dec!(0.07));
        assert_eq!(decision.forecast_probability, Some(dec!(0.37)));
        assert_eq!(decision.market_probability, Some(dec!(0.30)));
    }

    #[test]
    fn below_edge_threshold_is_none() {
        // home edge 0.02, away edge 0.01
        let decision = decide(
            &forecast(dec!(0.62), dec!(0.38), dec!(0.8)),
            &market(dec!(0.60), dec!(0.37)),
        );
        assert_eq!(decision.side, Recommendation::None);
        assert_eq!(decision.edge_percent, dec!(0.02));
    }

    #[test]
    fn sides_without_market_probability_are_skipped() {
        let mut fc = forecast(dec!(0.70), dec!(0.30), dec!(0.9));
        fc.draw_probability = Some(dec!(0.20));
        let decision = decide(
            &fc,
            &MarketProbabilities {
                home: None,
                away: Some(dec!(0.20)),
                draw: None,
            },
        );
        // home has no market probability; away edge 0.10 wins
        assert_eq!(decision.side, Recommendation::Away);
        assert_eq!(decision.home_edge, None);
        assert_eq!(decision.draw_edge, None);
    }

    #[test]
    fn draw_participates_when_both_probabilities_exist() {
        let mut fc = forecast(dec!(0.30), dec!(0.30), dec!(0.8));
        fc.draw_probability = Some(dec!(0.40));
        let decision = decide(
            &fc,
            &MarketProbabilities {
                home: Some(dec!(0.35)),
                away: Some(dec!(0.35)),
                draw: Some(dec!(0.25)),
            },
        );
        assert_eq!(decision.side, Recommendation::Draw);
        assert_eq!(decision.edge_percent, dec!(0.15));
    }

    #[test]
    fn ties_resolve_in_home_away_draw_order() {
        let decision = decide(
            &forecast(dec!(0.60), dec!(0.50), dec!(0.8)),
            &market(dec!(0.50), dec!(0.40)),
        );
        // both edges 0.10; home is evaluated first
        assert_eq!(decision.side, Recommendation::Home);
    }

    #[test]
    fn no_market_data_yields_none_with_zero_edge() {
        let decision = decide(
            &forecast(dec!(0.70), dec!(0.30), dec!(0.9)),
            &MarketProbabilities::default(),
        );
        assert_eq!(decision.side, Recommendation::None);
        assert_eq!(decision.edge_percent, Decimal::ZERO);
        assert_eq!(decision.home_edge, None);
    }
}
