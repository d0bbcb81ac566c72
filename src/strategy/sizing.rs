//! Bet sizing under a capped-Kelly policy with a rolling daily budget.
//!
//! This is deliberately NOT the classical odds-based Kelly criterion: the
//! stake fraction is `min(edge * 2, 0.25)` of the strategy's max bet - a
//! conservative heuristic bounded above by a fixed fraction, applied to the
//! per-bet cap rather than the bankroll.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::config::MIN_EDGE;
use crate::domain::{AnalysisRecord, Recommendation, StrategyConfig};

/// Hard ceiling on the Kelly fraction
pub const KELLY_FRACTION_CAP: Decimal = dec!(0.25);

/// Gate a single analysis against the user's strategy policy
pub fn should_bet(analysis: &AnalysisRecord, strategy: &StrategyConfig) -> bool {
    if !strategy.is_active {
        return false;
    }
    if analysis.recommended_side == Recommendation::None {
        return false;
    }
    if analysis.confidence < strategy.min_confidence {
        return false;
    }
    if analysis.edge_percent < MIN_EDGE {
        return false;
    }
    true
}

/// Size a bet from its edge, bounded by the per-bet cap and the budget left
/// today. An exhausted budget always sizes to zero.
pub fn bet_amount(edge: Decimal, strategy: &StrategyConfig, daily_spent: Decimal) -> Decimal {
    let remaining = strategy.daily_budget - daily_spent;
    if remaining <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let kelly_fraction = (edge * dec!(2)).min(KELLY_FRACTION_CAP);
    let kelly_amount = strategy.max_bet_amount * kelly_fraction;

    kelly_amount.min(strategy.max_bet_amount).min(remaining)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn strategy(max_bet: Decimal, daily_budget: Decimal) -> StrategyConfig {
        StrategyConfig {
            id: Uuid::new_v4(),
            user_id: "user-1".to_string(),
            name: "default".to_string(),
            is_active: true,
            min_confidence: dec!(0.6),
            max_bet_amount: max_bet,
            daily_budget,
            auto_execute: true,
        }
    }

    fn analysis(side: Recommendation, confidence: Decimal, edge: Decimal) -> AnalysisRecord {
        AnalysisRecord {
            id: Uuid::new_v4(),
            market_id: "m1".to_string(),
            condition_id: "c1".to_string(),
            category: "basketball".to_string(),
            home_team: "Boston Celtics".to_string(),
            away_team: "Miami Heat".to_string(),
            game_date: "2026-01-15".to_string(),
            home_win_prob: dec!(0.6),
            away_win_prob: dec!(0.4),
            draw_prob: None,
            confidence,
            reasoning: String::new(),
            market_price: Some(dec!(0.5)),
            edge_percent: edge,
            recommended_side: side,
            token_id: Some("tok".to_string()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn exhausted_budget_sizes_to_zero() {
        let amount = bet_amount(dec!(0.30), &strategy(dec!(10), dec!(50)), dec!(50));
        assert_eq!(amount, Decimal::ZERO);
    }

    #[test]
    fn capped_kelly_worked_example() {
        // edge 0.20 -> fraction min(0.40, 0.25) = 0.25; 10 * 0.25 = 2.5
        let amount = bet_amount(dec!(0.20), &strategy(dec!(10), dec!(100)), Decimal::ZERO);
        assert_eq!(amount, dec!(2.5));
    }

    #[test]
    fn small_edge_scales_linearly() {
        // edge 0.06 -> fraction 0.12; 10 * 0.12 = 1.2
        let amount = bet_amount(dec!(0.06), &strategy(dec!(10), dec!(100)), Decimal::ZERO);
        assert_eq!(amount, dec!(1.2));
    }

    #[test]
    fn remaining_budget_caps_the_stake() {
        let amount = bet_amount(dec!(0.20), &strategy(dec!(10), dec!(50)), dec!(48));
        assert_eq!(amount, dec!(2));
    }

    #[test]
    fn gate_rejects_each_condition() {
        let base = strategy(dec!(10), dec!(50));

        let mut inactive = base.clone();
        inactive.is_active = false;
        assert!(!should_bet(
            &analysis(Recommendation::Home, dec!(0.8), dec!(0.10)),
            &inactive
        ));

        assert!(!should_bet(
            &analysis(Recommendation::None, dec!(0.8), dec!(0.10)),
            &base
        ));
        assert!(!should_bet(
            &analysis(Recommendation::Home, dec!(0.5), dec!(0.10)),
            &base
        ));
        assert!(!should_bet(
            &analysis(Recommendation::Home, dec!(0.8), dec!(0.04)),
            &base
        ));
        assert!(should_bet(
            &analysis(Recommendation::Home, dec!(0.8), dec!(0.10)),
            &base
        ));
    }
}
