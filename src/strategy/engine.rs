//! Scan orchestration: catalogs → matching → odds → forecast → edge →
//! persisted analyses, plus the auto-execute betting pass.
//!
//! Batch operations report per-item counts; one bad fixture never aborts
//! the rest of the pass.

use chrono::{Duration, Utc};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::adapters::{GammaClient, RecordStore, ScheduleClient};
use crate::cache::TtlCache;
use crate::config::{AppConfig, MIN_EDGE};
use crate::domain::{
    AnalysisRecord, BetRequest, Category, ExtractedOdds, ForecastResult, GameInfo, MarketEvent,
    OrderSide, Recommendation, SeasonOdds, StrategyConfig,
};
use crate::error::Result;
use crate::forecast::{BasketballFacts, ForecastFacts, Forecaster};
use crate::matching::{
    build_game_odds_index, pair_games_with_odds, split_matches_and_futures, MatchedFixture,
    TeamDirectory,
};
use crate::odds::{build_season_odds_map, extract_odds, SeasonMarkets};
use crate::execution::BetLifecycle;
use crate::strategy::edge::{decide, MarketProbabilities};
use crate::strategy::sizing::{bet_amount, should_bet};

/// Result of one reconciliation pass
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub analyses: Vec<AnalysisRecord>,
    pub failed: usize,
}

impl ScanOutcome {
    pub fn analyzed(&self) -> usize {
        self.analyses.len()
    }

    /// Analyses whose best edge clears the actionable threshold
    pub fn with_edge(&self) -> usize {
        self.analyses
            .iter()
            .filter(|a| a.edge_percent > MIN_EDGE)
            .count()
    }
}

/// Result of one auto-execute pass
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoExecuteReport {
    pub executed: usize,
    pub skipped: usize,
}

/// The reconciliation-and-decision pipeline
pub struct ScanEngine {
    cache: Arc<TtlCache>,
    schedule: ScheduleClient,
    gamma: GammaClient,
    forecaster: Arc<dyn Forecaster>,
    store: Arc<dyn RecordStore>,
    lifecycle: Arc<BetLifecycle>,
    directory: TeamDirectory,
    schedule_ttl: Duration,
    markets_ttl: Duration,
    season_ttl: Duration,
    match_limit: usize,
}

impl ScanEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: &AppConfig,
        cache: Arc<TtlCache>,
        schedule: ScheduleClient,
        gamma: GammaClient,
        forecaster: Arc<dyn Forecaster>,
        store: Arc<dyn RecordStore>,
        lifecycle: Arc<BetLifecycle>,
    ) -> Self {
        Self {
            cache,
            schedule,
            gamma,
            forecaster,
            store,
            lifecycle,
            directory: TeamDirectory::nba(),
            schedule_ttl: Duration::seconds(config.cache.schedule_ttl_secs),
            markets_ttl: Duration::seconds(config.cache.markets_ttl_secs),
            season_ttl: Duration::seconds(config.cache.season_ttl_secs),
            match_limit: config.providers.match_limit,
        }
    }

    /// Run the scan for one category
    pub async fn scan(&self, category: Category) -> Result<ScanOutcome> {
        match category {
            Category::Basketball => self.scan_basketball().await,
            other => self.scan_matches(other).await,
        }
    }

    /// Today's basketball slate against season futures and single-game
    /// markets, one analysis per game.
    pub async fn scan_basketball(&self) -> Result<ScanOutcome> {
        let games: Vec<GameInfo> = self
            .cache
            .get_or_compute("schedule:today", self.schedule_ttl, || async {
                Ok(self.schedule.fetch_schedule(0).await)
            })
            .await?;
        if games.is_empty() {
            info!("scan: no games scheduled today");
            return Ok(ScanOutcome::default());
        }

        let season: SeasonMarkets = self
            .cache
            .get_or_compute("poly:nba-season", self.season_ttl, || async {
                Ok(self.gamma.fetch_season_markets().await)
            })
            .await?;
        let season_map = build_season_odds_map(&season, &self.directory);

        let match_events: Vec<MarketEvent> = self
            .cache
            .get_or_compute("poly:nba-games", self.markets_ttl, || async {
                Ok(self.gamma.fetch_match_events().await)
            })
            .await?;
        let index = build_game_odds_index(match_events, &self.directory, "nba");
        info!(
            "scan: {} games, {} fixtures with game odds",
            games.len(),
            index.len() / 2
        );

        let mut outcome = ScanOutcome::default();
        for (game, odds) in pair_games_with_odds(&games, &index) {
            let odds = odds.cloned().unwrap_or_default();
            match self.analyze_basketball_game(game, odds, &season_map).await {
                Ok(record) => outcome.analyses.push(record),
                Err(e) => {
                    warn!(
                        "scan: analysis failed for {} vs {}: {e}",
                        game.home_team.team_name, game.away_team.team_name
                    );
                    outcome.failed += 1;
                }
            }
        }
        Ok(outcome)
    }

    /// Category events split into fixtures and futures, both cached
    pub async fn matches_and_futures(
        &self,
        category: Category,
    ) -> Result<(Vec<MatchedFixture>, Vec<MarketEvent>)> {
        let key = format!("poly:{category}-events");
        let events: Vec<MarketEvent> = self
            .cache
            .get_or_compute(&key, self.markets_ttl, || async {
                Ok(self.gamma.fetch_category_events(category).await)
            })
            .await?;
        Ok(split_matches_and_futures(events, self.match_limit))
    }

    /// Football/esports scan over vs-match fixtures
    pub async fn scan_matches(&self, category: Category) -> Result<ScanOutcome> {
        let (fixtures, _futures) = self.matches_and_futures(category).await?;
        info!("scan: {} {category} fixtures", fixtures.len());
        Ok(self.analyze_fixtures(&fixtures).await)
    }

    /// Analyze a batch of fixtures with per-item failure isolation: one bad
    /// forecast is counted, never propagated.
    pub async fn analyze_fixtures(&self, fixtures: &[MatchedFixture]) -> ScanOutcome {
        let mut outcome = ScanOutcome::default();
        for fixture in fixtures {
            match self.analyze_fixture(fixture).await {
                Ok(record) => outcome.analyses.push(record),
                Err(e) => {
                    warn!(
                        "scan: analysis failed for {} vs {}: {e}",
                        fixture.home.canonical, fixture.away.canonical
                    );
                    outcome.failed += 1;
                }
            }
        }
        outcome
    }

    async fn analyze_basketball_game(
        &self,
        game: &GameInfo,
        odds: ExtractedOdds,
        season_map: &HashMap<String, SeasonOdds>,
    ) -> Result<AnalysisRecord> {
        let home = &game.home_team;
        let away = &game.away_team;

        // independent provider lookups, no ordering between them
        let (home_stats, away_stats, home_players, away_players, head_to_head) = tokio::join!(
            self.schedule.fetch_team_stats(home.team_id),
            self.schedule.fetch_team_stats(away.team_id),
            self.schedule.fetch_team_players(home.team_id),
            self.schedule.fetch_team_players(away.team_id),
            self.schedule.fetch_head_to_head(home.team_id, away.team_id),
        );

        let facts = ForecastFacts {
            category: Category::Basketball,
            home_team: home.team_name.clone(),
            away_team: away.team_name.clone(),
            match_date: game.game_date.clone(),
            event_title: format!("{} vs {}", home.team_name, away.team_name),
            odds: odds.clone(),
            basketball: Some(BasketballFacts {
                home_stats,
                away_stats,
                home_players,
                away_players,
                head_to_head,
            }),
        };

        let forecast = self.forecaster.forecast(&facts).await?;
        let decision = decide(&forecast, &MarketProbabilities::from(&odds));

        let home_season = season_map.get(&home.team_name);
        let away_season = season_map.get(&away.team_name);
        let market_id = home_season
            .and_then(|s| s.championship_market_id.clone())
            .or_else(|| away_season.and_then(|s| s.championship_market_id.clone()))
            .unwrap_or_else(|| game.game_id.clone());
        // recommended side's price when a side was picked; otherwise the best
        // probability available as display context
        let market_price = decision
            .market_probability
            .or(odds.moneyline_home)
            .or_else(|| home_season.and_then(|s| s.championship_price));

        let record = self.build_record(
            market_id,
            game.game_id.clone(),
            Category::Basketball,
            &facts,
            &forecast,
            decision.side,
            decision.edge_percent,
            market_price,
            token_for_side(&odds, decision.side),
            game.game_date.clone(),
        );
        self.store.create_analysis(&record).await?;
        Ok(record)
    }

    async fn analyze_fixture(&self, fixture: &MatchedFixture) -> Result<AnalysisRecord> {
        let event = &fixture.event;
        let odds = extract_odds(&event.markets, &fixture.home, &fixture.away, event.category);

        let match_date = event
            .start_date
            .or(event.end_date)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();

        let facts = ForecastFacts {
            category: event.category,
            home_team: fixture.home.canonical.clone(),
            away_team: fixture.away.canonical.clone(),
            match_date: match_date.clone(),
            event_title: event.title.clone(),
            odds: odds.clone(),
            basketball: None,
        };

        let forecast = self.forecaster.forecast(&facts).await?;
        let decision = decide(&forecast, &MarketProbabilities::from(&odds));
        let market_price = decision.market_probability.or(odds.moneyline_home);

        let record = self.build_record(
            event.id.clone(),
            event.id.clone(),
            event.category,
            &facts,
            &forecast,
            decision.side,
            decision.edge_percent,
            market_price,
            token_for_side(&odds, decision.side),
            match_date,
        );
        self.store.create_analysis(&record).await?;
        Ok(record)
    }

    #[allow(clippy::too_many_arguments)]
    fn build_record(
        &self,
        market_id: String,
        condition_id: String,
        category: Category,
        facts: &ForecastFacts,
        forecast: &ForecastResult,
        side: Recommendation,
        edge_percent: rust_decimal::Decimal,
        market_price: Option<rust_decimal::Decimal>,
        token_id: Option<String>,
        game_date: String,
    ) -> AnalysisRecord {
        let reasoning = json!({
            "reasoning": forecast.reasoning,
            "keyFactors": forecast.key_factors,
            "goalDifferenceAnalysis": forecast.goal_difference_analysis,
            "mapAnalysis": forecast.map_analysis,
            "totalPointsAnalysis": forecast.total_points_analysis,
        })
        .to_string();

        AnalysisRecord {
            id: Uuid::new_v4(),
            market_id,
            condition_id,
            category: category.as_str().to_string(),
            home_team: facts.home_team.clone(),
            away_team: facts.away_team.clone(),
            game_date,
            home_win_prob: forecast.home_win_probability,
            away_win_prob: forecast.away_win_probability,
            draw_prob: forecast.draw_probability,
            confidence: forecast.confidence,
            reasoning,
            market_price,
            edge_percent,
            recommended_side: side,
            token_id,
            created_at: Utc::now(),
        }
    }

    /// Scan, then place bets for every qualifying analysis under the user's
    /// first active auto-execute strategy.
    pub async fn execute_auto(&self, user_id: &str) -> Result<AutoExecuteReport> {
        let strategies = self.store.active_auto_strategies(user_id).await?;
        let Some(strategy) = strategies.first() else {
            info!("auto: no active auto-execute strategies for {user_id}");
            return Ok(AutoExecuteReport::default());
        };

        let outcome = self.scan_basketball().await?;
        self.place_qualifying_bets(user_id, strategy, &outcome.analyses)
            .await
    }

    /// Betting pass over already-produced analyses.
    ///
    /// The daily spend is read once per batch; per-item failures are counted
    /// as skips, never propagated.
    pub async fn place_qualifying_bets(
        &self,
        user_id: &str,
        strategy: &StrategyConfig,
        analyses: &[AnalysisRecord],
    ) -> Result<AutoExecuteReport> {
        let daily_spent = self
            .store
            .daily_spent(user_id, Utc::now().date_naive())
            .await?;

        let mut report = AutoExecuteReport::default();
        for analysis in analyses {
            if !should_bet(analysis, strategy) {
                report.skipped += 1;
                continue;
            }
            let amount = bet_amount(analysis.edge_percent, strategy, daily_spent);
            if amount <= rust_decimal::Decimal::ZERO {
                report.skipped += 1;
                continue;
            }
            let (Some(token_id), Some(price)) = (analysis.token_id.clone(), analysis.market_price)
            else {
                // nothing to execute against without a token and a price
                report.skipped += 1;
                continue;
            };

            let request = BetRequest {
                analysis_id: analysis.id,
                token_id,
                side: OrderSide::Buy,
                outcome: "YES".to_string(),
                amount,
                price,
            };
            match self.lifecycle.place_bet(user_id, request).await {
                Ok(placed) => {
                    info!(
                        "auto: placed bet {} ({} on {} vs {})",
                        placed.bet_id,
                        analysis.recommended_side,
                        analysis.home_team,
                        analysis.away_team
                    );
                    report.executed += 1;
                }
                Err(e) => {
                    warn!("auto: bet execution failed: {e}");
                    report.skipped += 1;
                }
            }
        }
        Ok(report)
    }
}

fn token_for_side(odds: &ExtractedOdds, side: Recommendation) -> Option<String> {
    match side {
        Recommendation::Home => odds.home_token_id.clone(),
        Recommendation::Away => odds.away_token_id.clone(),
        _ => None,
    }
}
