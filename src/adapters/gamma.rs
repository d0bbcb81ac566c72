//! Polymarket Gamma API client.
//!
//! Gamma nests outcome labels, prices, and token ids as JSON-encoded string
//! fields; all of them decode defensively to empty vectors. One malformed
//! event never poisons a batch — events deserialize individually.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use reqwest::Client;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration as StdDuration;
use tracing::{debug, warn};

use crate::domain::{Category, Market, MarketEvent};
use crate::error::{Result, TipoffError};
use crate::odds::SeasonMarkets;

/// Gamma tag ids: individual match/game bets, soccer, esports
const MATCH_TAG_ID: &str = "100639";
const SOCCER_TAG_ID: &str = "100350";
const ESPORTS_TAG_ID: &str = "64";

/// The match tag returns every sport; cap the page by volume
const MATCH_EVENT_LIMIT: usize = 50;

/// Gamma slugs for the NBA season futures events
pub const NBA_CHAMPIONSHIP_SLUG: &str = "2026-nba-champion";
pub const NBA_EASTERN_SLUG: &str = "nba-eastern-conference-champion-442";
pub const NBA_WESTERN_SLUG: &str = "nba-western-conference-champion-933";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GammaMarket {
    id: String,
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    group_item_title: Option<String>,
    /// JSON-encoded array of outcome labels
    #[serde(default)]
    outcomes: Option<String>,
    /// JSON-encoded array of prices (strings or numbers)
    #[serde(default)]
    outcome_prices: Option<String>,
    /// JSON-encoded array of CLOB token ids
    #[serde(default)]
    clob_token_ids: Option<String>,
    #[serde(default)]
    active: Option<bool>,
    #[serde(default)]
    closed: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GammaEvent {
    id: String,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
    /// Number or string depending on the endpoint
    #[serde(default)]
    volume: Value,
    #[serde(default)]
    liquidity: Value,
    #[serde(default)]
    markets: Vec<GammaMarket>,
}

/// Decode a JSON-encoded string field to labels; malformed → empty
fn parse_string_array(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    serde_json::from_str::<Vec<String>>(raw).unwrap_or_default()
}

/// Decode a JSON-encoded string field to prices; elements may be strings or
/// numbers; malformed → empty
fn parse_price_array(raw: Option<&str>) -> Vec<Decimal> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    let Ok(values) = serde_json::from_str::<Vec<Value>>(raw) else {
        return Vec::new();
    };
    values
        .iter()
        .filter_map(|value| match value {
            Value::String(s) => s.parse().ok(),
            Value::Number(n) => n.as_f64().and_then(Decimal::from_f64),
            _ => None,
        })
        .collect()
}

/// Number-or-string field to Decimal; anything else → zero
fn value_to_decimal(value: &Value) -> Decimal {
    match value {
        Value::Number(n) => n.as_f64().and_then(Decimal::from_f64).unwrap_or_default(),
        Value::String(s) => s.parse().unwrap_or_default(),
        _ => Decimal::ZERO,
    }
}

fn parse_date(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn normalize_market(raw: &GammaMarket) -> Market {
    Market {
        id: raw.id.clone(),
        question: raw.question.clone().unwrap_or_default(),
        group_item_title: raw.group_item_title.clone(),
        outcomes: parse_string_array(raw.outcomes.as_deref()),
        outcome_prices: parse_price_array(raw.outcome_prices.as_deref()),
        clob_token_ids: parse_string_array(raw.clob_token_ids.as_deref()),
        active: raw.active.unwrap_or(false),
        closed: raw.closed.unwrap_or(true),
    }
}

/// Normalize a raw event; `None` when expired or without active markets
fn normalize_event(raw: GammaEvent, category: Category, now: DateTime<Utc>) -> Option<MarketEvent> {
    let end_date = parse_date(raw.end_date.as_deref());
    if matches!(end_date, Some(end) if end < now) {
        return None;
    }

    let markets: Vec<Market> = raw
        .markets
        .iter()
        .map(normalize_market)
        .filter(|m| m.active && !m.closed)
        .collect();
    if markets.is_empty() {
        return None;
    }

    Some(MarketEvent {
        id: raw.id,
        slug: raw.slug.unwrap_or_default(),
        title: raw.title.unwrap_or_default(),
        description: raw.description.unwrap_or_default(),
        start_date: parse_date(raw.start_date.as_deref()),
        end_date,
        volume: value_to_decimal(&raw.volume),
        liquidity: value_to_decimal(&raw.liquidity),
        markets,
        category,
    })
}

/// Client for the prediction-market provider
#[derive(Clone)]
pub struct GammaClient {
    http: Client,
    base_url: String,
    event_fetch_limit: usize,
}

impl GammaClient {
    pub fn new(base_url: &str, event_fetch_limit: usize) -> Result<Self> {
        let http = Client::builder()
            .timeout(StdDuration::from_secs(20))
            .build()
            .map_err(|e| {
                TipoffError::Internal(format!("failed to build Gamma HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            event_fetch_limit,
        })
    }

    /// Raw event page; upstream unavailability degrades to an empty page
    async fn fetch_raw_events(&self, query: &str) -> Vec<GammaEvent> {
        let url = format!("{}/events?{query}", self.base_url);
        let response = match self.http.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("gamma: request failed ({query}): {e}");
                return Vec::new();
            }
        };
        if !response.status().is_success() {
            warn!("gamma: non-success status {} ({query})", response.status());
            return Vec::new();
        }

        // Decode events one by one so a single malformed entry is skipped,
        // not fatal to the batch
        let values = match response.json::<Vec<Value>>().await {
            Ok(values) => values,
            Err(e) => {
                warn!("gamma: malformed body ({query}): {e}");
                return Vec::new();
            }
        };
        values
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<GammaEvent>(value) {
                Ok(event) => Some(event),
                Err(e) => {
                    debug!("gamma: skipping malformed event: {e}");
                    None
                }
            })
            .collect()
    }

    async fn fetch_events_by_tag(
        &self,
        tag_id: &str,
        limit: usize,
        category: Category,
    ) -> Vec<MarketEvent> {
        let query = format!(
            "tag_id={tag_id}&active=true&closed=false&limit={limit}&offset=0&order=volume&ascending=false"
        );
        let now = Utc::now();
        let events: Vec<MarketEvent> = self
            .fetch_raw_events(&query)
            .await
            .into_iter()
            .filter_map(|raw| normalize_event(raw, category, now))
            .collect();
        debug!(
            "gamma: {} live events for tag {tag_id} ({category})",
            events.len()
        );
        events
    }

    /// Single-game markets across sports (match tag), capped by volume
    pub async fn fetch_match_events(&self) -> Vec<MarketEvent> {
        self.fetch_events_by_tag(MATCH_TAG_ID, MATCH_EVENT_LIMIT, Category::Basketball)
            .await
    }

    /// Category catalog (football or esports)
    pub async fn fetch_category_events(&self, category: Category) -> Vec<MarketEvent> {
        let tag_id = match category {
            Category::Basketball => MATCH_TAG_ID,
            Category::Football => SOCCER_TAG_ID,
            Category::Esports => ESPORTS_TAG_ID,
        };
        self.fetch_events_by_tag(tag_id, self.event_fetch_limit, category)
            .await
    }

    /// Markets of one event looked up by slug
    async fn fetch_markets_by_slug(&self, slug: &str) -> Vec<Market> {
        let events = self.fetch_raw_events(&format!("slug={slug}")).await;
        events
            .into_iter()
            .next()
            .map(|event| event.markets.iter().map(normalize_market).collect())
            .unwrap_or_default()
    }

    /// The three NBA season futures events, fetched concurrently
    pub async fn fetch_season_markets(&self) -> SeasonMarkets {
        let mut results = join_all([
            self.fetch_markets_by_slug(NBA_CHAMPIONSHIP_SLUG),
            self.fetch_markets_by_slug(NBA_EASTERN_SLUG),
            self.fetch_markets_by_slug(NBA_WESTERN_SLUG),
        ])
        .await;

        let western = results.pop().unwrap_or_default();
        let eastern = results.pop().unwrap_or_default();
        let championship = results.pop().unwrap_or_default();

        SeasonMarkets {
            championship,
            eastern,
            western,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn price_array_handles_strings_numbers_and_garbage() {
        assert_eq!(
            parse_price_array(Some(r#"["0.55","0.45"]"#)),
            vec![dec!(0.55), dec!(0.45)]
        );
        assert_eq!(
            parse_price_array(Some("[0.62, 0.38]")),
            vec![dec!(0.62), dec!(0.38)]
        );
        assert!(parse_price_array(Some("not json")).is_empty());
        assert!(parse_price_array(None).is_empty());
    }

    #[test]
    fn string_array_degrades_to_empty() {
        assert_eq!(
            parse_string_array(Some(r#"["Yes","No"]"#)),
            vec!["Yes".to_string(), "No".to_string()]
        );
        assert!(parse_string_array(Some("{broken")).is_empty());
    }

    #[test]
    fn expired_or_marketless_events_are_dropped() {
        let raw = GammaEvent {
            id: "e1".to_string(),
            slug: Some("old-event".to_string()),
            title: Some("A vs B".to_string()),
            description: None,
            start_date: None,
            end_date: Some("2020-01-01T00:00:00Z".to_string()),
            volume: Value::Null,
            liquidity: Value::Null,
            markets: vec![],
        };
        assert!(normalize_event(raw, Category::Football, Utc::now()).is_none());

        let no_active = GammaEvent {
            id: "e2".to_string(),
            slug: None,
            title: Some("A vs B".to_string()),
            description: None,
            start_date: None,
            end_date: None,
            volume: Value::from(10.0),
            liquidity: Value::Null,
            markets: vec![GammaMarket {
                id: "m1".to_string(),
                question: Some("Will A win?".to_string()),
                group_item_title: None,
                outcomes: Some(r#"["Yes","No"]"#.to_string()),
                outcome_prices: Some(r#"["0.5","0.5"]"#.to_string()),
                clob_token_ids: None,
                active: Some(false),
                closed: Some(true),
            }],
        };
        assert!(normalize_event(no_active, Category::Football, Utc::now()).is_none());
    }

    #[test]
    fn event_normalizes_nested_fields() {
        let raw = GammaEvent {
            id: "e3".to_string(),
            slug: Some("thunder-nuggets".to_string()),
            title: Some("Thunder vs Nuggets".to_string()),
            description: None,
            start_date: Some("2026-02-01T00:00:00Z".to_string()),
            end_date: None,
            volume: Value::String("125000.5".to_string()),
            liquidity: Value::from(4000.0),
            markets: vec![GammaMarket {
                id: "m1".to_string(),
                question: Some("Thunder vs Nuggets Winner".to_string()),
                group_item_title: None,
                outcomes: Some(r#"["Thunder","Nuggets"]"#.to_string()),
                outcome_prices: Some(r#"["0.64","0.36"]"#.to_string()),
                clob_token_ids: Some(r#"["111","222"]"#.to_string()),
                active: Some(true),
                closed: Some(false),
            }],
        };
        let event = normalize_event(raw, Category::Basketball, Utc::now()).unwrap();
        assert_eq!(event.volume, dec!(125000.5));
        assert_eq!(event.markets.len(), 1);
        assert_eq!(event.markets[0].outcome_prices, vec![dec!(0.64), dec!(0.36)]);
        assert_eq!(event.markets[0].clob_token_ids, vec!["111", "222"]);
    }
}
