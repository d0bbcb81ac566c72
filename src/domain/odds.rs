//! Derived odds records produced by the extractor.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How the moneyline fields of an [`ExtractedOdds`] were populated.
///
/// The first-binary-market fallback is still informative but cannot be tied
/// to a team identity, so callers that care can tell the two apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OddsSource {
    /// Outcome labels (or the question text) matched a team identity
    NameMatched,
    /// First two-outcome market taken verbatim, in listed order
    FallbackFirstBinary,
}

/// Structured odds extracted from one matched event's markets.
///
/// Every numeric field is `None` until a classification rule populates it;
/// `0` is a legitimate probability and never stands in for "no data".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedOdds {
    pub moneyline_home: Option<Decimal>,
    pub moneyline_away: Option<Decimal>,
    /// Question text of the spread market, kept verbatim as the label
    pub spread_label: Option<String>,
    pub spread_price: Option<Decimal>,
    pub over_under_line: Option<Decimal>,
    pub over_price: Option<Decimal>,
    pub under_price: Option<Decimal>,
    pub draw: Option<Decimal>,
    /// Moneyline provenance; `None` when no moneyline was populated
    pub source: Option<OddsSource>,
    /// CLOB token ids for the (home, away) moneyline outcomes when known
    pub home_token_id: Option<String>,
    pub away_token_id: Option<String>,
}

impl ExtractedOdds {
    pub fn has_moneyline(&self) -> bool {
        self.moneyline_home.is_some() || self.moneyline_away.is_some()
    }

    /// Same fixture viewed from the opposite orientation.
    ///
    /// Moneyline fields and their token ids swap; spread/total/draw fields are
    /// orientation-independent and carry over unchanged.
    pub fn reversed(&self) -> Self {
        Self {
            moneyline_home: self.moneyline_away,
            moneyline_away: self.moneyline_home,
            home_token_id: self.away_token_id.clone(),
            away_token_id: self.home_token_id.clone(),
            ..self.clone()
        }
    }
}

/// Season futures prices for one team (championship + conference winner)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeasonOdds {
    pub championship_price: Option<Decimal>,
    pub championship_market_id: Option<String>,
    pub conference_price: Option<Decimal>,
    pub conference_market_id: Option<String>,
}
