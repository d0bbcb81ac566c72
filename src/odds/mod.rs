//! Market question classification and odds derivation.

pub mod extractor;
pub mod season;

pub use extractor::{extract_odds, parse_first_number, RuleInput};
pub use season::{build_season_odds_map, SeasonMarkets};
