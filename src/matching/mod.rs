//! Team/event matching: alias resolution, fixture title parsing, and
//! schedule ↔ market pairing.

pub mod fixture;
pub mod teams;

pub use fixture::{
    build_game_odds_index, pair_games_with_odds, parse_fixture_title, split_matches_and_futures,
    FixtureOddsIndex, MatchedFixture,
};
pub use teams::{Conference, TeamDirectory, TeamEntry, TeamIdentity, NBA_TEAMS};
