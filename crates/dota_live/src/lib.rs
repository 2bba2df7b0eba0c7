//! Dota Live — live Dota 2 league games for chat commands
//!
//! Fetch from the Steam Web API → keep series games → answer
//! `/start`, `/help`, `/all_matches`, `/get_the_most_watched_match`.

pub mod commands;
pub mod fetcher;
pub mod matches;

pub use commands::{ChatTransport, Command, CommandRouter, HELP_TEXT, NO_MATCHES_TEXT, WELCOME_TEXT};
pub use fetcher::{FetchError, FetcherConfig, LiveMatchFetcher, MatchSource};
pub use matches::{filter_live_matches, format_match, most_watched, LiveMatchList, MatchRecord};
