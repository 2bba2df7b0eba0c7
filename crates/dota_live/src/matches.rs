//! Live match records as returned by `GetLiveLeagueGames`, plus the pure
//! filter / selection / formatting steps every command goes through.

use serde_json::Value;

/// One entry of `result.games`, kept verbatim.
///
/// The provider payload is large and loosely specified, so only the fields the
/// bot reads are exposed through accessors. Nothing is ever written back.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord(Value);

/// Matches in the order the provider returned them.
pub type LiveMatchList = Vec<MatchRecord>;

const UNKNOWN_TEAM: &str = "?";

impl MatchRecord {
    pub fn new(raw: Value) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> &Value {
        &self.0
    }

    /// 0 (or absent / not an integer) means the game is not part of a tracked series.
    pub fn series_type(&self) -> i64 {
        self.0.pointer("/series_type").and_then(Value::as_i64).unwrap_or(0)
    }

    pub fn spectators(&self) -> u64 {
        self.0.pointer("/spectators").and_then(Value::as_u64).unwrap_or(0)
    }

    pub fn radiant_team_name(&self) -> &str {
        self.team_name("/radiant_team/team_name")
    }

    pub fn dire_team_name(&self) -> &str {
        self.team_name("/dire_team/team_name")
    }

    fn team_name(&self, pointer: &str) -> &str {
        self.0.pointer(pointer).and_then(Value::as_str).unwrap_or(UNKNOWN_TEAM)
    }
}

/// Keeps only games that belong to a series (`series_type > 0`), preserving order.
pub fn filter_live_matches(matches: LiveMatchList) -> LiveMatchList {
    matches.into_iter().filter(|m| m.series_type() > 0).collect()
}

/// Highest spectator count; on a tie the earliest match wins.
pub fn most_watched(matches: &[MatchRecord]) -> Option<&MatchRecord> {
    // max_by_key returns the last maximum, so fold manually to keep the first one.
    matches.iter().fold(None, |best, m| match best {
        Some(b) if b.spectators() >= m.spectators() => Some(b),
        _ => Some(m),
    })
}

pub fn format_match(m: &MatchRecord) -> String {
    format!(
        "{} -- {} ({} зрителей)",
        m.radiant_team_name(),
        m.dire_team_name(),
        m.spectators()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn game(series_type: i64, spectators: u64, radiant: &str, dire: &str) -> MatchRecord {
        MatchRecord::new(json!({
            "series_type": series_type,
            "spectators": spectators,
            "radiant_team": { "team_name": radiant },
            "dire_team": { "team_name": dire },
        }))
    }

    #[test]
    fn filter_keeps_only_series_games_in_order() {
        let all = vec![
            game(0, 10, "A", "B"),
            game(1, 20, "C", "D"),
            game(-1, 30, "E", "F"),
            game(2, 5, "G", "H"),
            MatchRecord::new(json!({ "spectators": 99 })),
        ];

        let kept = filter_live_matches(all.clone());

        assert_eq!(kept, vec![all[1].clone(), all[3].clone()]);
    }

    #[test]
    fn filter_is_idempotent() {
        let all = vec![game(0, 1, "A", "B"), game(3, 2, "C", "D"), game(1, 3, "E", "F")];

        let once = filter_live_matches(all);
        let twice = filter_live_matches(once.clone());

        assert_eq!(once, twice);
    }

    #[test]
    fn filter_of_empty_is_empty() {
        assert!(filter_live_matches(Vec::new()).is_empty());
    }

    #[test]
    fn non_integer_series_type_counts_as_zero() {
        let odd = vec![
            MatchRecord::new(json!({ "series_type": "2" })),
            MatchRecord::new(json!({ "series_type": null })),
            MatchRecord::new(json!({ "series_type": 1.5 })),
        ];

        assert!(filter_live_matches(odd).is_empty());
    }

    #[test]
    fn most_watched_takes_first_maximum() {
        let games = vec![
            game(1, 5, "A", "B"),
            game(1, 20, "first", "x"),
            game(1, 20, "second", "y"),
            game(1, 3, "C", "D"),
        ];

        let best = most_watched(&games).unwrap();

        assert_eq!(best.spectators(), 20);
        assert_eq!(best.radiant_team_name(), "first");
    }

    #[test]
    fn most_watched_of_empty_is_none() {
        assert!(most_watched(&[]).is_none());
    }

    #[test]
    fn formats_reply_line() {
        assert_eq!(format_match(&game(2, 100, "A", "B")), "A -- B (100 зрителей)");
    }

    #[test]
    fn missing_team_names_fall_back() {
        let m = MatchRecord::new(json!({ "series_type": 1, "spectators": 7, "radiant_team": {} }));
        assert_eq!(format_match(&m), "? -- ? (7 зрителей)");
    }
}
