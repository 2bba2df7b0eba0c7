//! Live games fetcher against a mocked Steam Web API.
//!
//! Run with: cargo test -p dota_live --test fetch_live

use std::time::Duration;

use dota_live::{
    Command, CommandRouter, FetchError, FetcherConfig, LiveMatchFetcher, NO_MATCHES_TEXT,
};
use logger::EventLogger;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LIVE_PATH: &str = "/IDOTA2Match_570/GetLiveLeagueGames/v1";
const API_KEY: &str = "test-key-123";

fn log_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create tempdir")
}

fn fetcher_for(server: &MockServer, dir: &TempDir) -> LiveMatchFetcher {
    let mut config = FetcherConfig::new(API_KEY);
    config.endpoint = format!("{}{}", server.uri(), LIVE_PATH);
    config.timeout = Duration::from_millis(500);
    LiveMatchFetcher::new(config, EventLogger::new(dir.path()))
}

async fn mount(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(LIVE_PATH))
        .and(query_param("key", API_KEY))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn returns_games_in_provider_order() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({
            "result": {
                "games": [
                    { "series_type": 0, "spectators": 5 },
                    { "series_type": 1, "spectators": 9, "league_id": 17420 },
                ],
                "status": 200
            }
        })),
    )
    .await;
    let dir = log_dir();

    let games = fetcher_for(&server, &dir).try_fetch_live_matches().await.unwrap();

    assert_eq!(games.len(), 2);
    assert_eq!(games[0].spectators(), 5);
    assert_eq!(games[1].series_type(), 1);
    assert_eq!(games[1].raw()["league_id"], 17420);
}

#[tokio::test]
async fn missing_result_or_games_is_empty_not_error() {
    for body in [json!({}), json!({ "result": {} }), json!({ "result": { "games": null } })] {
        let server = MockServer::start().await;
        mount(&server, ResponseTemplate::new(200).set_body_json(body.clone())).await;
        let dir = log_dir();

        let games = fetcher_for(&server, &dir).try_fetch_live_matches().await;

        assert!(matches!(games.as_deref(), Ok([])), "{body}");
    }
}

#[tokio::test]
async fn http_error_is_reported_and_collapsed_to_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LIVE_PATH))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;
    let dir = log_dir();
    let fetcher = fetcher_for(&server, &dir);

    let err = fetcher.try_fetch_live_matches().await.unwrap_err();
    assert!(matches!(err, FetchError::Status(503)));
    assert_eq!(err.status_code(), Some(503));

    assert!(fetcher.fetch_live_matches().await.is_empty());
}

#[tokio::test]
async fn invalid_json_is_a_decode_error() {
    let server = MockServer::start().await;
    mount(&server, ResponseTemplate::new(200).set_body_string("<html>busy</html>")).await;
    let dir = log_dir();

    let err = fetcher_for(&server, &dir).try_fetch_live_matches().await.unwrap_err();

    assert!(matches!(err, FetchError::Decode(_)));
}

#[tokio::test]
async fn slow_provider_times_out_into_empty_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LIVE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "result": { "games": [{ "series_type": 1 }] } }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    let dir = log_dir();

    let games = fetcher_for(&server, &dir).fetch_live_matches().await;

    assert!(games.is_empty());
}

#[tokio::test]
async fn unreachable_provider_is_a_transport_error_without_the_key() {
    let mut config = FetcherConfig::new(API_KEY);
    config.endpoint = format!("http://127.0.0.1:1{LIVE_PATH}");
    let dir = log_dir();
    let fetcher = LiveMatchFetcher::new(config, EventLogger::new(dir.path()));

    let err = fetcher.try_fetch_live_matches().await.unwrap_err();

    assert!(matches!(err, FetchError::Transport(_)));
    assert!(!err.to_string().contains(API_KEY));
    assert!(fetcher.fetch_live_matches().await.is_empty());
}

#[tokio::test]
async fn failures_are_written_to_the_event_log() {
    let server = MockServer::start().await;
    mount(&server, ResponseTemplate::new(500)).await;
    let dir = log_dir();
    let fetcher = fetcher_for(&server, &dir);

    fetcher.fetch_live_matches().await;

    let logger = EventLogger::new(dir.path());
    let contents = std::fs::read_to_string(logger.current_file()).unwrap();
    let event: serde_json::Value = serde_json::from_str(contents.lines().last().unwrap()).unwrap();
    assert_eq!(event["event"], "API_STATUS");
    assert_eq!(event["ok"], false);
    assert_eq!(event["status_code"], 500);
}

#[tokio::test]
async fn most_watched_end_to_end() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({
            "result": {
                "games": [
                    {
                        "series_type": 0,
                        "spectators": 4000,
                        "radiant_team": { "team_name": "Pub" },
                        "dire_team": { "team_name": "Stack" }
                    },
                    {
                        "series_type": 2,
                        "spectators": 100,
                        "radiant_team": { "team_name": "A" },
                        "dire_team": { "team_name": "B" }
                    }
                ]
            }
        })),
    )
    .await;
    let dir = log_dir();
    let router = CommandRouter::new(fetcher_for(&server, &dir), EventLogger::new(dir.path()));

    let replies = router.handle(Command::MostWatched).await;

    assert_eq!(replies, vec!["A -- B (100 зрителей)".to_string()]);
}

#[tokio::test]
async fn provider_outage_reads_as_no_matches() {
    let server = MockServer::start().await;
    mount(&server, ResponseTemplate::new(502)).await;
    let dir = log_dir();
    let router = CommandRouter::new(fetcher_for(&server, &dir), EventLogger::new(dir.path()));

    let replies = router.handle(Command::AllMatches).await;

    assert_eq!(replies, vec![NO_MATCHES_TEXT.to_string()]);
}
