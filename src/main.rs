/// Dota Live Bot — Telegram front end
///
/// Co dělá:
///   1. Long-polluje Telegram getUpdates
///   2. Každý příkaz (/start, /help, /all_matches, /get_the_most_watched_match)
///      obslouží na vlastním tokio tasku
///   3. Live zápasy bere ze Steam Web API (GetLiveLeagueGames), jen série
///
/// Spuštění:
///   TELEGRAM_BOT_TOKEN=... API_KEY=... cargo run --bin live-bot

mod config;
mod telegram;

use anyhow::Result;
use config::BotConfig;
use dota_live::{CommandRouter, LiveMatchFetcher};
use logger::EventLogger;
use std::env;
use std::fs::File;
use std::sync::Arc;
use telegram::TelegramClient;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

const GET_UPDATES_BACKOFF_SECS: u64 = 2;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let config = BotConfig::from_env()?;

    info!("=== Dota Live Bot ===");
    info!("Live games: {}", config.live_games_url);
    info!("Logs: {}", config.log_dir.display());
    debug!("{:?}", config);

    // Single instance lock: two pollers on one token steal each other's updates
    let lock_file_path = env::temp_dir().join("dota_live_bot.lock");
    let lock_file = match File::create(&lock_file_path) {
        Ok(f) => f,
        Err(e) => {
            warn!("Failed to create lock file at {:?}: {}", lock_file_path, e);
            return Ok(());
        }
    };

    let mut lock = fd_lock::RwLock::new(lock_file);
    let _write_guard = match lock.try_write() {
        Ok(guard) => {
            info!("Acquired single-instance lock.");
            guard
        }
        Err(_) => {
            warn!("Another instance of live-bot is already running! Exiting.");
            return Ok(());
        }
    };

    let events = EventLogger::new(&config.log_dir);
    let fetcher = LiveMatchFetcher::new(config.fetcher_config(), events.clone());
    let tg = TelegramClient::new(&config.telegram_api_url, &config.telegram_token)?;

    let me = tg.get_me().await?;
    info!(
        "Telegram bot started, bot_id={} username=@{}",
        me.id,
        me.username.as_deref().unwrap_or("?")
    );

    let mut router = CommandRouter::new(fetcher, events);
    if let Some(username) = me.username {
        router = router.with_bot_username(username);
    }
    let router = Arc::new(router);

    let mut update_offset: i64 = 0;
    tokio::select! {
        _ = poll_updates(&tg, &router, &mut update_offset) => {}
        res = tokio::signal::ctrl_c() => {
            if let Err(e) = res {
                warn!("Failed to listen for Ctrl-C: {}", e);
            }
            info!("Shutting down.");
        }
    }

    // The last batch is only confirmed by the next getUpdates
    if update_offset > 0 {
        if let Err(e) = tg.acknowledge(update_offset).await {
            warn!("Failed to acknowledge updates below offset {}: {}", update_offset, e);
        }
    }

    Ok(())
}

async fn poll_updates(
    tg: &TelegramClient,
    router: &Arc<CommandRouter<LiveMatchFetcher>>,
    update_offset: &mut i64,
) {
    loop {
        let updates = match tg.get_updates(*update_offset).await {
            Ok(updates) => updates,
            Err(e) => {
                warn!("getUpdates error: {}", e);
                sleep(Duration::from_secs(GET_UPDATES_BACKOFF_SECS)).await;
                continue;
            }
        };

        for u in updates {
            *update_offset = (*update_offset).max(u.update_id + 1);
            let Some(msg) = u.message else { continue };
            let Some(text) = msg.text else { continue };
            let chat_id = msg.chat.id;

            let tg = tg.clone();
            let router = Arc::clone(router);
            tokio::spawn(async move {
                router.dispatch(&tg, chat_id, &text).await;
            });
        }
    }
}
