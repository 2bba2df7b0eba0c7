//! Chat commands: parsing, the command → replies mapping, and fan-out to a transport.

use crate::fetcher::MatchSource;
use crate::matches::{filter_live_matches, format_match, most_watched};
use anyhow::Result;
use async_trait::async_trait;
use logger::{now_iso, CommandHandledEvent, EventLogger};
use tracing::{debug, info, warn};

pub const WELCOME_TEXT: &str = "Привет, я бот, который предоставит тебе информацию о лайв играх Dota2 популярных лиг.\n\
Для того, чтобы получить информацию о возможностях бота, введи команду /help";

pub const HELP_TEXT: &str = "Доступные команды:\n\
/all_matches - Показать все текущие матчи\n\
/get_the_most_watched_match - Показать самый популярный матч\n\
/help - Показать эту помощь";

pub const NO_MATCHES_TEXT: &str = "Нет матчей, которые могли бы быть интересны:(";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    MostWatched,
    AllMatches,
}

impl Command {
    pub const ALL: [Command; 4] = [
        Command::Start,
        Command::Help,
        Command::AllMatches,
        Command::MostWatched,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Help => "help",
            Command::MostWatched => "get_the_most_watched_match",
            Command::AllMatches => "all_matches",
        }
    }

    /// Parses the first word of a message, case-insensitively.
    ///
    /// Trailing arguments are ignored. A `/cmd@Name` suffix (group chats) is only
    /// accepted when `Name` is `bot_username`, compared without case.
    pub fn parse(text: &str, bot_username: Option<&str>) -> Option<Self> {
        let word = text.split_whitespace().next()?;
        let word = word.strip_prefix('/')?;
        let name = match word.split_once('@') {
            Some((cmd, addressee)) => {
                let ours = bot_username.is_some_and(|me| me.eq_ignore_ascii_case(addressee));
                if !ours {
                    return None;
                }
                cmd
            }
            None => word,
        };
        let name = name.to_lowercase();
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

/// Outbound side of the chat platform.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()>;
}

pub struct CommandRouter<S> {
    source:       S,
    logger:       EventLogger,
    bot_username: Option<String>,
}

impl<S: MatchSource> CommandRouter<S> {
    pub fn new(source: S, logger: EventLogger) -> Self {
        Self { source, logger, bot_username: None }
    }

    /// Our own username, as reported by getMe; enables `/cmd@username`.
    pub fn with_bot_username(mut self, username: impl Into<String>) -> Self {
        self.bot_username = Some(username.into());
        self
    }

    /// Messages to send back for `cmd`, in order. Never empty.
    pub async fn handle(&self, cmd: Command) -> Vec<String> {
        match cmd {
            Command::Start => vec![WELCOME_TEXT.to_string()],
            Command::Help => vec![HELP_TEXT.to_string()],
            Command::MostWatched => {
                let matches = filter_live_matches(self.source.live_matches().await);
                match most_watched(&matches) {
                    Some(best) => vec![format_match(best)],
                    None => vec![NO_MATCHES_TEXT.to_string()],
                }
            }
            Command::AllMatches => {
                let matches = filter_live_matches(self.source.live_matches().await);
                if matches.is_empty() {
                    vec![NO_MATCHES_TEXT.to_string()]
                } else {
                    matches.iter().map(format_match).collect()
                }
            }
        }
    }

    /// Handles one incoming text and sends every reply as its own message.
    ///
    /// Returns how many replies were delivered. Text that is not one of our
    /// commands is ignored.
    pub async fn dispatch<T>(&self, transport: &T, chat_id: i64, text: &str) -> usize
    where
        T: ChatTransport + ?Sized,
    {
        let Some(cmd) = Command::parse(text, self.bot_username.as_deref()) else {
            debug!("Ignoring non-command message in chat {}", chat_id);
            return 0;
        };

        let replies = self.handle(cmd).await;
        let mut sent = 0;
        for reply in &replies {
            match transport.send_text(chat_id, reply).await {
                Ok(()) => sent += 1,
                Err(e) => warn!("Reply to /{} in chat {} failed: {}", cmd.name(), chat_id, e),
            }
        }

        info!("/{} → chat {}: {}/{} replies sent", cmd.name(), chat_id, sent, replies.len());
        let _ = self.logger.log(&CommandHandledEvent {
            ts: now_iso(),
            event: "COMMAND_HANDLED",
            command: format!("/{}", cmd.name()),
            chat_id,
            replies: sent,
        });

        sent
    }
}
