use futures::{Stream, StreamExt, TryStreamExt};
use poise::serenity_prelude as serenity;
use serenity::UserId;

/// Anything in a channel history that has an author and a text body.
pub trait AuthoredMessage {
    fn author_id(&self) -> UserId;
    fn body(&self) -> &str;
}

impl AuthoredMessage for serenity::Message {
    fn author_id(&self) -> UserId {
        self.author.id
    }

    fn body(&self) -> &str {
        &self.content
    }
}

/// How far to scan a channel history and what to do with matches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryScan {
    /// Maximum number of messages to look at, newest first. `None` scans everything.
    pub limit: Option<usize>,
    /// Log the body of every matching message.
    pub echo: bool,
    /// Stop as soon as this many matches were found.
    pub stop_at: Option<usize>,
}

impl HistoryScan {
    /// Bounded scan for interactive commands, echoing matches to the log.
    pub fn recent(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            echo: true,
            stop_at: None,
        }
    }

    /// Full scan that only has to tell "one message" apart from "more than one".
    pub fn first_contact() -> Self {
        Self {
            limit: None,
            echo: false,
            stop_at: Some(2),
        }
    }
}

/// Count the messages by `author` in a newest-first channel history.
pub async fn count_messages<S, M, E>(
    history: S,
    author: UserId,
    scan: HistoryScan,
) -> Result<usize, E>
where
    S: Stream<Item = Result<M, E>>,
    M: AuthoredMessage,
{
    let history = history.take(scan.limit.unwrap_or(usize::MAX));
    futures::pin_mut!(history);

    let mut count = 0;
    while let Some(message) = history.try_next().await? {
        if message.author_id() != author {
            continue;
        }

        if scan.echo {
            log::info!("{}", message.body());
        }
        count += 1;

        if scan.stop_at.is_some_and(|stop_at| count >= stop_at) {
            break;
        }
    }

    Ok(count)
}

/// Whether the only message `author` ever posted in this history is the newest one they sent.
pub async fn is_first_message<S, M, E>(history: S, author: UserId) -> Result<bool, E>
where
    S: Stream<Item = Result<M, E>>,
    M: AuthoredMessage,
{
    Ok(count_messages(history, author, HistoryScan::first_contact()).await? == 1)
}
