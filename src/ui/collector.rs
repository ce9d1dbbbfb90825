//! One-shot reply collection: wait for the next qualifying message in a
//! channel, bounded by a timeout. Exactly one of {reply, timeout} resolves
//! the collector; late arrivals after resolution are ignored by the router.

use std::sync::Arc;
use std::time::Duration;

use serenity::model::channel::Message;
use serenity::model::id::{ChannelId, UserId};
use tokio::sync::oneshot;

use super::router::InteractionRouter;

pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// The slice of an inbound message the interactive workflows care about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyMessage {
    pub channel: ChannelId,
    pub author: UserId,
    pub content: String,
}

impl From<&Message> for ReplyMessage {
    fn from(message: &Message) -> Self {
        ReplyMessage {
            channel: message.channel_id,
            author: message.author.id,
            content: message.content.clone(),
        }
    }
}

/// Waits for at most one qualifying message. The oneshot channel is the
/// single-resolution guard: once this side resolves (either way), the
/// router drops the registration and further messages pass through.
pub struct ReplyCollector {
    router: Arc<InteractionRouter>,
    waiter_id: u64,
    rx: oneshot::Receiver<ReplyMessage>,
    timeout: Duration,
}

impl ReplyCollector {
    /// Registers a waiter on `channel`, optionally restricted to messages
    /// authored by `author`. Uses the default five minute timeout.
    pub async fn register(
        router: &Arc<InteractionRouter>,
        channel: ChannelId,
        author: Option<UserId>,
    ) -> Self {
        let (tx, rx) = oneshot::channel();
        let waiter_id = router.add_waiter(channel, author, tx).await;
        ReplyCollector {
            router: router.clone(),
            waiter_id,
            rx,
            timeout: DEFAULT_REPLY_TIMEOUT,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolves with the first qualifying message, or `None` once the
    /// timeout elapses without one.
    pub async fn next_reply(self) -> Option<ReplyMessage> {
        let ReplyCollector {
            router,
            waiter_id,
            rx,
            timeout,
        } = self;
        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(reply)) => Some(reply),
            // Sender dropped without a message; treat as never-qualifying.
            Ok(Err(_)) => None,
            Err(_) => {
                router.cancel_waiter(waiter_id).await;
                None
            }
        }
    }
}
