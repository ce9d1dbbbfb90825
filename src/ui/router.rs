//! Routes gateway events to the interactive sessions waiting on them:
//! reaction add/remove events to page navigators (keyed by message id) and
//! channel messages to one-shot reply waiters.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serenity::model::channel::ReactionType;
use serenity::model::id::{ChannelId, MessageId, UserId};
use tokio::sync::{oneshot, Mutex, RwLock};

use super::collector::ReplyMessage;
use super::navigator::NavDirection;

/// A session that reacts to prev/next navigation from a designated user.
#[async_trait]
pub trait Navigable: Send + Sync {
    async fn navigate(&self, user: UserId, direction: NavDirection);
}

struct ReplyWaiter {
    id: u64,
    channel: ChannelId,
    author: Option<UserId>,
    tx: oneshot::Sender<ReplyMessage>,
}

impl ReplyWaiter {
    fn matches(&self, message: &ReplyMessage) -> bool {
        self.channel == message.channel
            && self.author.map_or(true, |author| author == message.author)
    }
}

/// Per-process registry of live interactive sessions. Sessions register on
/// creation and unregister when they reach a terminal state; the event
/// handler feeds every inbound event through here exactly once.
#[derive(Default)]
pub struct InteractionRouter {
    navigators: RwLock<HashMap<MessageId, Arc<dyn Navigable>>>,
    waiters: Mutex<Vec<ReplyWaiter>>,
    waiter_seq: AtomicU64,
}

impl InteractionRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register_navigator(&self, message: MessageId, navigator: Arc<dyn Navigable>) {
        self.navigators.write().await.insert(message, navigator);
    }

    pub async fn remove_navigator(&self, message: MessageId) {
        self.navigators.write().await.remove(&message);
    }

    pub async fn navigator_count(&self) -> usize {
        self.navigators.read().await.len()
    }

    /// Forwards a reaction add/remove to the navigator attached to the
    /// message, if the emoji is one of the two paging controls.
    pub async fn dispatch_reaction(&self, message: MessageId, user: UserId, emoji: &ReactionType) {
        let Some(direction) = NavDirection::from_emoji(emoji) else {
            return;
        };
        let navigator = self.navigators.read().await.get(&message).cloned();
        if let Some(navigator) = navigator {
            navigator.navigate(user, direction).await;
        }
    }

    pub(crate) async fn add_waiter(
        &self,
        channel: ChannelId,
        author: Option<UserId>,
        tx: oneshot::Sender<ReplyMessage>,
    ) -> u64 {
        let id = self.waiter_seq.fetch_add(1, Ordering::Relaxed);
        self.waiters.lock().await.push(ReplyWaiter {
            id,
            channel,
            author,
            tx,
        });
        id
    }

    pub(crate) async fn cancel_waiter(&self, id: u64) {
        self.waiters.lock().await.retain(|w| w.id != id);
    }

    /// Offers an inbound message to the oldest matching reply waiter.
    /// Returns whether a waiter consumed it. Waiters whose collector already
    /// resolved are discarded on the way through.
    pub async fn offer_message(&self, message: &ReplyMessage) -> bool {
        let mut waiters = self.waiters.lock().await;
        waiters.retain(|w| !w.tx.is_closed());
        while let Some(pos) = waiters.iter().position(|w| w.matches(message)) {
            let waiter = waiters.remove(pos);
            if waiter.tx.send(message.clone()).is_ok() {
                return true;
            }
        }
        false
    }
}
