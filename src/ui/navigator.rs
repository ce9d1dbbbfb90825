//! Reaction-driven page navigation for embed views.
//!
//! A navigator owns one sent message: it attaches the two paging reactions,
//! regenerates the embed when the designated user pages, and retracts the
//! reactions when stopped or idle. Page numbers are clamped to
//! `[0, last_page]` and at most one render is in flight at any time;
//! navigation arriving mid-render is discarded, not queued.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serenity::builder::{CreateEmbed, EditMessage};
use serenity::http::Http;
use serenity::model::channel::{Message, ReactionType};
use serenity::model::id::{MessageId, UserId};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::router::{InteractionRouter, Navigable};
use crate::model::PageInfo;

pub const PREV_REACTION: &str = "⬅️";
pub const NEXT_REACTION: &str = "➡️";

/// Sessions with no qualifying interaction for this long retract their
/// controls and stop listening.
pub const NAV_IDLE_TIMEOUT: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavDirection {
    Previous,
    Next,
}

impl NavDirection {
    pub fn from_emoji(emoji: &ReactionType) -> Option<Self> {
        match emoji {
            ReactionType::Unicode(s) if s == PREV_REACTION => Some(NavDirection::Previous),
            ReactionType::Unicode(s) if s == NEXT_REACTION => Some(NavDirection::Next),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    Idle,
    Rendering,
    Stopped,
}

/// The message-side operations a navigator performs. Seam between the
/// paging state machine and the Discord transport.
#[async_trait]
pub trait NavTarget: Send + Sync {
    async fn apply_page(&self, embed: CreateEmbed) -> anyhow::Result<()>;
    async fn attach_controls(&self) -> anyhow::Result<()>;
    async fn clear_controls(&self) -> anyhow::Result<()>;
}

pub type PageFuture = Pin<Box<dyn Future<Output = anyhow::Result<CreateEmbed>> + Send>>;
pub type PageGenerator = Box<dyn Fn(u32) -> PageFuture + Send + Sync>;

struct Session {
    state: NavState,
    page_info: PageInfo,
    last_activity: Instant,
}

pub struct PageNavigator {
    router: Arc<InteractionRouter>,
    message: MessageId,
    user: UserId,
    target: Arc<dyn NavTarget>,
    generate: PageGenerator,
    session: Mutex<Session>,
    idle_timeout: Duration,
}

impl PageNavigator {
    pub fn new(
        router: Arc<InteractionRouter>,
        message: MessageId,
        user: UserId,
        page_info: PageInfo,
        target: Arc<dyn NavTarget>,
        generate: PageGenerator,
    ) -> Self {
        PageNavigator {
            router,
            message,
            user,
            target,
            generate,
            session: Mutex::new(Session {
                state: NavState::Idle,
                page_info,
                last_activity: Instant::now(),
            }),
            idle_timeout: NAV_IDLE_TIMEOUT,
        }
    }

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Attaches the paging reactions, registers with the router and spawns
    /// the idle watchdog.
    pub async fn listen(self: &Arc<Self>) -> anyhow::Result<()> {
        self.target.attach_controls().await?;
        self.router
            .register_navigator(self.message, self.clone() as Arc<dyn Navigable>)
            .await;
        let nav = self.clone();
        tokio::spawn(async move { nav.watchdog().await });
        Ok(())
    }

    /// Stops the session: unregisters, retracts controls best-effort.
    /// Idempotent; also invoked by the idle watchdog.
    pub async fn stop(&self) {
        {
            let mut session = self.session.lock().await;
            if session.state == NavState::Stopped {
                return;
            }
            session.state = NavState::Stopped;
        }
        self.router.remove_navigator(self.message).await;
        if let Err(e) = self.target.clear_controls().await {
            // Session is ending regardless; nothing to surface.
            debug!(target: "ui.nav", error = ?e, "failed to retract paging reactions");
        }
    }

    pub async fn state(&self) -> NavState {
        self.session.lock().await.state
    }

    pub async fn current_page(&self) -> u32 {
        self.session.lock().await.page_info.current_page
    }

    async fn watchdog(self: Arc<Self>) {
        loop {
            let deadline = {
                let session = self.session.lock().await;
                if session.state == NavState::Stopped {
                    return;
                }
                session.last_activity + self.idle_timeout
            };
            tokio::time::sleep_until(deadline).await;
            let expired = {
                let session = self.session.lock().await;
                if session.state == NavState::Stopped {
                    return;
                }
                session.last_activity + self.idle_timeout <= Instant::now()
            };
            if expired {
                self.stop().await;
                return;
            }
        }
    }
}

#[async_trait]
impl Navigable for PageNavigator {
    async fn navigate(&self, user: UserId, direction: NavDirection) {
        if user != self.user {
            return;
        }
        let page = {
            let mut session = self.session.lock().await;
            if session.state != NavState::Idle {
                // Mid-render or stopped: discard, never queue.
                return;
            }
            let current = session.page_info.current_page;
            let requested = match direction {
                NavDirection::Previous => current.saturating_sub(1),
                NavDirection::Next => current
                    .saturating_add(1)
                    .min(session.page_info.last_page),
            };
            if requested == current {
                return;
            }
            session.state = NavState::Rendering;
            session.page_info.current_page = requested;
            session.last_activity = Instant::now();
            requested
        };
        match (self.generate)(page).await {
            Ok(embed) => {
                if let Err(e) = self.target.apply_page(embed).await {
                    warn!(target: "ui.nav", page, error = ?e, "failed to edit paged message");
                }
            }
            Err(e) => {
                warn!(target: "ui.nav", page, error = ?e, "page generator failed");
            }
        }
        let mut session = self.session.lock().await;
        if session.state == NavState::Rendering {
            session.state = NavState::Idle;
            session.last_activity = Instant::now();
        }
    }
}

/// [`NavTarget`] backed by a real Discord message.
pub struct MessageTarget {
    http: Arc<Http>,
    message: Message,
}

impl MessageTarget {
    pub fn new(http: Arc<Http>, message: Message) -> Self {
        MessageTarget { http, message }
    }

    pub fn message_id(&self) -> MessageId {
        self.message.id
    }
}

#[async_trait]
impl NavTarget for MessageTarget {
    async fn apply_page(&self, embed: CreateEmbed) -> anyhow::Result<()> {
        self.message
            .channel_id
            .edit_message(&self.http, self.message.id, EditMessage::new().embed(embed))
            .await?;
        Ok(())
    }

    async fn attach_controls(&self) -> anyhow::Result<()> {
        for emoji in [PREV_REACTION, NEXT_REACTION] {
            self.message
                .react(&self.http, ReactionType::Unicode(emoji.to_string()))
                .await?;
        }
        Ok(())
    }

    async fn clear_controls(&self) -> anyhow::Result<()> {
        for emoji in [PREV_REACTION, NEXT_REACTION] {
            self.http
                .delete_reaction_me(
                    self.message.channel_id,
                    self.message.id,
                    &ReactionType::Unicode(emoji.to_string()),
                )
                .await?;
        }
        Ok(())
    }
}
