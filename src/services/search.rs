//! Generic search-and-disambiguate workflow.
//!
//! Runs a remote search and branches on cardinality: an empty query or zero
//! results end with a notice, a single hit renders its detail view
//! directly, and multiple hits produce a numbered listing with a page
//! navigator (button paging across result pages) and a reply collector
//! (numeric selection within the page currently on screen) running in
//! parallel. A valid selection stops the navigator and swaps the listing
//! for the item's detail view.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serenity::builder::{CreateEmbed, CreateMessage};
use serenity::http::Http;
use serenity::model::id::{ChannelId, MessageId, UserId};
use tokio::sync::Mutex;

use crate::model::PageInfo;
use crate::ui::navigator::{MessageTarget, NavTarget, PageGenerator, PageNavigator};
use crate::ui::router::InteractionRouter;
use crate::ui::style;
use crate::ui::ReplyCollector;

/// A searchable remote collection plus its two renderings. Implementations
/// are built per invocation and carry the viewer/channel gating context.
#[async_trait]
pub trait SearchSource: Send + Sync + 'static {
    type Item: Clone + Send + Sync + 'static;

    /// What the free-text query describes, for error notices ("anime title").
    fn subject(&self) -> &str;

    async fn fetch_page(
        &self,
        query: &str,
        page: u32,
    ) -> anyhow::Result<(Vec<Self::Item>, PageInfo)>;

    fn listing_embed(&self, items: &[Self::Item], page_info: PageInfo) -> CreateEmbed;

    fn detail_embed(&self, item: &Self::Item) -> CreateEmbed;
}

/// Message I/O of the originating channel, seamed for tests.
#[async_trait]
pub trait SearchIo: Send + Sync {
    async fn send_embed(&self, embed: CreateEmbed) -> anyhow::Result<()>;

    /// Sends the listing message and returns the paging target bound to it.
    async fn send_listing(
        &self,
        embed: CreateEmbed,
    ) -> anyhow::Result<(MessageId, Arc<dyn NavTarget>)>;
}

/// Terminal shape of one search invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    EmptyQuery,
    NoResults,
    /// Exactly one hit; its detail view was sent directly.
    Single,
    /// A listing was shown. `selection` is the accepted 1-based pick, if any.
    Listing { selection: Option<usize> },
}

pub async fn run_search<S: SearchSource>(
    router: Arc<InteractionRouter>,
    io: &dyn SearchIo,
    source: Arc<S>,
    invoker: UserId,
    channel: ChannelId,
    query: &str,
    reply_timeout: Duration,
) -> anyhow::Result<SearchOutcome> {
    let query = query.trim();
    if query.is_empty() {
        io.send_embed(style::error_embed(
            "Missing search query",
            format!("No {} was provided.", source.subject()),
        ))
        .await?;
        return Ok(SearchOutcome::EmptyQuery);
    }

    let (items, page_info) = source.fetch_page(query, 0).await?;
    if items.is_empty() {
        io.send_embed(style::info_embed(
            "No results found",
            "Double check your search query and try again.",
        ))
        .await?;
        return Ok(SearchOutcome::NoResults);
    }
    if items.len() == 1 {
        io.send_embed(source.detail_embed(&items[0])).await?;
        return Ok(SearchOutcome::Single);
    }

    let listing = source.listing_embed(&items, page_info);
    let (message_id, target) = io.send_listing(listing).await?;

    // Numeric selection applies to whichever page is on screen, so page
    // turns swap out the shared item slice.
    let current_items = Arc::new(Mutex::new(items));
    let generator: PageGenerator = {
        let source = source.clone();
        let query = query.to_string();
        let current_items = current_items.clone();
        Box::new(move |page| {
            let source = source.clone();
            let query = query.clone();
            let current_items = current_items.clone();
            Box::pin(async move {
                let (items, info) = source.fetch_page(&query, page).await?;
                let embed = source.listing_embed(&items, info);
                *current_items.lock().await = items;
                Ok(embed)
            })
        })
    };
    let navigator = Arc::new(PageNavigator::new(
        router.clone(),
        message_id,
        invoker,
        page_info,
        target.clone(),
        generator,
    ));
    navigator.listen().await?;

    let collector = ReplyCollector::register(&router, channel, Some(invoker))
        .await
        .timeout(reply_timeout);
    let Some(reply) = collector.next_reply().await else {
        // No selection; the navigator runs on until its own idle timeout.
        return Ok(SearchOutcome::Listing { selection: None });
    };

    let selected = reply.content.trim().parse::<usize>().ok();
    let item = match selected {
        Some(n) if n >= 1 => {
            let items = current_items.lock().await;
            items.get(n - 1).cloned()
        }
        _ => None,
    };
    let Some(item) = item else {
        return Ok(SearchOutcome::Listing { selection: None });
    };
    navigator.stop().await;
    target.apply_page(source.detail_embed(&item)).await?;
    Ok(SearchOutcome::Listing { selection: selected })
}

/// [`SearchIo`] over a real Discord channel.
pub struct ChannelIo {
    http: Arc<Http>,
    channel: ChannelId,
}

impl ChannelIo {
    pub fn new(http: Arc<Http>, channel: ChannelId) -> Self {
        ChannelIo { http, channel }
    }
}

#[async_trait]
impl SearchIo for ChannelIo {
    async fn send_embed(&self, embed: CreateEmbed) -> anyhow::Result<()> {
        self.channel
            .send_message(&self.http, CreateMessage::new().embed(embed))
            .await?;
        Ok(())
    }

    async fn send_listing(
        &self,
        embed: CreateEmbed,
    ) -> anyhow::Result<(MessageId, Arc<dyn NavTarget>)> {
        let message = self
            .channel
            .send_message(&self.http, CreateMessage::new().embed(embed))
            .await?;
        let id = message.id;
        Ok((id, Arc::new(MessageTarget::new(self.http.clone(), message))))
    }
}
