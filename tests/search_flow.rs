//! Search workflow branching: result cardinality, numeric selection against
//! the currently displayed page, and session bookkeeping.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serenity::builder::CreateEmbed;
use serenity::model::channel::ReactionType;
use serenity::model::id::{ChannelId, MessageId, UserId};
use shimarin_bot::model::PageInfo;
use shimarin_bot::services::search::{run_search, SearchIo, SearchOutcome, SearchSource};
use shimarin_bot::ui::navigator::{NavTarget, NEXT_REACTION};
use shimarin_bot::ui::{InteractionRouter, ReplyMessage};
use tokio::sync::Mutex;

const CHANNEL: u64 = 5;
const LISTING_MESSAGE: u64 = 99;
const INVOKER: u64 = 42;

#[derive(Clone)]
struct Item(String);

struct FakeSource {
    pages: Vec<Vec<Item>>,
    fetches: AtomicUsize,
    listing_renders: AtomicUsize,
    detail_renders: AtomicUsize,
}

impl FakeSource {
    fn new(pages: Vec<Vec<&str>>) -> Arc<Self> {
        Arc::new(FakeSource {
            pages: pages
                .into_iter()
                .map(|page| page.into_iter().map(|name| Item(name.to_string())).collect())
                .collect(),
            fetches: AtomicUsize::new(0),
            listing_renders: AtomicUsize::new(0),
            detail_renders: AtomicUsize::new(0),
        })
    }

    fn numbered(counts: &[usize]) -> Arc<Self> {
        let mut next = 1;
        let pages = counts
            .iter()
            .map(|&count| {
                (0..count)
                    .map(|_| {
                        let item = Item(format!("item{next}"));
                        next += 1;
                        item
                    })
                    .collect()
            })
            .collect();
        Arc::new(FakeSource {
            pages,
            fetches: AtomicUsize::new(0),
            listing_renders: AtomicUsize::new(0),
            detail_renders: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl SearchSource for FakeSource {
    type Item = Item;

    fn subject(&self) -> &str {
        "test item"
    }

    async fn fetch_page(&self, _query: &str, page: u32) -> anyhow::Result<(Vec<Item>, PageInfo)> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let items = self.pages.get(page as usize).cloned().unwrap_or_default();
        let total: usize = self.pages.iter().map(Vec::len).sum();
        Ok((
            items,
            PageInfo {
                current_page: page,
                last_page: self.pages.len().saturating_sub(1) as u32,
                total: total as u32,
                per_page: 10,
            },
        ))
    }

    fn listing_embed(&self, _items: &[Item], page_info: PageInfo) -> CreateEmbed {
        self.listing_renders.fetch_add(1, Ordering::SeqCst);
        CreateEmbed::new().title(format!("listing page {}", page_info.current_page))
    }

    fn detail_embed(&self, item: &Item) -> CreateEmbed {
        self.detail_renders.fetch_add(1, Ordering::SeqCst);
        CreateEmbed::new().title(item.0.clone())
    }
}

fn embed_title(embed: &CreateEmbed) -> String {
    serde_json::to_value(embed).unwrap()["title"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}

#[derive(Default)]
struct FakeTarget {
    edits: Mutex<Vec<String>>,
    cleared: AtomicUsize,
}

#[async_trait]
impl NavTarget for FakeTarget {
    async fn apply_page(&self, embed: CreateEmbed) -> anyhow::Result<()> {
        self.edits.lock().await.push(embed_title(&embed));
        Ok(())
    }

    async fn attach_controls(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn clear_controls(&self) -> anyhow::Result<()> {
        self.cleared.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct FakeIo {
    notices: Mutex<Vec<String>>,
    listings: AtomicUsize,
    target: Arc<FakeTarget>,
}

impl FakeIo {
    fn new() -> Arc<Self> {
        Arc::new(FakeIo {
            notices: Mutex::new(Vec::new()),
            listings: AtomicUsize::new(0),
            target: Arc::new(FakeTarget::default()),
        })
    }
}

#[async_trait]
impl SearchIo for FakeIo {
    async fn send_embed(&self, embed: CreateEmbed) -> anyhow::Result<()> {
        self.notices.lock().await.push(embed_title(&embed));
        Ok(())
    }

    async fn send_listing(
        &self,
        _embed: CreateEmbed,
    ) -> anyhow::Result<(MessageId, Arc<dyn NavTarget>)> {
        self.listings.fetch_add(1, Ordering::SeqCst);
        Ok((MessageId::new(LISTING_MESSAGE), self.target.clone()))
    }
}

fn reply(content: &str) -> ReplyMessage {
    ReplyMessage {
        channel: ChannelId::new(CHANNEL),
        author: UserId::new(INVOKER),
        content: content.to_string(),
    }
}

fn spawn_search(
    router: Arc<InteractionRouter>,
    io: Arc<FakeIo>,
    source: Arc<FakeSource>,
    query: &str,
) -> tokio::task::JoinHandle<anyhow::Result<SearchOutcome>> {
    let query = query.to_string();
    tokio::spawn(async move {
        run_search(
            router,
            &*io,
            source,
            UserId::new(INVOKER),
            ChannelId::new(CHANNEL),
            &query,
            Duration::from_secs(1),
        )
        .await
    })
}

#[tokio::test]
async fn empty_query_is_terminal_with_a_notice() {
    let router = Arc::new(InteractionRouter::new());
    let io = FakeIo::new();
    let source = FakeSource::new(vec![vec!["a"]]);
    let outcome = run_search(
        router.clone(),
        &*io,
        source.clone(),
        UserId::new(INVOKER),
        ChannelId::new(CHANNEL),
        "   ",
        Duration::from_millis(50),
    )
    .await
    .unwrap();

    assert_eq!(outcome, SearchOutcome::EmptyQuery);
    assert_eq!(source.fetches.load(Ordering::SeqCst), 0);
    assert_eq!(io.notices.lock().await.len(), 1);
}

#[tokio::test]
async fn zero_results_never_invoke_the_detail_renderer() {
    let router = Arc::new(InteractionRouter::new());
    let io = FakeIo::new();
    let source = FakeSource::new(vec![vec![]]);
    let outcome = run_search(
        router.clone(),
        &*io,
        source.clone(),
        UserId::new(INVOKER),
        ChannelId::new(CHANNEL),
        "nothing",
        Duration::from_millis(50),
    )
    .await
    .unwrap();

    assert_eq!(outcome, SearchOutcome::NoResults);
    assert_eq!(source.detail_renders.load(Ordering::SeqCst), 0);
    assert_eq!(source.listing_renders.load(Ordering::SeqCst), 0);
    assert_eq!(io.listings.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn single_result_bypasses_disambiguation() {
    let router = Arc::new(InteractionRouter::new());
    let io = FakeIo::new();
    let source = FakeSource::new(vec![vec!["only hit"]]);
    let outcome = run_search(
        router.clone(),
        &*io,
        source.clone(),
        UserId::new(INVOKER),
        ChannelId::new(CHANNEL),
        "only",
        Duration::from_millis(50),
    )
    .await
    .unwrap();

    assert_eq!(outcome, SearchOutcome::Single);
    assert_eq!(source.detail_renders.load(Ordering::SeqCst), 1);
    assert_eq!(source.listing_renders.load(Ordering::SeqCst), 0);
    assert_eq!(io.listings.load(Ordering::SeqCst), 0);
    assert_eq!(router.navigator_count().await, 0);
    assert_eq!(io.notices.lock().await.as_slice(), ["only hit"]);
}

#[tokio::test]
async fn selection_in_range_replaces_listing_with_detail() {
    let router = Arc::new(InteractionRouter::new());
    let io = FakeIo::new();
    let source = FakeSource::numbered(&[10, 3]);
    let handle = spawn_search(router.clone(), io.clone(), source.clone(), "query");

    tokio::time::sleep(Duration::from_millis(40)).await;
    assert_eq!(io.listings.load(Ordering::SeqCst), 1);
    assert_eq!(source.listing_renders.load(Ordering::SeqCst), 1);
    assert_eq!(router.navigator_count().await, 1);

    assert!(router.offer_message(&reply("3")).await);
    let outcome = handle.await.unwrap().unwrap();

    assert_eq!(outcome, SearchOutcome::Listing { selection: Some(3) });
    assert_eq!(source.detail_renders.load(Ordering::SeqCst), 1);
    assert_eq!(io.target.edits.lock().await.as_slice(), ["item3"]);
    // Selection stops the navigator and retracts its controls.
    assert_eq!(router.navigator_count().await, 0);
    assert_eq!(io.target.cleared.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn out_of_range_selection_is_a_noop() {
    let router = Arc::new(InteractionRouter::new());
    let io = FakeIo::new();
    let source = FakeSource::numbered(&[10, 3]);
    let handle = spawn_search(router.clone(), io.clone(), source.clone(), "query");

    tokio::time::sleep(Duration::from_millis(40)).await;
    assert!(router.offer_message(&reply("13")).await);
    let outcome = handle.await.unwrap().unwrap();

    assert_eq!(outcome, SearchOutcome::Listing { selection: None });
    assert_eq!(source.detail_renders.load(Ordering::SeqCst), 0);
    assert!(io.target.edits.lock().await.is_empty());
    // No selection: the navigator keeps running until its own timeout.
    assert_eq!(router.navigator_count().await, 1);
}

#[tokio::test]
async fn non_numeric_reply_is_a_noop() {
    let router = Arc::new(InteractionRouter::new());
    let io = FakeIo::new();
    let source = FakeSource::numbered(&[10]);
    let handle = spawn_search(router.clone(), io.clone(), source.clone(), "query");

    tokio::time::sleep(Duration::from_millis(40)).await;
    assert!(router.offer_message(&reply("three")).await);
    let outcome = handle.await.unwrap().unwrap();

    assert_eq!(outcome, SearchOutcome::Listing { selection: None });
    assert_eq!(source.detail_renders.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn selection_applies_to_the_displayed_page() {
    let router = Arc::new(InteractionRouter::new());
    let io = FakeIo::new();
    let source = FakeSource::numbered(&[10, 3]);
    let handle = spawn_search(router.clone(), io.clone(), source.clone(), "query");

    tokio::time::sleep(Duration::from_millis(40)).await;
    // Page forward: the listing now shows items 11..13.
    router
        .dispatch_reaction(
            MessageId::new(LISTING_MESSAGE),
            UserId::new(INVOKER),
            &ReactionType::Unicode(NEXT_REACTION.to_string()),
        )
        .await;
    assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    assert_eq!(io.target.edits.lock().await.as_slice(), ["listing page 1"]);

    assert!(router.offer_message(&reply("1")).await);
    let outcome = handle.await.unwrap().unwrap();

    assert_eq!(outcome, SearchOutcome::Listing { selection: Some(1) });
    let edits = io.target.edits.lock().await;
    assert_eq!(edits.last().map(String::as_str), Some("item11"));
}
