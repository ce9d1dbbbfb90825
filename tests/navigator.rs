//! Page navigator state machine: clamped paging, the drop-while-rendering
//! guard and session teardown.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serenity::builder::CreateEmbed;
use serenity::model::channel::ReactionType;
use serenity::model::id::{MessageId, UserId};
use shimarin_bot::model::PageInfo;
use shimarin_bot::ui::navigator::{
    NavState, NavTarget, PageGenerator, PageNavigator, NEXT_REACTION, PREV_REACTION,
};
use shimarin_bot::ui::InteractionRouter;
use tokio::sync::Notify;

const MESSAGE: u64 = 11;
const NAVIGATOR: u64 = 7;

#[derive(Default)]
struct CountingTarget {
    edits: AtomicUsize,
    cleared: AtomicUsize,
}

#[async_trait]
impl NavTarget for CountingTarget {
    async fn apply_page(&self, _embed: CreateEmbed) -> anyhow::Result<()> {
        self.edits.fetch_add(1, Ordering::SeqCst);
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

fn page_info(last_page: u32) -> PageInfo {
    PageInfo {
        current_page: 0,
        last_page,
        total: (last_page + 1) * 10,
        per_page: 10,
    }
}

fn counting_generator(calls: Arc<AtomicUsize>) -> PageGenerator {
    Box::new(move |_page| {
        let calls = calls.clone();
        Box::pin(async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(CreateEmbed::new())
        })
    })
}

fn next() -> ReactionType {
    ReactionType::Unicode(NEXT_REACTION.to_string())
}

fn prev() -> ReactionType {
    ReactionType::Unicode(PREV_REACTION.to_string())
}

async fn setup(
    last_page: u32,
    generator: PageGenerator,
) -> (Arc<InteractionRouter>, Arc<PageNavigator>, Arc<CountingTarget>) {
    let router = Arc::new(InteractionRouter::new());
    let target = Arc::new(CountingTarget::default());
    let navigator = Arc::new(PageNavigator::new(
        router.clone(),
        MessageId::new(MESSAGE),
        UserId::new(NAVIGATOR),
        page_info(last_page),
        target.clone(),
        generator,
    ));
    navigator.listen().await.unwrap();
    (router, navigator, target)
}

#[tokio::test]
async fn next_walks_pages_and_clamps_at_last() {
    let calls = Arc::new(AtomicUsize::new(0));
    let (router, navigator, target) = setup(3, counting_generator(calls.clone())).await;

    for expected in 1..=3 {
        router
            .dispatch_reaction(MessageId::new(MESSAGE), UserId::new(NAVIGATOR), &next())
            .await;
        assert_eq!(navigator.current_page().await, expected);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(target.edits.load(Ordering::SeqCst), 3);

    // Clamped: a further next is a no-op, not an error.
    router
        .dispatch_reaction(MessageId::new(MESSAGE), UserId::new(NAVIGATOR), &next())
        .await;
    assert_eq!(navigator.current_page().await, 3);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn previous_from_page_zero_is_a_noop() {
    let calls = Arc::new(AtomicUsize::new(0));
    let (router, navigator, _target) = setup(3, counting_generator(calls.clone())).await;

    router
        .dispatch_reaction(MessageId::new(MESSAGE), UserId::new(NAVIGATOR), &prev())
        .await;
    assert_eq!(navigator.current_page().await, 0);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn reactions_from_other_users_or_emoji_are_ignored() {
    let calls = Arc::new(AtomicUsize::new(0));
    let (router, navigator, _target) = setup(3, counting_generator(calls.clone())).await;

    router
        .dispatch_reaction(MessageId::new(MESSAGE), UserId::new(99), &next())
        .await;
    router
        .dispatch_reaction(
            MessageId::new(MESSAGE),
            UserId::new(NAVIGATOR),
            &ReactionType::Unicode("🎲".to_string()),
        )
        .await;
    assert_eq!(navigator.current_page().await, 0);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn navigation_during_render_is_dropped_not_queued() {
    let gate = Arc::new(Notify::new());
    let calls = Arc::new(AtomicUsize::new(0));
    let generator: PageGenerator = {
        let gate = gate.clone();
        let calls = calls.clone();
        Box::new(move |_page| {
            let gate = gate.clone();
            let calls = calls.clone();
            Box::pin(async move {
                calls.fetch_add(1, Ordering::SeqCst);
                gate.notified().await;
                Ok(CreateEmbed::new())
            })
        })
    };
    let (router, navigator, _target) = setup(5, generator).await;

    let in_flight = {
        let router = router.clone();
        tokio::spawn(async move {
            router
                .dispatch_reaction(MessageId::new(MESSAGE), UserId::new(NAVIGATOR), &next())
                .await;
        })
    };
    // Let the first render start and park in the generator.
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(navigator.state().await, NavState::Rendering);

    // Clicks arriving mid-render must not trigger a second fetch.
    router
        .dispatch_reaction(MessageId::new(MESSAGE), UserId::new(NAVIGATOR), &next())
        .await;
    router
        .dispatch_reaction(MessageId::new(MESSAGE), UserId::new(NAVIGATOR), &prev())
        .await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    gate.notify_one();
    in_flight.await.unwrap();
    assert_eq!(navigator.current_page().await, 1);
    assert_eq!(navigator.state().await, NavState::Idle);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // Back to idle: the next click is processed normally.
    gate.notify_one();
    router
        .dispatch_reaction(MessageId::new(MESSAGE), UserId::new(NAVIGATOR), &next())
        .await;
    assert_eq!(navigator.current_page().await, 2);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn stop_retracts_controls_and_unregisters() {
    let calls = Arc::new(AtomicUsize::new(0));
    let (router, navigator, target) = setup(3, counting_generator(calls.clone())).await;
    assert_eq!(router.navigator_count().await, 1);

    navigator.stop().await;
    assert_eq!(navigator.state().await, NavState::Stopped);
    assert_eq!(target.cleared.load(Ordering::SeqCst), 1);
    assert_eq!(router.navigator_count().await, 0);

    // Idempotent, and navigation after stop is inert.
    navigator.stop().await;
    assert_eq!(target.cleared.load(Ordering::SeqCst), 1);
    router
        .dispatch_reaction(MessageId::new(MESSAGE), UserId::new(NAVIGATOR), &next())
        .await;
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn idle_timeout_ends_the_session() {
    let calls = Arc::new(AtomicUsize::new(0));
    let router = Arc::new(InteractionRouter::new());
    let target = Arc::new(CountingTarget::default());
    let navigator = Arc::new(
        PageNavigator::new(
            router.clone(),
            MessageId::new(MESSAGE),
            UserId::new(NAVIGATOR),
            page_info(3),
            target.clone(),
            counting_generator(calls),
        )
        .idle_timeout(Duration::from_millis(40)),
    );
    navigator.listen().await.unwrap();
    assert_eq!(router.navigator_count().await, 1);

    tokio::time::sleep(Duration::from_millis(120)).await;
    assert_eq!(navigator.state().await, NavState::Stopped);
    assert_eq!(target.cleared.load(Ordering::SeqCst), 1);
    assert_eq!(router.navigator_count().await, 0);
}
