pub mod collector;
pub mod navigator;
pub mod router;
pub mod style;

pub use collector::{ReplyCollector, ReplyMessage, DEFAULT_REPLY_TIMEOUT};
pub use navigator::{
    MessageTarget, NavDirection, NavState, NavTarget, PageGenerator, PageNavigator,
    NAV_IDLE_TIMEOUT, NEXT_REACTION, PREV_REACTION,
};
pub use router::InteractionRouter;
