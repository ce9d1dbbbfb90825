//! Shared application state stored in Serenity's global context, plus the
//! page metadata type that paginated views and the navigator agree on.

use std::sync::Arc;

use serde::Deserialize;
use serenity::prelude::TypeMapKey;

use crate::anilist;
use crate::commands::registry::CommandRegistry;
use crate::config::Config;
use crate::database::ConnectionStore;
use crate::ui::router::InteractionRouter;

/// The central, shared state of the application.
/// An `Arc<AppState>` is stored in the global context for access from the
/// event handler and every command. Built once at startup; the registry is
/// immutable afterwards.
pub struct AppState {
    pub config: Config,
    pub registry: CommandRegistry,
    pub anilist: Arc<anilist::Client>,
    pub store: Arc<dyn ConnectionStore>,
    pub router: Arc<InteractionRouter>,
}

impl AppState {
    pub async fn from_ctx(ctx: &serenity::prelude::Context) -> Option<Arc<Self>> {
        ctx.data.read().await.get::<AppState>().cloned()
    }
}

impl TypeMapKey for AppState {
    type Value = Arc<AppState>;
}

/// Page metadata as reported by the AniList `pageInfo` block.
/// Invariant: `current_page <= last_page`; navigation outside that range is
/// clamped by the navigator, never an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageInfo {
    pub current_page: u32,
    pub last_page: u32,
    pub total: u32,
    pub per_page: u32,
}
