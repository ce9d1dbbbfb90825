//! Core of the account link handshake: authorization code in, persisted
//! connection out. The surrounding DM conversation lives in the `connect`
//! command; this part is pure exchange-then-upsert so the terminal states
//! are observable without a gateway.

use async_trait::async_trait;
use serenity::model::id::UserId;
use tracing::warn;

use crate::anilist::{self, AniListError, Viewer};
use crate::database::ConnectionStore;

/// Terminal states of the link conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// Token exchange and profile fetch succeeded; the connection is stored.
    Linked { account_name: String },
    /// The authorization code was rejected.
    InvalidCode,
    /// Exchange succeeded but the profile fetch or the store write failed.
    Failed,
    /// No reply arrived before the collector timeout.
    TimedOut,
}

/// Token-exchange surface of the AniList client.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn exchange_code(&self, code: &str) -> Result<Option<String>, AniListError>;
    async fn viewer(&self, token: &str) -> Result<Viewer, AniListError>;
}

#[async_trait]
impl AuthApi for anilist::Client {
    async fn exchange_code(&self, code: &str) -> Result<Option<String>, AniListError> {
        anilist::Client::exchange_code(self, code).await
    }

    async fn viewer(&self, token: &str) -> Result<Viewer, AniListError> {
        anilist::Client::viewer(self, token).await
    }
}

/// Exchanges `code`, resolves the profile behind the token and upserts the
/// connection keyed by the caller's Discord id. The upsert is the last
/// step, so a failure anywhere leaves no record behind.
pub async fn complete_link(
    api: &dyn AuthApi,
    store: &dyn ConnectionStore,
    user: UserId,
    code: &str,
) -> LinkOutcome {
    let token = match api.exchange_code(code).await {
        Ok(Some(token)) if !token.is_empty() => token,
        Ok(_) => return LinkOutcome::InvalidCode,
        Err(e) => {
            warn!(target: "link", user = user.get(), error = %e, "token exchange failed");
            return LinkOutcome::Failed;
        }
    };
    let viewer = match api.viewer(&token).await {
        Ok(viewer) => viewer,
        Err(e) => {
            warn!(target: "link", user = user.get(), error = %e, "profile fetch failed");
            return LinkOutcome::Failed;
        }
    };
    if let Err(e) = store.upsert(user, viewer.id, &token).await {
        warn!(target: "link", user = user.get(), error = %e, "connection upsert failed");
        return LinkOutcome::Failed;
    }
    LinkOutcome::Linked {
        account_name: viewer.name,
    }
}
