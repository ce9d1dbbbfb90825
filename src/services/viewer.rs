//! Resolves the invoking user's linked AniList profile, independent of any
//! list or search query. Absent or stale connections yield `None` rather
//! than an error; personalization simply degrades to defaults.

use serenity::model::id::UserId;
use tracing::{debug, warn};

use crate::anilist::{Client, Viewer};
use crate::database::ConnectionStore;

pub async fn resolve_viewer(
    store: &dyn ConnectionStore,
    api: &Client,
    user: UserId,
) -> Option<Viewer> {
    let connection = match store.get(user).await {
        Ok(Some(connection)) => connection,
        Ok(None) => return None,
        Err(e) => {
            warn!(target: "viewer", user = user.get(), error = %e, "connection lookup failed");
            return None;
        }
    };
    match api.viewer(&connection.token).await {
        Ok(viewer) => Some(viewer),
        Err(e) => {
            debug!(target: "viewer", user = user.get(), error = %e, "stored token no longer resolves");
            None
        }
    }
}
