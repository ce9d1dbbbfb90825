//! AniList GraphQL client: plain POST queries with `serde_json` variables,
//! plus the OAuth code exchange used by the account link flow.

pub mod models;

use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

pub use models::*;

use crate::model::PageInfo;

pub const API_URL: &str = "https://graphql.anilist.co";
pub const OAUTH_URL: &str = "https://anilist.co/api/v2/oauth/authorize";
pub const TOKEN_URL: &str = "https://anilist.co/api/v2/oauth/token";
pub const REDIRECT_URI: &str = "https://anilist.co/api/v2/oauth/pin";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Entries per page of a user's media list.
pub const LIST_PER_PAGE: u32 = 6;
/// Entries per page of media search results.
pub const SEARCH_PER_PAGE: u32 = 10;

#[derive(Debug, Error)]
pub enum AniListError {
    #[error("AniList request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("AniList API error: {0}")]
    Api(String),
    #[error("malformed AniList response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Default, Deserialize)]
struct GraphError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct GraphResponse {
    #[serde(default)]
    data: Value,
    #[serde(default)]
    errors: Vec<GraphError>,
}

pub struct Client {
    http: reqwest::Client,
    client_id: i64,
    client_secret: String,
}

impl Client {
    pub fn new(client_id: i64, client_secret: String) -> Result<Self, AniListError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Client {
            http,
            client_id,
            client_secret,
        })
    }

    /// The authorization entry point a user visits to obtain a one-time code.
    pub fn authorize_url(&self) -> String {
        format!(
            "{OAUTH_URL}?client_id={}&redirect_uri={REDIRECT_URI}&response_type=code",
            self.client_id
        )
    }

    async fn query(
        &self,
        query: &str,
        variables: Value,
        token: Option<&str>,
    ) -> Result<GraphResponse, AniListError> {
        let mut request = self
            .http
            .post(API_URL)
            .json(&json!({ "query": query, "variables": variables }));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        // AniList reports query errors as JSON alongside a 4xx status.
        Ok(response.json::<GraphResponse>().await?)
    }

    fn check(response: &GraphResponse) -> Result<(), AniListError> {
        if response.errors.is_empty() {
            return Ok(());
        }
        let messages: Vec<&str> = response
            .errors
            .iter()
            .map(|e| e.message.as_str())
            .collect();
        Err(AniListError::Api(messages.join("; ")))
    }

    /// Looks up a public profile by username. A 404 is "no such user",
    /// not an error.
    pub async fn search_user(&self, username: &str) -> Result<Option<User>, AniListError> {
        if username.is_empty() {
            return Ok(None);
        }
        let response = self
            .query(
                USER_QUERY,
                json!({ "username": username }),
                None,
            )
            .await?;
        if response.errors.iter().any(|e| e.status == Some(404)) {
            return Ok(None);
        }
        Self::check(&response)?;
        let user = response.data.get("User").cloned().unwrap_or(Value::Null);
        if user.is_null() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(user)?))
    }

    /// One page of a user's media list, filtered by type and status.
    pub async fn media_list_page(
        &self,
        user_id: i64,
        filter: MediaListFilter,
        page: u32,
    ) -> Result<Option<MediaListPage>, AniListError> {
        let response = self
            .query(
                MEDIA_LIST_QUERY,
                json!({
                    "userId": user_id,
                    "type": filter.media_type.api_value(),
                    "status": filter.status.api_value(),
                    "page": page,
                    "perPage": LIST_PER_PAGE,
                }),
                None,
            )
            .await?;
        Self::check(&response)?;
        let page_data = response.data.get("Page").cloned().unwrap_or(Value::Null);
        let Some(entries) = page_data.get("mediaList") else {
            return Ok(None);
        };
        let entries: Vec<MediaListEntry> = serde_json::from_value(entries.clone())?;
        let page_info = page_info_of(&page_data)?;
        Ok(Some(MediaListPage { entries, page_info }))
    }

    /// One page of media search results, optionally restricted by type.
    pub async fn media_search_page(
        &self,
        search: &str,
        media_type: Option<MediaType>,
        page: u32,
    ) -> Result<(Vec<Media>, PageInfo), AniListError> {
        let mut variables = json!({
            "search": search,
            "page": page,
            "perPage": SEARCH_PER_PAGE,
        });
        if let Some(media_type) = media_type {
            variables["type"] = json!(media_type.api_value());
        }
        let response = self.query(MEDIA_SEARCH_QUERY, variables, None).await?;
        Self::check(&response)?;
        let page_data = response.data.get("Page").cloned().unwrap_or(Value::Null);
        let items = page_data.get("media").cloned().unwrap_or(json!([]));
        let items: Vec<Media> = serde_json::from_value(items)?;
        let page_info = page_info_of(&page_data)?;
        Ok((items, page_info))
    }

    /// The profile belonging to an access token.
    pub async fn viewer(&self, token: &str) -> Result<Viewer, AniListError> {
        let response = self.query(VIEWER_QUERY, json!({}), Some(token)).await?;
        Self::check(&response)?;
        let viewer = response.data.get("Viewer").cloned().unwrap_or(Value::Null);
        if viewer.is_null() {
            return Err(AniListError::Api("no viewer for token".into()));
        }
        Ok(serde_json::from_value(viewer)?)
    }

    /// Airing notifications for the viewer behind `token`.
    pub async fn airing_notifications(
        &self,
        token: &str,
        page: u32,
    ) -> Result<Vec<AiringNotification>, AniListError> {
        let response = self
            .query(
                NOTIFICATIONS_QUERY,
                json!({ "page": page, "perPage": 10 }),
                Some(token),
            )
            .await?;
        Self::check(&response)?;
        let notifications = response
            .data
            .get("Page")
            .and_then(|p| p.get("notifications"))
            .cloned()
            .unwrap_or(json!([]));
        let notifications: Vec<AiringNotification> = serde_json::from_value(notifications)?;
        // Other notification kinds deserialize to empty objects; keep airing ones.
        Ok(notifications
            .into_iter()
            .filter(|n| n.media.is_some())
            .collect())
    }

    /// Exchanges an OAuth authorization code for an access token.
    /// A rejected code yields `None`; only transport problems are errors.
    pub async fn exchange_code(&self, code: &str) -> Result<Option<String>, AniListError> {
        let response = self
            .http
            .post(TOKEN_URL)
            .json(&json!({
                "grant_type": "authorization_code",
                "client_id": self.client_id,
                "client_secret": self.client_secret,
                "redirect_uri": REDIRECT_URI,
                "code": code,
            }))
            .send()
            .await?;
        if !response.status().is_success() {
            debug!(target: "anilist.oauth", status = %response.status(), "token exchange rejected");
            return Ok(None);
        }
        let body: Value = response.json().await?;
        Ok(body
            .get("access_token")
            .and_then(|t| t.as_str())
            .map(str::to_string))
    }
}

fn page_info_of(page_data: &Value) -> Result<PageInfo, AniListError> {
    let info = page_data.get("pageInfo").cloned().unwrap_or(Value::Null);
    if info.is_null() {
        return Ok(PageInfo::default());
    }
    Ok(serde_json::from_value(info)?)
}

const USER_QUERY: &str = "\
query ($username: String) {
    User(name: $username) {
        id
        name
        options {
            profileColor
        }
        avatar {
            medium
        }
    }
}";

const MEDIA_LIST_QUERY: &str = "\
query ($userId: Int, $type: MediaType, $status: MediaListStatus, $page: Int, $perPage: Int) {
    Page(page: $page, perPage: $perPage) {
        pageInfo {
            total
            currentPage
            lastPage
            perPage
        }
        mediaList(userId: $userId, type: $type, status: $status, sort: [UPDATED_TIME_DESC]) {
            media {
                id
                title {
                    english
                    romaji
                    native
                }
                episodes
                chapters
                isAdult
                siteUrl
            }
            progress
        }
    }
}";

const MEDIA_SEARCH_QUERY: &str = "\
query ($search: String, $type: MediaType, $page: Int, $perPage: Int) {
    Page(page: $page, perPage: $perPage) {
        pageInfo {
            total
            currentPage
            lastPage
            perPage
        }
        media(search: $search, type: $type, sort: [SEARCH_MATCH]) {
            id
            title {
                english
                romaji
                native
            }
            format
            description
            genres
            averageScore
            episodes
            chapters
            isAdult
            siteUrl
            coverImage {
                medium
            }
        }
    }
}";

const VIEWER_QUERY: &str = "\
query {
    Viewer {
        id
        name
        options {
            titleLanguage
            displayAdultContent
            profileColor
        }
    }
}";

const NOTIFICATIONS_QUERY: &str = "\
query ($page: Int, $perPage: Int) {
    Page(page: $page, perPage: $perPage) {
        notifications(type: AIRING, resetNotificationCount: false) {
            ... on AiringNotification {
                episode
                createdAt
                media {
                    id
                    title {
                        english
                        romaji
                        native
                    }
                    isAdult
                    siteUrl
                }
            }
        }
    }
}";
