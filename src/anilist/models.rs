//! Typed views over the AniList GraphQL schema. Only the fields the bot
//! renders are deserialized; everything else is left in the response JSON.

use serde::Deserialize;

use crate::model::PageInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Anime,
    Manga,
}

impl MediaType {
    pub fn api_value(self) -> &'static str {
        match self {
            MediaType::Anime => "ANIME",
            MediaType::Manga => "MANGA",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MediaType::Anime => "anime",
            MediaType::Manga => "manga",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaListStatus {
    Current,
    Planning,
    Completed,
    Dropped,
    Paused,
    Repeating,
}

impl MediaListStatus {
    pub fn api_value(self) -> &'static str {
        match self {
            MediaListStatus::Current => "CURRENT",
            MediaListStatus::Planning => "PLANNING",
            MediaListStatus::Completed => "COMPLETED",
            MediaListStatus::Dropped => "DROPPED",
            MediaListStatus::Paused => "PAUSED",
            MediaListStatus::Repeating => "REPEATING",
        }
    }
}

/// Which slice of a user's media list to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaListFilter {
    pub media_type: MediaType,
    pub status: MediaListStatus,
}

impl MediaListFilter {
    /// Human label used in the list embed title, e.g. "plan to read list".
    pub fn label(self) -> &'static str {
        use MediaListStatus::*;
        match (self.media_type, self.status) {
            (MediaType::Anime, Completed) => "completed anime list",
            (MediaType::Anime, Current) => "watchlist",
            (MediaType::Anime, Dropped) => "dropped anime list",
            (MediaType::Anime, Paused) => "paused anime list",
            (MediaType::Anime, Planning) => "plan to watch list",
            (MediaType::Anime, Repeating) => "re-watching list",
            (MediaType::Manga, Completed) => "completed manga list",
            (MediaType::Manga, Current) => "readlist",
            (MediaType::Manga, Dropped) => "dropped manga list",
            (MediaType::Manga, Paused) => "paused manga list",
            (MediaType::Manga, Planning) => "plan to read list",
            (MediaType::Manga, Repeating) => "re-reading list",
        }
    }

    /// Path segments of the matching list view on anilist.co.
    pub fn site_path(self) -> (&'static str, &'static str) {
        let list = match self.media_type {
            MediaType::Anime => "animelist",
            MediaType::Manga => "mangalist",
        };
        let section = match (self.media_type, self.status) {
            (_, MediaListStatus::Completed) => "Completed",
            (MediaType::Anime, MediaListStatus::Current) => "Watching",
            (MediaType::Manga, MediaListStatus::Current) => "Reading",
            (_, MediaListStatus::Dropped) => "Dropped",
            (_, MediaListStatus::Paused) => "Paused",
            (_, MediaListStatus::Planning) => "Planning",
            (MediaType::Anime, MediaListStatus::Repeating) => "Rewatching",
            (MediaType::Manga, MediaListStatus::Repeating) => "Rereading",
        };
        (list, section)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaTitle {
    pub english: Option<String>,
    pub romaji: Option<String>,
    pub native: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoverImage {
    pub medium: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Media {
    pub id: i64,
    pub title: MediaTitle,
    pub format: Option<String>,
    pub description: Option<String>,
    pub genres: Vec<String>,
    pub average_score: Option<i32>,
    pub episodes: Option<i32>,
    pub chapters: Option<i32>,
    pub is_adult: bool,
    pub site_url: Option<String>,
    pub cover_image: CoverImage,
}

impl Media {
    pub fn url(&self, media_type: MediaType) -> String {
        self.site_url.clone().unwrap_or_else(|| {
            format!("https://anilist.co/{}/{}/", media_type.label(), self.id)
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaListEntry {
    pub media: Media,
    pub progress: Option<i32>,
}

/// One page of a user's media list together with its page metadata.
#[derive(Debug, Clone)]
pub struct MediaListPage {
    pub entries: Vec<MediaListEntry>,
    pub page_info: PageInfo,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileOptions {
    pub profile_color: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Avatar {
    pub medium: Option<String>,
}

/// A public AniList profile resolved by username.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub options: ProfileOptions,
    #[serde(default)]
    pub avatar: Avatar,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewerOptions {
    pub title_language: Option<String>,
    pub display_adult_content: bool,
    pub profile_color: Option<String>,
}

/// The invoking user's own linked profile. Drives title selection and
/// adult-content visibility, never pagination.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewer {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub options: ViewerOptions,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiringNotification {
    #[serde(default)]
    pub episode: Option<i32>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub media: Option<Media>,
}

/// Picks the display title honouring the viewer's title-language preference,
/// falling back english → romaji → native.
pub fn display_title(title: &MediaTitle, viewer: Option<&Viewer>) -> String {
    let pref = viewer
        .and_then(|v| v.options.title_language.as_deref())
        .unwrap_or("ENGLISH");
    // AniList also reports stylised variants such as ENGLISH_STYLISED.
    let ordered: [&Option<String>; 3] = if pref.starts_with("ROMAJI") {
        [&title.romaji, &title.english, &title.native]
    } else if pref.starts_with("NATIVE") {
        [&title.native, &title.romaji, &title.english]
    } else {
        [&title.english, &title.romaji, &title.native]
    };
    ordered
        .iter()
        .find_map(|t| t.as_deref())
        .unwrap_or("Untitled")
        .to_string()
}

/// Adult-content visibility rule: a linked viewer who opted in, inside a
/// channel flagged for such content. Unlinked callers never qualify.
pub fn adult_visible(viewer: Option<&Viewer>, adult_channel: bool) -> bool {
    adult_channel && viewer.is_some_and(|v| v.options.display_adult_content)
}
