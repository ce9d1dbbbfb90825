//! Media search commands: `search`, `anime`, `manga`.

use std::sync::Arc;

use async_trait::async_trait;
use serenity::builder::{CreateEmbed, CreateEmbedFooter};
use serenity::model::channel::Message;
use serenity::prelude::Context;

use super::registry::{Command, CommandHandler, CommandInfo, HelpInfo, Module};
use crate::anilist::{adult_visible, display_title, Client, Media, MediaType, Viewer};
use crate::model::{AppState, PageInfo};
use crate::services::search::{run_search, ChannelIo, SearchSource};
use crate::ui::style::{self, HIDDEN_ENTRY_LABEL, HIDDEN_ENTRY_NOTE};
use crate::ui::DEFAULT_REPLY_TIMEOUT;

pub struct SearchModule;

impl Module for SearchModule {
    fn name(&self) -> &'static str {
        "search"
    }

    fn commands(&self) -> Vec<Command> {
        vec![
            Command::new(
                CommandInfo::new("search").help(HelpInfo {
                    short_desc: "Search for information about an anime or manga.",
                    arguments: &[("title", "Anime or manga title.")],
                    examples: &["search yuru camp"],
                    ..Default::default()
                }),
                Arc::new(SearchCommand { media_type: None }),
            ),
            Command::new(
                CommandInfo::new("anime").help(HelpInfo {
                    short_desc: "Search for information about an anime.",
                    arguments: &[("title", "Anime title.")],
                    examples: &["anime yuru camp"],
                    ..Default::default()
                }),
                Arc::new(SearchCommand {
                    media_type: Some(MediaType::Anime),
                }),
            ),
            Command::new(
                CommandInfo::new("manga").help(HelpInfo {
                    short_desc: "Search for information about a manga.",
                    arguments: &[("title", "Manga title.")],
                    examples: &["manga komi can't communicate"],
                    ..Default::default()
                }),
                Arc::new(SearchCommand {
                    media_type: Some(MediaType::Manga),
                }),
            ),
        ]
    }
}

struct SearchCommand {
    media_type: Option<MediaType>,
}

#[async_trait]
impl CommandHandler for SearchCommand {
    async fn run(&self, ctx: &Context, msg: &Message, _args: &[String]) -> anyhow::Result<()> {
        let Some(state) = AppState::from_ctx(ctx).await else {
            return Ok(());
        };
        // Search text keeps its original casing; dispatch lower-cases args.
        let query = free_text_query(&state.config.command_prefix, &msg.content);
        let viewer =
            crate::services::viewer::resolve_viewer(&*state.store, &state.anilist, msg.author.id)
                .await;
        let adult_channel = super::channel_allows_adult(ctx, msg).await;
        let source = Arc::new(MediaSearchSource {
            anilist: state.anilist.clone(),
            media_type: self.media_type,
            viewer,
            adult_channel,
        });
        let io = ChannelIo::new(ctx.http.clone(), msg.channel_id);
        run_search(
            state.router.clone(),
            &io,
            source,
            msg.author.id,
            msg.channel_id,
            &query,
            DEFAULT_REPLY_TIMEOUT,
        )
        .await?;
        Ok(())
    }
}

/// Everything after the command token, untouched.
pub fn free_text_query(prefix: &str, content: &str) -> String {
    let body = content.strip_prefix(prefix).unwrap_or(content);
    match body.split_once(char::is_whitespace) {
        Some((_, rest)) => rest.trim().to_string(),
        None => String::new(),
    }
}

/// AniList media search, scoped by type and carrying the invoker's gating
/// context for the whole interaction.
pub struct MediaSearchSource {
    pub anilist: Arc<Client>,
    pub media_type: Option<MediaType>,
    pub viewer: Option<Viewer>,
    pub adult_channel: bool,
}

impl MediaSearchSource {
    fn visible(&self, media: &Media) -> bool {
        !media.is_adult || adult_visible(self.viewer.as_ref(), self.adult_channel)
    }
}

#[async_trait]
impl SearchSource for MediaSearchSource {
    type Item = Media;

    fn subject(&self) -> &str {
        match self.media_type {
            Some(MediaType::Anime) => "anime title",
            Some(MediaType::Manga) => "manga title",
            None => "search query",
        }
    }

    async fn fetch_page(
        &self,
        query: &str,
        page: u32,
    ) -> anyhow::Result<(Vec<Media>, PageInfo)> {
        Ok(self
            .anilist
            .media_search_page(query, self.media_type, page)
            .await?)
    }

    fn listing_embed(&self, items: &[Media], page_info: PageInfo) -> CreateEmbed {
        let viewer = self.viewer.as_ref();
        let fields = items.iter().enumerate().map(|(i, media)| {
            if self.visible(media) {
                (
                    format!("{}. {}", i + 1, display_title(&media.title, viewer)),
                    media
                        .format
                        .clone()
                        .unwrap_or_else(|| "No format".to_string()),
                    false,
                )
            } else {
                (
                    format!("{}. {}", i + 1, HIDDEN_ENTRY_LABEL),
                    HIDDEN_ENTRY_NOTE.to_string(),
                    false,
                )
            }
        });
        CreateEmbed::new()
            .title("Search results")
            .description("Enter the number of the content you are looking for.")
            .color(style::COLOR_INFO)
            .fields(fields)
            .footer(CreateEmbedFooter::new(format!(
                "Page {} / {}",
                page_info.current_page, page_info.last_page
            )))
    }

    fn detail_embed(&self, media: &Media) -> CreateEmbed {
        if !self.visible(media) {
            return style::info_embed(HIDDEN_ENTRY_LABEL, HIDDEN_ENTRY_NOTE);
        }
        let score = media
            .average_score
            .map(|s| format!("{:.1} / 10", f64::from(s) / 10.0))
            .unwrap_or_else(|| "No rating".to_string());
        let genres = if media.genres.is_empty() {
            "None".to_string()
        } else {
            media.genres.join(", ")
        };
        let mut embed = CreateEmbed::new()
            .title(display_title(&media.title, self.viewer.as_ref()))
            .color(style::COLOR_INFO)
            .field(
                "Format",
                media
                    .format
                    .clone()
                    .unwrap_or_else(|| "No format".to_string()),
                true,
            )
            .field("Average score", score, true)
            .field("Genres", genres, true);
        if let Some(url) = &media.site_url {
            embed = embed.url(url.clone());
        }
        if let Some(thumbnail) = &media.cover_image.medium {
            embed = embed.thumbnail(thumbnail.clone());
        }
        if let Some(description) = &media.description {
            embed = embed.description(clean_description(description));
        }
        embed
    }
}

/// Strips the HTML markup AniList embeds in descriptions and collapses
/// blank-line runs. Output is clamped to Discord's description limit.
pub fn clean_description(raw: &str) -> String {
    let replaced = raw
        .replace("<br>", "\n")
        .replace("<i>", "*")
        .replace("</i>", "*")
        .replace("<b>", "**")
        .replace("</b>", "**");
    let mut out = String::with_capacity(replaced.len());
    let mut pending_break = false;
    for line in replaced.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            pending_break = !out.is_empty();
            continue;
        }
        if pending_break {
            out.push_str("\n\n");
            pending_break = false;
        } else if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(line);
    }
    const LIMIT: usize = 4000;
    if out.len() > LIMIT {
        let cut = out
            .char_indices()
            .take_while(|(i, _)| *i < LIMIT)
            .last()
            .map(|(i, _)| i)
            .unwrap_or(0);
        out.truncate(cut);
        out.push('…');
    }
    out
}
