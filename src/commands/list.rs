//! Media list commands: `anilist` (alias `list`), `watching`, `reading`.
//!
//! The user profile is resolved with its own query, never derived from list
//! rows, so an empty list still renders a correct header embed.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serenity::builder::{CreateEmbed, CreateMessage};
use serenity::model::channel::Message;
use serenity::prelude::Context;

use super::registry::{Command, CommandHandler, CommandInfo, HelpInfo, Module};
use crate::anilist::{
    adult_visible, display_title, MediaListFilter, MediaListPage, MediaListStatus, MediaType,
    User, Viewer,
};
use crate::model::AppState;
use crate::services::viewer::resolve_viewer;
use crate::ui::navigator::{MessageTarget, PageGenerator, PageNavigator};
use crate::ui::style::{self, HIDDEN_ENTRY_LABEL, HIDDEN_ENTRY_NOTE};

pub struct ListModule;

impl Module for ListModule {
    fn name(&self) -> &'static str {
        "list"
    }

    fn commands(&self) -> Vec<Command> {
        vec![
            Command::new(
                CommandInfo::new("anilist")
                    .aliases(&["list"])
                    .help(HelpInfo {
                        short_desc: "Gets a section of a AniList user's anime or manga list.",
                        long_desc: Some(
                            "The user's list of completed anime will be returned if no \n\
                             other arguments are provided.",
                        ),
                        arguments: &[
                            ("username", "AniList username."),
                            ("type", "`anime` or `manga`."),
                            (
                                "section",
                                "`completed`, `watching`, `reading`, `planned` \n\
                                 or `dropped`.",
                            ),
                        ],
                        examples: &["anilist DamourYouKnow", "anilist DamourYouKnow manga planned"],
                    }),
                Arc::new(ListCommand { preset: None }),
            ),
            Command::new(
                CommandInfo::new("watching").help(HelpInfo {
                    short_desc: "Gets the list of anime that a AniList user is currently \n\
                                 watching.",
                    arguments: &[("username", "AniList username.")],
                    examples: &["watching DamourYouKnow"],
                    ..Default::default()
                }),
                Arc::new(ListCommand {
                    preset: Some(MediaListFilter {
                        media_type: MediaType::Anime,
                        status: MediaListStatus::Current,
                    }),
                }),
            ),
            Command::new(
                CommandInfo::new("reading").help(HelpInfo {
                    short_desc: "Gets the list of manga that a AniList user is currently \n\
                                 reading.",
                    arguments: &[("username", "AniList username.")],
                    examples: &["reading DamourYouKnow"],
                    ..Default::default()
                }),
                Arc::new(ListCommand {
                    preset: Some(MediaListFilter {
                        media_type: MediaType::Manga,
                        status: MediaListStatus::Current,
                    }),
                }),
            ),
        ]
    }
}

/// Maps trailing arguments to a list filter: `manga` switches the type,
/// section keywords pick the status, anything unrecognized is ignored.
pub fn parse_list_filter(args: &[String]) -> MediaListFilter {
    let set: HashSet<&str> = args.iter().map(String::as_str).collect();
    let media_type = if set.contains("manga") {
        MediaType::Manga
    } else {
        MediaType::Anime
    };
    let status = if set.contains("watching") || set.contains("reading") {
        MediaListStatus::Current
    } else if set.contains("dropped") {
        MediaListStatus::Dropped
    } else if set.contains("planned") {
        MediaListStatus::Planning
    } else {
        MediaListStatus::Completed
    };
    MediaListFilter { media_type, status }
}

struct ListCommand {
    preset: Option<MediaListFilter>,
}

#[async_trait]
impl CommandHandler for ListCommand {
    async fn run(&self, ctx: &Context, msg: &Message, args: &[String]) -> anyhow::Result<()> {
        let Some(state) = AppState::from_ctx(ctx).await else {
            return Ok(());
        };
        let Some(username) = args.first() else {
            msg.channel_id
                .send_message(
                    &ctx.http,
                    CreateMessage::new().embed(style::error_embed(
                        "Missing username",
                        "No AniList username was provided.",
                    )),
                )
                .await?;
            return Ok(());
        };

        let viewer = resolve_viewer(&*state.store, &state.anilist, msg.author.id).await;
        let not_found = style::info_embed(
            "Profile not found",
            format!("No AniList profile for **{username}** was found."),
        );
        let Some(user) = state.anilist.search_user(username).await? else {
            msg.channel_id
                .send_message(&ctx.http, CreateMessage::new().embed(not_found))
                .await?;
            return Ok(());
        };

        let filter = self.preset.unwrap_or_else(|| parse_list_filter(&args[1..]));
        let Some(page) = state.anilist.media_list_page(user.id, filter, 0).await? else {
            msg.channel_id
                .send_message(&ctx.http, CreateMessage::new().embed(not_found))
                .await?;
            return Ok(());
        };

        let adult_channel = super::channel_allows_adult(ctx, msg).await;
        let embed = media_list_embed(&user, &page, filter, viewer.as_ref(), adult_channel);
        let response = msg
            .channel_id
            .send_message(
                &ctx.http,
                CreateMessage::new().embed(embed).reference_message(msg),
            )
            .await?;

        let page_info = page.page_info;
        if page_info.total <= page_info.per_page {
            return Ok(());
        }

        let generator: PageGenerator = {
            let anilist = state.anilist.clone();
            let user = user.clone();
            let viewer = viewer.clone();
            Box::new(move |page| {
                let anilist = anilist.clone();
                let user = user.clone();
                let viewer = viewer.clone();
                Box::pin(async move {
                    let fetched = anilist
                        .media_list_page(user.id, filter, page)
                        .await?
                        .ok_or_else(|| anyhow::anyhow!("media list page {page} missing"))?;
                    Ok(media_list_embed(
                        &user,
                        &fetched,
                        filter,
                        viewer.as_ref(),
                        adult_channel,
                    ))
                })
            })
        };
        let target = Arc::new(MessageTarget::new(ctx.http.clone(), response));
        let navigator = Arc::new(PageNavigator::new(
            state.router.clone(),
            target.message_id(),
            msg.author.id,
            page_info,
            target.clone(),
            generator,
        ));
        navigator.listen().await?;
        Ok(())
    }
}

pub fn media_list_embed(
    user: &User,
    page: &MediaListPage,
    filter: MediaListFilter,
    viewer: Option<&Viewer>,
    adult_channel: bool,
) -> CreateEmbed {
    let fields = page.entries.iter().map(|entry| {
        let media = &entry.media;
        if media.is_adult && !adult_visible(viewer, adult_channel) {
            return (
                HIDDEN_ENTRY_LABEL.to_string(),
                HIDDEN_ENTRY_NOTE.to_string(),
                false,
            );
        }
        let max_count = match filter.media_type {
            MediaType::Anime => media.episodes,
            MediaType::Manga => media.chapters,
        };
        let count = format!(
            "{} / {}",
            entry.progress.unwrap_or(0),
            max_count.map_or_else(|| "?".to_string(), |max| max.to_string()),
        );
        (
            display_title(&media.title, viewer),
            format!("Progress: `{count}`\n[Link]({})", media.url(filter.media_type)),
            false,
        )
    });

    let info = page.page_info;
    let (list_path, section) = filter.site_path();
    let mut embed = CreateEmbed::new()
        .color(style::profile_color(user.options.profile_color.as_deref()))
        .title(format!("{}'s {}", user.name, filter.label()))
        .url(format!(
            "https://anilist.co/user/{}/{list_path}/{section}",
            user.name
        ))
        .fields(fields);
    if let Some(avatar) = &user.avatar.medium {
        embed = embed.thumbnail(avatar.clone());
    }
    if info.total == 0 {
        embed = embed.description("There are no entries in this list.");
    } else if info.total > info.per_page {
        embed = embed.description(format!("Page {} / {}", info.current_page, info.last_page));
    }
    embed
}
