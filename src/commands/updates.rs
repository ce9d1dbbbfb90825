//! The `updates` command: airing notifications for the linked account.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serenity::builder::{CreateEmbed, CreateMessage};
use serenity::model::channel::Message;
use serenity::prelude::Context;

use super::registry::{Command, CommandHandler, CommandInfo, HelpInfo, Module};
use crate::anilist::{display_title, AiringNotification, Viewer};
use crate::model::AppState;
use crate::ui::style;

pub struct UpdatesModule;

impl Module for UpdatesModule {
    fn name(&self) -> &'static str {
        "updates"
    }

    fn commands(&self) -> Vec<Command> {
        vec![Command::new(
            CommandInfo::new("updates").help(HelpInfo {
                short_desc: "Get updates for airing anime you follow.",
                long_desc: Some("Requires AniList account connection."),
                examples: &["updates"],
                ..Default::default()
            }),
            Arc::new(UpdatesCommand),
        )]
    }
}

struct UpdatesCommand;

#[async_trait]
impl CommandHandler for UpdatesCommand {
    async fn run(&self, ctx: &Context, msg: &Message, _args: &[String]) -> anyhow::Result<()> {
        let Some(state) = AppState::from_ctx(ctx).await else {
            return Ok(());
        };
        let Some(connection) = state.store.get(msg.author.id).await? else {
            msg.channel_id
                .send_message(
                    &ctx.http,
                    CreateMessage::new().embed(style::error_embed(
                        "Account not connected",
                        "You must connect your AniList account to use this command.",
                    )),
                )
                .await?;
            return Ok(());
        };
        let viewer = state.anilist.viewer(&connection.token).await.ok();
        let notifications = state
            .anilist
            .airing_notifications(&connection.token, 0)
            .await?;
        let embed = updates_embed(&notifications, viewer.as_ref(), Utc::now());
        msg.channel_id
            .send_message(&ctx.http, CreateMessage::new().embed(embed))
            .await?;
        Ok(())
    }
}

pub fn updates_embed(
    notifications: &[AiringNotification],
    viewer: Option<&Viewer>,
    now: DateTime<Utc>,
) -> CreateEmbed {
    let fields: Vec<(String, String, bool)> = notifications
        .iter()
        .filter_map(|notification| {
            let media = notification.media.as_ref()?;
            let aired = notification
                .created_at
                .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
                .map_or_else(|| "recently".to_string(), |date| time_ago(date, now));
            Some((
                display_title(&media.title, viewer),
                format!(
                    "Episode {} aired {aired}",
                    notification.episode.unwrap_or(0)
                ),
                false,
            ))
        })
        .collect();

    let mut embed = CreateEmbed::new()
        .title("Your anime updates")
        .color(style::COLOR_INFO);
    if fields.is_empty() {
        embed = embed.description("No recent updates for the anime you follow.");
    } else {
        embed = embed.fields(fields);
    }
    embed
}

/// "2 hours ago" style rendering of the span between two instants.
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = now.signed_duration_since(then);
    let seconds = delta.num_seconds().max(0);
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;
    let weeks = days / 7;
    let months = days / 30;

    let plural = |value: i64, label: &str| {
        if value == 1 {
            format!("{value} {label} ago")
        } else {
            format!("{value} {label}s ago")
        }
    };

    if months > 0 {
        plural(months, "month")
    } else if weeks > 0 {
        plural(weeks, "week")
    } else if days > 0 {
        plural(days, "day")
    } else if hours > 0 {
        plural(hours, "hour")
    } else if minutes > 0 {
        plural(minutes, "minute")
    } else {
        plural(seconds, "second")
    }
}
