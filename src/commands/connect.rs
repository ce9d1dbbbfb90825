//! The `connect` command: a direct-message conversation that exchanges an
//! AniList authorization code for a stored account connection.

use async_trait::async_trait;
use serenity::builder::CreateMessage;
use serenity::model::channel::Message;
use serenity::prelude::Context;
use tracing::debug;

use crate::model::AppState;
use crate::services::link::{complete_link, LinkOutcome};
use crate::ui::style;
use crate::ui::ReplyCollector;

use super::registry::CommandHandler;

pub struct ConnectCommand;

#[async_trait]
impl CommandHandler for ConnectCommand {
    async fn run(&self, ctx: &Context, msg: &Message, _args: &[String]) -> anyhow::Result<()> {
        let Some(state) = AppState::from_ctx(ctx).await else {
            return Ok(());
        };
        let auth_url = state.anilist.authorize_url();
        let instructions = format!(
            "Click [here]({auth_url}) to log into your AniList account. \
             Send me your authentication code once you have given me access.\n\n\
             Do not share this code with anyone else."
        );

        // The sub-conversation lives in the invoker's DMs. If they cannot be
        // reached there, say so where the command was issued and stop.
        let dm = match msg.author.create_dm_channel(&ctx.http).await {
            Ok(dm) => dm,
            Err(e) => {
                debug!(target: "link", user = msg.author.id.get(), error = ?e, "could not open DM channel");
                msg.channel_id
                    .send_message(
                        &ctx.http,
                        CreateMessage::new().embed(style::error_embed(
                            "Connection failed",
                            "I had trouble direct messaging the instructions to connect \
                             your AniList account.",
                        )),
                    )
                    .await?;
                return Ok(());
            }
        };
        if dm
            .id
            .send_message(
                &ctx.http,
                CreateMessage::new().embed(style::info_embed(
                    "Connect your AniList account",
                    instructions,
                )),
            )
            .await
            .is_err()
        {
            msg.channel_id
                .send_message(
                    &ctx.http,
                    CreateMessage::new().embed(style::error_embed(
                        "Connection failed",
                        "I had trouble direct messaging the instructions to connect \
                         your AniList account.",
                    )),
                )
                .await?;
            return Ok(());
        }
        if msg.guild_id.is_some() {
            msg.channel_id
                .send_message(
                    &ctx.http,
                    CreateMessage::new().embed(style::info_embed(
                        "Connect your AniList account",
                        "Instructions for connecting your AniList account have been \
                         sent to your direct messages.",
                    )),
                )
                .await?;
        }

        // awaiting_code: one reply, bounded by the collector timeout.
        let collector =
            ReplyCollector::register(&state.router, dm.id, Some(msg.author.id)).await;
        let outcome = match collector.next_reply().await {
            Some(reply) => {
                let code = reply.content.split_whitespace().next().unwrap_or("");
                complete_link(&*state.anilist, &*state.store, msg.author.id, code).await
            }
            // Terminal and silent; the instructions stay visible in the DM.
            None => LinkOutcome::TimedOut,
        };
        debug!(target: "link", user = msg.author.id.get(), outcome = ?outcome, "link conversation finished");

        let response = match &outcome {
            LinkOutcome::Linked { account_name } => style::info_embed(
                "Account connected",
                format!("Connected to AniList account **{account_name}**."),
            ),
            LinkOutcome::InvalidCode => style::error_embed(
                "Invalid code",
                "The authentication code you have provided is invalid.",
            ),
            LinkOutcome::Failed => style::error_embed(
                "Connection failed",
                "I had trouble connecting to your AniList account.",
            ),
            LinkOutcome::TimedOut => return Ok(()),
        };
        dm.id
            .send_message(&ctx.http, CreateMessage::new().embed(response))
            .await?;
        Ok(())
    }
}
