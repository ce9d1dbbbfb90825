//! Gateway event handler: feeds inbound messages to reply collectors and
//! the command dispatcher, and reaction events to the page navigators.

use serenity::async_trait;
use serenity::builder::CreateMessage;
use serenity::model::channel::{Message, Reaction};
use serenity::model::gateway::Ready;
use serenity::prelude::{Context, EventHandler};
use tracing::{error, info};

use crate::model::AppState;
use crate::ui::style;
use crate::ui::ReplyMessage;

pub struct Handler;

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(user = %ready.user.name, "logged in");
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }
        let Some(state) = AppState::from_ctx(&ctx).await else {
            return;
        };

        // Reply collectors see every message, prefixed or not.
        state
            .router
            .offer_message(&ReplyMessage::from(&msg))
            .await;

        let Some((name, args)) =
            crate::commands::registry::parse_invocation(&state.config.command_prefix, &msg.content)
        else {
            return;
        };
        // Unknown names are deliberately ignored: arbitrary prefixed chatter
        // must not produce error noise.
        let Some(command) = state.registry.resolve(name) else {
            return;
        };
        let handler = command.handler.clone();
        let name = command.info.name;
        if let Err(e) = handler.run(&ctx, &msg, &args).await {
            error!(command = name, error = ?e, "command failed");
            msg.channel_id
                .send_message(
                    &ctx.http,
                    CreateMessage::new().embed(style::error_embed(
                        "Something went wrong",
                        "An error occurred while running that command.",
                    )),
                )
                .await
                .ok();
        }
    }

    async fn reaction_add(&self, ctx: Context, reaction: Reaction) {
        route_reaction(&ctx, &reaction).await;
    }

    // Removing a paging reaction navigates too, so users can page by
    // toggling the same control.
    async fn reaction_remove(&self, ctx: Context, reaction: Reaction) {
        route_reaction(&ctx, &reaction).await;
    }
}

async fn route_reaction(ctx: &Context, reaction: &Reaction) {
    let Some(user_id) = reaction.user_id else {
        return;
    };
    if user_id == ctx.cache.current_user().id {
        return;
    }
    let Some(state) = AppState::from_ctx(ctx).await else {
        return;
    };
    state
        .router
        .dispatch_reaction(reaction.message_id, user_id, &reaction.emoji)
        .await;
}
