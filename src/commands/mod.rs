pub mod connect;
pub mod help;
pub mod list;
pub mod registry;
pub mod search;
pub mod updates;
pub mod utility;

use serenity::model::channel::{Channel, Message};
use serenity::prelude::Context;

use self::registry::{CommandRegistry, ModuleContainer};

/// Builds the full command registry from every module, in the order their
/// commands appear in the generated help.
pub fn build_registry() -> anyhow::Result<CommandRegistry> {
    ModuleContainer::new()
        .add(utility::UtilityModule)
        .add(search::SearchModule)
        .add(list::ListModule)
        .add(updates::UpdatesModule)
        .into_registry()
}

/// Whether the message's channel is flagged for adult content. DM channels
/// carry no such flag, so they never qualify.
pub(crate) async fn channel_allows_adult(ctx: &Context, msg: &Message) -> bool {
    match msg.channel(ctx).await {
        Ok(Channel::Guild(channel)) => channel.nsfw,
        _ => false,
    }
}
