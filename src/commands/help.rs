//! The generated help listing and per-command help views.
//!
//! Help text may be written as indented multi-line literals at the
//! registration site; it is collapsed to single lines here, at render time.

use async_trait::async_trait;
use serenity::builder::{CreateEmbed, CreateMessage};
use serenity::model::channel::Message;
use serenity::prelude::Context;

use super::registry::{CommandHandler, CommandRegistry};
use crate::model::AppState;
use crate::ui::style;

/// Collapses newlines and repeated spaces into single spaces.
pub fn to_single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Overview: every registered command in registration order.
pub fn overview_embed(registry: &CommandRegistry, prefix: &str, bot_name: &str) -> CreateEmbed {
    let fields = registry.iter().map(|command| {
        let description = command
            .info
            .help
            .map(|help| to_single_line(help.short_desc))
            .unwrap_or_else(|| "No description".to_string());
        (
            format!("{prefix}{}", command.info.name),
            description,
            false,
        )
    });
    CreateEmbed::new()
        .title(format!("{bot_name} help"))
        .description("Here is the list of available commands:")
        .color(style::COLOR_INFO)
        .fields(fields)
}

/// Detail view for one command: aliases, usage, arguments and examples.
pub fn command_embed(registry: &CommandRegistry, prefix: &str, name: &str) -> CreateEmbed {
    let Some(command) = registry.resolve(name) else {
        return style::error_embed(
            "Command not found",
            format!("The command `{name}` does not exist."),
        );
    };

    let info = &command.info;
    let mut fields: Vec<(String, String, bool)> = Vec::new();
    let mut description = "No help information exists for this command.".to_string();

    if let Some(help) = &info.help {
        description = to_single_line(help.short_desc);
        if let Some(long_desc) = help.long_desc {
            description.push_str("\n\n");
            description.push_str(&to_single_line(long_desc));
        }
        if !info.aliases.is_empty() {
            fields.push((
                "Aliases".to_string(),
                info.aliases
                    .iter()
                    .map(|alias| format!("`{alias}`"))
                    .collect::<Vec<_>>()
                    .join(", "),
                false,
            ));
        }
        if !help.arguments.is_empty() {
            let usage = help
                .arguments
                .iter()
                .map(|(name, _)| format!("<{name}>"))
                .collect::<Vec<_>>()
                .join(" ");
            fields.push((
                "Usage".to_string(),
                format!("`{prefix}{} {usage}`", info.name),
                false,
            ));
            fields.push((
                "Arguments".to_string(),
                help.arguments
                    .iter()
                    .map(|(name, desc)| format!("**{name}**: {}", to_single_line(desc)))
                    .collect::<Vec<_>>()
                    .join("\n"),
                false,
            ));
        }
        if !help.examples.is_empty() {
            let label = if help.examples.len() > 1 {
                "Examples"
            } else {
                "Example"
            };
            fields.push((
                label.to_string(),
                help.examples
                    .iter()
                    .map(|example| format!("`{prefix}{example}`"))
                    .collect::<Vec<_>>()
                    .join(", "),
                false,
            ));
        }
    }

    CreateEmbed::new()
        .title(format!("{} command help", info.name))
        .description(description)
        .color(style::COLOR_INFO)
        .fields(fields)
}

pub struct HelpCommand;

#[async_trait]
impl CommandHandler for HelpCommand {
    async fn run(&self, ctx: &Context, msg: &Message, args: &[String]) -> anyhow::Result<()> {
        let Some(state) = AppState::from_ctx(ctx).await else {
            return Ok(());
        };
        let prefix = &state.config.command_prefix;
        let bot_name = ctx.cache.current_user().name.clone();
        let embed = match args.first() {
            Some(name) => command_embed(&state.registry, prefix, name),
            None => overview_embed(&state.registry, prefix, &bot_name),
        };
        msg.channel_id
            .send_message(&ctx.http, CreateMessage::new().embed(embed))
            .await?;
        Ok(())
    }
}
