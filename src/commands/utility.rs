//! Utility commands: `ping`, `help` and `connect`.

use std::sync::Arc;

use async_trait::async_trait;
use serenity::model::channel::Message;
use serenity::prelude::Context;

use super::connect::ConnectCommand;
use super::help::HelpCommand;
use super::registry::{Command, CommandHandler, CommandInfo, HelpInfo, Module};

pub struct UtilityModule;

impl Module for UtilityModule {
    fn name(&self) -> &'static str {
        "utility"
    }

    fn commands(&self) -> Vec<Command> {
        vec![
            Command::new(
                CommandInfo::new("ping").help(HelpInfo {
                    short_desc: "Replies with pong!",
                    long_desc: Some("This command is implemented for developer testing."),
                    examples: &["ping"],
                    ..Default::default()
                }),
                Arc::new(PingCommand),
            ),
            Command::new(
                CommandInfo::new("help").help(HelpInfo {
                    short_desc: "Get a list of all commands or learn more about a \n\
                                 command.",
                    arguments: &[("command", "The command to learn more about (Optional).")],
                    examples: &["help", "help help"],
                    ..Default::default()
                }),
                Arc::new(HelpCommand),
            ),
            Command::new(
                CommandInfo::new("connect").help(HelpInfo {
                    short_desc: "Connects your AniList account.",
                    long_desc: Some(
                        "Connecting your account will allow you to use \n\
                         features that require verifying your account or reading \n\
                         your account data.",
                    ),
                    examples: &["connect"],
                    ..Default::default()
                }),
                Arc::new(ConnectCommand),
            ),
        ]
    }
}

struct PingCommand;

#[async_trait]
impl CommandHandler for PingCommand {
    async fn run(&self, ctx: &Context, msg: &Message, _args: &[String]) -> anyhow::Result<()> {
        msg.channel_id.say(&ctx.http, "pong!").await?;
        Ok(())
    }
}
