//! Immutable command registry built once at startup.
//!
//! Modules contribute commands; the registry indexes them by name and alias
//! with first-registered-wins collision handling across modules. Dispatch
//! parsing follows the bot's prefix convention: case-sensitive command
//! token, lower-cased positional arguments.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::bail;
use async_trait::async_trait;
use serenity::model::channel::Message;
use serenity::prelude::Context;

/// Help metadata attached to a command at registration. Multi-line strings
/// are fine here; the help renderer collapses them for display.
#[derive(Debug, Clone, Copy, Default)]
pub struct HelpInfo {
    pub short_desc: &'static str,
    pub long_desc: Option<&'static str>,
    /// Named argument descriptions in usage order.
    pub arguments: &'static [(&'static str, &'static str)],
    pub examples: &'static [&'static str],
}

#[derive(Debug, Clone, Copy)]
pub struct CommandInfo {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub help: Option<HelpInfo>,
}

impl CommandInfo {
    pub fn new(name: &'static str) -> Self {
        CommandInfo {
            name,
            aliases: &[],
            help: None,
        }
    }

    pub fn aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn help(mut self, help: HelpInfo) -> Self {
        self.help = Some(help);
        self
    }
}

#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn run(&self, ctx: &Context, msg: &Message, args: &[String]) -> anyhow::Result<()>;
}

/// Immutable pairing of command metadata and its handler. The primary name
/// and every alias resolve to the same handler instance.
#[derive(Clone)]
pub struct Command {
    pub info: CommandInfo,
    pub handler: Arc<dyn CommandHandler>,
}

impl Command {
    pub fn new(info: CommandInfo, handler: Arc<dyn CommandHandler>) -> Self {
        Command { info, handler }
    }
}

/// A group of related commands registered together.
pub trait Module: Send + Sync {
    fn name(&self) -> &'static str;
    fn commands(&self) -> Vec<Command>;
}

#[derive(Default)]
pub struct CommandRegistry {
    commands: Vec<Command>,
    index: HashMap<&'static str, usize>,
}

impl CommandRegistry {
    pub fn register(&mut self, command: Command) -> anyhow::Result<()> {
        if command.info.name.is_empty() {
            bail!("command name must not be empty");
        }
        let idx = self.commands.len();
        let name = command.info.name;
        let aliases = command.info.aliases;
        self.commands.push(command);
        for key in std::iter::once(name).chain(aliases.iter().copied()) {
            // First registration wins on collision.
            self.index.entry(key).or_insert(idx);
        }
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Option<&Command> {
        self.index.get(name).map(|&idx| &self.commands[idx])
    }

    /// Commands in registration order; drives the generated help listing.
    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Aggregates modules into one registry at startup.
#[derive(Default)]
pub struct ModuleContainer {
    modules: Vec<Box<dyn Module>>,
}

impl ModuleContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, module: impl Module + 'static) -> Self {
        self.modules.push(Box::new(module));
        self
    }

    pub fn into_registry(self) -> anyhow::Result<CommandRegistry> {
        let mut registry = CommandRegistry::default();
        for module in &self.modules {
            for command in module.commands() {
                registry.register(command)?;
            }
        }
        Ok(registry)
    }
}

/// Splits a prefixed message into the command token and its lower-cased
/// arguments. `None` when the prefix is absent or nothing follows it.
pub fn parse_invocation<'a>(prefix: &str, content: &'a str) -> Option<(&'a str, Vec<String>)> {
    let body = content.strip_prefix(prefix)?;
    let mut tokens = body.split_whitespace();
    let name = tokens.next()?;
    let args = tokens.map(str::to_lowercase).collect();
    Some((name, args))
}
