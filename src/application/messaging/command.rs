//! Commands, their registry, and the context handlers run with

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::application::errors::CommandError;
use crate::application::i18n;
use crate::application::services::SettingsService;
use crate::application::state::AppState;
use crate::domain::entities::{Guild, Message, User};

/// `Ok(Some(text))` is sent as a plain reply; raise an `Outcome` for anything time-boxed.
pub type CommandResult = Result<Option<String>, CommandError>;

#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn run(&self, ctx: &CommandContext<'_>) -> CommandResult;
}

/// Everything a handler may read while it runs
pub struct CommandContext<'a> {
    pub state: &'a AppState,
    pub message: &'a Message,
    pub user: User,
    pub guild: Option<Guild>,
    /// Locale replies should be written in
    pub locale: String,
    /// Prefix the message was invoked with
    pub prefix: String,
    pub args: Vec<String>,
}

impl<'a> CommandContext<'a> {
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// Translate `key` into the response locale.
    pub fn tr(&self, key: &str) -> Result<String, CommandError> {
        Ok(self.state.translator.translate(key, &self.locale)?)
    }

    /// Translate `key` and fill its `{placeholders}`.
    pub fn tr_with(&self, key: &str, args: &[(&str, &str)]) -> Result<String, CommandError> {
        Ok(i18n::fill(&self.tr(key)?, args))
    }

    pub fn settings(&self) -> SettingsService<'a> {
        SettingsService::new(self.state)
    }
}

/// Represents a bot command
pub struct Command {
    pub name: String,
    pub description: Option<String>,
    pub aliases: Vec<String>,
    pub usage: Option<String>,
    pub owner_only: bool,
    pub guild_only: bool,
    pub cooldown: Option<Duration>,
    pub handler: Arc<dyn CommandHandler>,
}

impl Command {
    pub fn new(name: impl Into<String>, handler: impl CommandHandler + 'static) -> Self {
        Self {
            name: name.into(),
            description: None,
            aliases: Vec::new(),
            usage: None,
            owner_only: false,
            guild_only: false,
            cooldown: None,
            handler: Arc::new(handler),
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = Some(cooldown);
        self
    }

    pub fn owner_only(mut self) -> Self {
        self.owner_only = true;
        self
    }

    pub fn guild_only(mut self) -> Self {
        self.guild_only = true;
        self
    }

    pub fn matches(&self, input: &str) -> bool {
        let input_lower = input.to_lowercase();
        self.name.to_lowercase() == input_lower
            || self.aliases.iter().any(|a| a.to_lowercase() == input_lower)
    }
}

/// Command registry for managing available commands
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Command>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, command: Command) {
        self.commands.insert(command.name.clone(), command);
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    /// Find by name or alias, ignoring case.
    pub fn find(&self, input: &str) -> Option<&Command> {
        self.commands
            .get(input)
            .or_else(|| self.commands.values().find(|c| c.matches(input)))
    }

    pub fn all(&self) -> impl Iterator<Item = &Command> {
        self.commands.values()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
