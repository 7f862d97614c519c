//! Message dispatcher - Routes messages to commands and renders their results

use std::sync::Arc;

use super::command::{Command, CommandContext, CommandRegistry};
use super::parser::MessageParser;
use crate::application::errors::{BotError, CommandError};
use crate::application::response::{ExpiryHandle, Outcome};
use crate::application::state::AppState;
use crate::domain::entities::{Content, Message};
use crate::domain::traits::{Bot, MessageId, Reply};

/// What happened to a message
#[derive(Debug)]
pub enum Dispatch {
    /// Not addressed to the bot
    Ignored,
    /// Prefixed, but no command has that name
    UnknownCommand(String),
    /// The handler's reply was sent as a plain message
    Replied(MessageId),
    /// The handler finished without replying
    Completed,
    /// An outcome was rendered and will withdraw itself
    Outcome(ExpiryHandle),
}

pub struct CommandDispatcher {
    state: Arc<AppState>,
    bot: Arc<dyn Bot>,
    parser: MessageParser,
    registry: CommandRegistry,
    bot_id: i64,
}

impl CommandDispatcher {
    pub fn new(state: Arc<AppState>, bot: Arc<dyn Bot>, registry: CommandRegistry) -> Self {
        let bot_id = bot.bot_info().id;
        Self {
            state,
            bot,
            parser: MessageParser::new(),
            registry,
            bot_id,
        }
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Process one incoming message.
    ///
    /// Outcomes raised by a command are rendered before this returns; any
    /// other failure is handed back to the caller.
    pub async fn dispatch(&self, message: &Message) -> Result<Dispatch, BotError> {
        if message.author_id == self.bot_id {
            return Ok(Dispatch::Ignored);
        }

        let prefix = self.state.prefixes.resolve(message.guild_id, &message.text).await?;
        let Content::Command { prefix, name, args } = self.parser.parse(&message.text, prefix) else {
            return Ok(Dispatch::Ignored);
        };

        let Some(command) = self.registry.find(&name) else {
            tracing::debug!(command = %name, "unknown command");
            return Ok(Dispatch::UnknownCommand(name));
        };

        let user = self.state.users.get_or_fetch(message.author_id).await?;
        let guild = match message.guild_id {
            Some(id) => Some(self.state.guilds.get_or_fetch(id).await?),
            None => None,
        };
        let locale = self.state.response_locale(&user, guild.as_ref());

        let ctx = CommandContext {
            state: &self.state,
            message,
            user,
            guild,
            locale,
            prefix,
            args,
        };

        tracing::info!(
            command = %command.name,
            user_id = message.author_id,
            guild_id = ?message.guild_id,
            "running command"
        );

        let result = match self.preconditions(command, &ctx) {
            Ok(()) => command.handler.run(&ctx).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(Some(text)) => {
                let id = self.bot.send_reply(message.channel_id, &Reply::text(text)).await?;
                Ok(Dispatch::Replied(id))
            }
            Ok(None) => Ok(Dispatch::Completed),
            Err(CommandError::Outcome(outcome)) => {
                let outcome = self.titled(outcome, &ctx.locale);
                let handle = self.render(message.channel_id, &outcome).await?;
                Ok(Dispatch::Outcome(handle))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Attach the reply title for `locale` unless the handler chose one.
    fn titled(&self, outcome: Outcome, locale: &str) -> Outcome {
        if outcome.title().is_some() {
            return outcome;
        }
        let key = outcome.severity().title_key();
        match self.state.translator.translate(&key, locale) {
            Ok(title) => outcome.with_title(title),
            Err(e) => {
                tracing::debug!(%key, locale, "using fallback title: {}", e);
                outcome
            }
        }
    }

    async fn render(&self, channel_id: i64, outcome: &Outcome) -> Result<ExpiryHandle, BotError> {
        self.state
            .responses
            .respond(Arc::clone(&self.bot), channel_id, outcome)
            .await
    }

    /// Owner, guild and cooldown checks, in that order.
    ///
    /// A use only counts against the cooldown once the other checks pass.
    fn preconditions(&self, command: &Command, ctx: &CommandContext<'_>) -> Result<(), CommandError> {
        if command.owner_only && !self.state.is_owner(ctx.user.id) {
            return Err(Outcome::cancelled(ctx.tr("errors.owner_only")?).into());
        }

        if command.guild_only && ctx.guild.is_none() {
            return Err(Outcome::neutral(ctx.tr("errors.guild_only")?).into());
        }

        if let Some(cooldown) = command.cooldown {
            if let Err(remaining) = self.state.cooldowns.check(ctx.user.id, &command.name, cooldown) {
                let seconds = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
                let seconds = seconds.to_string();
                let text = ctx.tr_with("errors.cooldown", &[("seconds", seconds.as_str())])?;
                return Err(Outcome::cooldown(text).into());
            }
        }

        Ok(())
    }
}
