//! Built-in commands

use async_trait::async_trait;
use std::time::Duration;

use crate::application::errors::{CommandError, SettingsError};
use crate::application::i18n;
use crate::application::messaging::command::{
    Command, CommandContext, CommandHandler, CommandRegistry, CommandResult,
};
use crate::application::response::Outcome;

/// Register every built-in command, then `help` listing them.
pub fn register_defaults(registry: &mut CommandRegistry) {
    registry.register(
        Command::new("ping", Ping)
            .with_description("Check that the bot is alive")
            .with_cooldown(Duration::from_secs(3)),
    );

    registry.register(
        Command::new("settings", ShowSettings)
            .with_description("Show your language and time zone")
            .with_aliases(&["userset"]),
    );

    registry.register(
        Command::new("locale", SetLocale)
            .with_description("Set your language")
            .with_aliases(&["lang", "language"])
            .with_usage("locale <code>"),
    );

    registry.register(
        Command::new("timezone", SetTimeZone)
            .with_description("Set your time zone")
            .with_aliases(&["tz"])
            .with_usage("timezone <Area/City>"),
    );

    registry.register(
        Command::new("prefix", Prefix)
            .with_description("List or change this server's prefixes")
            .with_usage("prefix <list|add|remove> [prefix]")
            .guild_only(),
    );

    registry.register(
        Command::new("serverlocale", SetGuildLocale)
            .with_description("Set this server's fallback language")
            .with_aliases(&["glocale"])
            .with_usage("serverlocale <code>")
            .guild_only()
            .owner_only(),
    );

    registry.register(
        Command::new("reload", Reload)
            .with_description("Reload translations")
            .owner_only(),
    );

    let mut lines: Vec<String> = registry
        .all()
        .map(|cmd| format!("{} - {}", cmd.name, cmd.description.as_deref().unwrap_or("")))
        .collect();
    lines.push("help - Show this message".to_string());
    lines.sort();

    registry.register(
        Command::new("help", Help(format!("Available commands:\n{}", lines.join("\n"))))
            .with_description("Show this message"),
    );
}

struct Help(String);

#[async_trait]
impl CommandHandler for Help {
    async fn run(&self, _ctx: &CommandContext<'_>) -> CommandResult {
        Ok(Some(self.0.clone()))
    }
}

struct Ping;

#[async_trait]
impl CommandHandler for Ping {
    async fn run(&self, ctx: &CommandContext<'_>) -> CommandResult {
        Ok(Some(ctx.tr("user_commands.ping.message")?))
    }
}

struct ShowSettings;

#[async_trait]
impl CommandHandler for ShowSettings {
    async fn run(&self, ctx: &CommandContext<'_>) -> CommandResult {
        let text = ctx.tr_with(
            "user_commands.userset.show",
            &[("locale", ctx.user.locale.as_str()), ("time_zone", ctx.user.time_zone.as_str())],
        )?;
        Ok(Some(text))
    }
}

const LANGUAGE: &str = "user_commands.userset.subcommands.language";
const TIME_ZONE: &str = "user_commands.userset.subcommands.timezone";

fn supported_locales(ctx: &CommandContext<'_>) -> String {
    ctx.state.translator.locales().join(", ")
}

fn locale_usage(ctx: &CommandContext<'_>, command: &str) -> Result<CommandError, CommandError> {
    let locales = supported_locales(ctx);
    let text = ctx.tr_with(
        &format!("{}.usage", LANGUAGE),
        &[("prefix", ctx.prefix.as_str()), ("command", command), ("locales", locales.as_str())],
    )?;
    Ok(Outcome::neutral(text).into())
}

/// Turn a rejected settings change into a translated outcome.
///
/// Storage failures are not routine and propagate unchanged.
fn rejected(ctx: &CommandContext<'_>, err: SettingsError) -> CommandError {
    let translated = match err {
        SettingsError::UnsupportedLocale(locale) => ctx.tr_with(
            &format!("{}.fail", LANGUAGE),
            &[("locale", locale.as_str()), ("locales", supported_locales(ctx).as_str())],
        ),
        SettingsError::InvalidTimeZone(zone) => {
            ctx.tr_with(&format!("{}.fail", TIME_ZONE), &[("time_zone", zone.as_str())])
        }
        SettingsError::EmptyPrefix => ctx.tr("settings.prefix.empty"),
        SettingsError::DuplicatePrefix(prefix) => {
            ctx.tr_with("settings.prefix.duplicate", &[("prefix", prefix.as_str())])
        }
        SettingsError::UnknownPrefix(prefix) => {
            ctx.tr_with("settings.prefix.unknown", &[("prefix", prefix.as_str())])
        }
        SettingsError::Storage(e) => return SettingsError::Storage(e).into(),
    };

    match translated {
        Ok(text) => Outcome::error(text).into(),
        Err(e) => e,
    }
}

struct SetLocale;

#[async_trait]
impl CommandHandler for SetLocale {
    async fn run(&self, ctx: &CommandContext<'_>) -> CommandResult {
        let Some(locale) = ctx.arg(0) else {
            return Err(locale_usage(ctx, "locale")?);
        };

        let user = ctx
            .settings()
            .set_user_locale(ctx.user.id, locale)
            .await
            .map_err(|e| rejected(ctx, e))?;

        // Confirm in the language just chosen
        let translator = &ctx.state.translator;
        let text = translator.translate(&format!("{}.success", LANGUAGE), &user.locale)?;
        let mut outcome = Outcome::success(i18n::fill(&text, &[("locale", user.locale.as_str())]));
        if let Ok(title) = translator.translate(&outcome.severity().title_key(), &user.locale) {
            outcome = outcome.with_title(title);
        }
        Err(outcome.into())
    }
}

struct SetTimeZone;

#[async_trait]
impl CommandHandler for SetTimeZone {
    async fn run(&self, ctx: &CommandContext<'_>) -> CommandResult {
        let Some(zone) = ctx.arg(0) else {
            let text = ctx.tr_with(
                &format!("{}.usage", TIME_ZONE),
                &[("prefix", ctx.prefix.as_str()), ("time_zone", ctx.user.time_zone.as_str())],
            )?;
            return Err(Outcome::neutral(text).into());
        };

        let user = ctx
            .settings()
            .set_user_timezone(ctx.user.id, zone)
            .await
            .map_err(|e| rejected(ctx, e))?;

        let text = ctx.tr_with(&format!("{}.success", TIME_ZONE), &[("time_zone", user.time_zone.as_str())])?;
        Err(Outcome::success(text).into())
    }
}

struct Prefix;

#[async_trait]
impl CommandHandler for Prefix {
    async fn run(&self, ctx: &CommandContext<'_>) -> CommandResult {
        let Some(guild) = &ctx.guild else {
            return Err(Outcome::neutral(ctx.tr("errors.guild_only")?).into());
        };
        let settings = ctx.settings();

        match (ctx.arg(0), ctx.arg(1)) {
            (Some("list") | None, _) => {
                let prefixes = settings
                    .guild_prefixes(guild.id)
                    .await
                    .map_err(|e| rejected(ctx, e))?;
                if prefixes.is_empty() {
                    return Ok(Some(ctx.tr("settings.prefix.list_empty")?));
                }
                let list = prefixes
                    .iter()
                    .map(|p| format!("`{}`", p))
                    .collect::<Vec<_>>()
                    .join(", ");
                Ok(Some(ctx.tr_with("settings.prefix.list", &[("prefixes", list.as_str())])?))
            }
            (Some("add"), Some(prefix)) => {
                settings
                    .add_guild_prefix(guild.id, prefix)
                    .await
                    .map_err(|e| rejected(ctx, e))?;
                Err(Outcome::success(ctx.tr_with("settings.prefix.added", &[("prefix", prefix)])?).into())
            }
            (Some("remove"), Some(prefix)) => {
                settings
                    .remove_guild_prefix(guild.id, prefix)
                    .await
                    .map_err(|e| rejected(ctx, e))?;
                Err(Outcome::success(ctx.tr_with("settings.prefix.removed", &[("prefix", prefix)])?).into())
            }
            _ => {
                let text = ctx.tr_with("settings.prefix.usage", &[("prefix", ctx.prefix.as_str())])?;
                Err(Outcome::neutral(text).into())
            }
        }
    }
}

struct SetGuildLocale;

#[async_trait]
impl CommandHandler for SetGuildLocale {
    async fn run(&self, ctx: &CommandContext<'_>) -> CommandResult {
        let Some(guild) = &ctx.guild else {
            return Err(Outcome::neutral(ctx.tr("errors.guild_only")?).into());
        };
        let Some(locale) = ctx.arg(0) else {
            return Err(locale_usage(ctx, "serverlocale")?);
        };

        let guild = ctx
            .settings()
            .set_guild_locale(guild.id, locale)
            .await
            .map_err(|e| rejected(ctx, e))?;

        let text = ctx.tr_with("settings.locale.success", &[("locale", guild.locale.as_str())])?;
        Err(Outcome::success(text).into())
    }
}

struct Reload;

#[async_trait]
impl CommandHandler for Reload {
    async fn run(&self, ctx: &CommandContext<'_>) -> CommandResult {
        match ctx.state.translator.reload().await {
            Ok(count) => {
                let count = count.to_string();
                let text = ctx.tr_with("owner.reload.success", &[("count", count.as_str())])?;
                Err(Outcome::success(text).into())
            }
            Err(e) => {
                let reason = e.to_string();
                let text = ctx.tr_with("owner.reload.fail", &[("reason", reason.as_str())])?;
                Err(Outcome::error(text).into())
            }
        }
    }
}
