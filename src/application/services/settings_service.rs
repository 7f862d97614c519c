//! The settings-update path
//!
//! Every change is written to the store first and the returned row is then
//! placed in the cache, so cached entities always equal persisted ones.
//! Prefix changes drop the guild's matcher before returning.

use chrono_tz::Tz;

use crate::application::errors::SettingsError;
use crate::application::state::AppState;
use crate::domain::entities::{Guild, User};

pub struct SettingsService<'a> {
    state: &'a AppState,
}

impl<'a> SettingsService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    pub async fn set_user_locale(&self, user_id: i64, locale: &str) -> Result<User, SettingsError> {
        if !self.state.translator.is_supported_locale(locale) {
            return Err(SettingsError::UnsupportedLocale(locale.to_string()));
        }

        let current = self.state.users.get_or_fetch(user_id).await?;
        let user = self
            .state
            .store
            .upsert_user(user_id, &current.time_zone, locale)
            .await?;
        self.state.users.set(user.clone()).await;
        tracing::info!(user_id, locale, "user locale updated");
        Ok(user)
    }

    pub async fn set_user_timezone(&self, user_id: i64, time_zone: &str) -> Result<User, SettingsError> {
        if !is_valid_time_zone(time_zone) {
            return Err(SettingsError::InvalidTimeZone(time_zone.to_string()));
        }

        let current = self.state.users.get_or_fetch(user_id).await?;
        let user = self
            .state
            .store
            .upsert_user(user_id, time_zone, &current.locale)
            .await?;
        self.state.users.set(user.clone()).await;
        tracing::info!(user_id, time_zone, "user time zone updated");
        Ok(user)
    }

    pub async fn set_guild_locale(&self, guild_id: i64, locale: &str) -> Result<Guild, SettingsError> {
        if !self.state.translator.is_supported_locale(locale) {
            return Err(SettingsError::UnsupportedLocale(locale.to_string()));
        }

        let guild = self.state.store.upsert_guild(guild_id, locale).await?;
        self.state.guilds.set(guild.clone()).await;
        tracing::info!(guild_id, locale, "guild locale updated");
        Ok(guild)
    }

    pub async fn guild_prefixes(&self, guild_id: i64) -> Result<Vec<String>, SettingsError> {
        Ok(self.state.store.fetch_prefixes(guild_id).await?)
    }

    pub async fn add_guild_prefix(&self, guild_id: i64, prefix: &str) -> Result<(), SettingsError> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Err(SettingsError::EmptyPrefix);
        }

        if !self.state.store.add_prefix(guild_id, prefix).await? {
            return Err(SettingsError::DuplicatePrefix(prefix.to_string()));
        }
        self.state.prefixes.invalidate(guild_id).await;
        tracing::info!(guild_id, prefix, "prefix added");
        Ok(())
    }

    pub async fn remove_guild_prefix(&self, guild_id: i64, prefix: &str) -> Result<(), SettingsError> {
        let prefix = prefix.trim();
        if !self.state.store.remove_prefix(guild_id, prefix).await? {
            return Err(SettingsError::UnknownPrefix(prefix.to_string()));
        }
        self.state.prefixes.invalidate(guild_id).await;
        tracing::info!(guild_id, prefix, "prefix removed");
        Ok(())
    }
}

/// Whether `name` is a zone in the IANA time zone database, e.g. `Europe/Oslo`.
pub fn is_valid_time_zone(name: &str) -> bool {
    name.parse::<Tz>().is_ok()
}
