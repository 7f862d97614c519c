//! Process-wide runtime state, built once at startup and shared by handle

use std::sync::Arc;
use std::time::Duration;

use crate::application::cache::{GuildCache, UserCache};
use crate::application::errors::{PrefixError, StorageError};
use crate::application::i18n::Translator;
use crate::application::messaging::cooldown::CooldownTracker;
use crate::application::messaging::prefix::PrefixResolver;
use crate::application::response::{Palette, ResponseClassifier, DEFAULT_EXPIRY};
use crate::domain::entities::{Guild, User, DEFAULT_LOCALE};
use crate::domain::traits::Store;

/// Settings the runtime needs from configuration
#[derive(Debug, Clone)]
pub struct RuntimeOptions {
    /// Prefix used in direct messages
    pub default_prefix: String,
    /// Bot user id, for mention prefixes
    pub mention_id: i64,
    pub default_locale: String,
    pub owner_ids: Vec<i64>,
    pub expiry: Duration,
    pub palette: Option<Palette>,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            default_prefix: "y".to_string(),
            mention_id: 0,
            default_locale: DEFAULT_LOCALE.to_string(),
            owner_ids: Vec::new(),
            expiry: DEFAULT_EXPIRY,
            palette: None,
        }
    }
}

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub users: UserCache,
    pub guilds: GuildCache,
    pub prefixes: PrefixResolver,
    pub translator: Translator,
    pub responses: ResponseClassifier,
    pub cooldowns: CooldownTracker,
    pub default_locale: String,
    pub owner_ids: Vec<i64>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        translator: Translator,
        options: RuntimeOptions,
    ) -> Result<Self, PrefixError> {
        let prefixes = PrefixResolver::new(Arc::clone(&store), &options.default_prefix, options.mention_id)?;

        Ok(Self {
            users: UserCache::new(Arc::clone(&store)),
            guilds: GuildCache::new(Arc::clone(&store)),
            prefixes,
            translator,
            responses: ResponseClassifier::new(options.palette, options.expiry),
            cooldowns: CooldownTracker::new(),
            default_locale: options.default_locale,
            owner_ids: options.owner_ids,
            store,
        })
    }

    /// Load every persisted user and guild into the caches.
    pub async fn warm_caches(&self) -> Result<(usize, usize), StorageError> {
        let users = self.users.warm().await?;
        let guilds = self.guilds.warm().await?;
        Ok((users, guilds))
    }

    /// Record a guild the bot just joined and bulk-register its members.
    ///
    /// The guild row is written and cached; a guild seen before keeps its
    /// locale. Members go through one bulk insert, so none of them costs a
    /// fetch later. Returns the guild and how many members were new.
    pub async fn register_guild(&self, guild_id: i64, member_ids: &[i64]) -> Result<(Guild, usize), StorageError> {
        let known = match self.guilds.get(guild_id).await {
            Some(guild) => Some(guild),
            None => self.store.fetch_guild(guild_id).await?,
        };
        let locale = known.map_or_else(|| self.default_locale.clone(), |g| g.locale);

        let guild = self.store.upsert_guild(guild_id, &locale).await?;
        self.guilds.set(guild.clone()).await;

        let members = member_ids.iter().map(|&id| User::new(id)).collect();
        let added = self.users.insert_many(members).await?;
        tracing::info!(guild_id, members = member_ids.len(), added, "joined guild");
        Ok((guild, added))
    }

    pub fn is_owner(&self, user_id: i64) -> bool {
        self.owner_ids.contains(&user_id)
    }

    /// The user's locale, else the guild's, else the configured default.
    ///
    /// Locales the translator does not know are skipped.
    pub fn response_locale(&self, user: &User, guild: Option<&Guild>) -> String {
        [Some(user.locale.as_str()), guild.map(|g| g.locale.as_str())]
            .into_iter()
            .flatten()
            .find(|locale| self.translator.is_supported_locale(locale))
            .unwrap_or(self.default_locale.as_str())
            .to_string()
    }
}
