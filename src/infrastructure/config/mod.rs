//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::application::errors::ConfigError;
use crate::application::response::Palette;
use crate::application::state::RuntimeOptions;
use crate::domain::entities::DEFAULT_LOCALE;

/// Bot configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub bot: BotConfig,
    pub database: DatabaseConfig,
    pub locales: LocalesConfig,
    pub responses: ResponsesConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BotConfig {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Prefix used in direct messages
    pub default_prefix: String,
    /// Bot user id, answered to as `<@id>`
    pub mention_id: i64,
    pub owner_ids: Vec<i64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct LocalesConfig {
    pub path: PathBuf,
    pub default_locale: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ResponsesConfig {
    /// How long outcome replies stay up
    pub expiry_seconds: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub palette: Option<Palette>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "yuzu-bot".to_string(),
            token: None,
            default_prefix: "y".to_string(),
            mention_id: 0,
            owner_ids: Vec::new(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/yuzu.db"),
        }
    }
}

impl Default for LocalesConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("locales/translations.json"),
            default_locale: DEFAULT_LOCALE.to_string(),
        }
    }
}

impl Default for ResponsesConfig {
    fn default() -> Self {
        Self {
            expiry_seconds: 5,
            palette: None,
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))
    }

    /// Defaults overlaid with environment variables
    pub fn load_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();
        config.apply_env()?;
        Ok(config)
    }

    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_vars(|name| std::env::var(name).ok())
    }

    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(token) = var("BOT_TOKEN") {
            self.bot.token = Some(token);
        }

        if let Some(prefix) = var("BOT_PREFIX") {
            self.bot.default_prefix = prefix;
        }

        if let Some(path) = var("BOT_DATABASE") {
            self.database.path = PathBuf::from(path);
        }

        if let Some(path) = var("BOT_LOCALES") {
            self.locales.path = PathBuf::from(path);
        }

        if let Some(ids) = var("BOT_OWNER_IDS") {
            self.bot.owner_ids = ids
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(|id| {
                    id.parse::<i64>()
                        .map_err(|_| ConfigError::InvalidValue(format!("BOT_OWNER_IDS: '{}' is not an id", id)))
                })
                .collect::<Result<_, _>>()?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot.default_prefix.trim().is_empty() {
            return Err(ConfigError::InvalidValue("bot.default-prefix must not be empty".to_string()));
        }
        if self.responses.expiry_seconds == 0 {
            return Err(ConfigError::InvalidValue("responses.expiry-seconds must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn expiry(&self) -> Duration {
        Duration::from_secs(self.responses.expiry_seconds)
    }

    /// `mention_id` is used when the config does not name one.
    pub fn runtime_options(&self, mention_id: i64) -> RuntimeOptions {
        RuntimeOptions {
            default_prefix: self.bot.default_prefix.clone(),
            mention_id: if self.bot.mention_id != 0 { self.bot.mention_id } else { mention_id },
            default_locale: self.locales.default_locale.clone(),
            owner_ids: self.bot.owner_ids.clone(),
            expiry: self.expiry(),
            palette: self.responses.palette,
        }
    }
}
