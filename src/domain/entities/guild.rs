use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::DEFAULT_LOCALE;

/// A guild (server) the bot has joined
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guild {
    pub id: i64,
    pub locale: String,
    pub added_at: DateTime<Utc>,
}

impl Guild {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            locale: DEFAULT_LOCALE.to_string(),
            added_at: Utc::now(),
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }
}

impl fmt::Display for Guild {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "guild {} ({})", self.id, self.locale)
    }
}
