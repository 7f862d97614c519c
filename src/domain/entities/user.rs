use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{DEFAULT_LOCALE, DEFAULT_TIME_ZONE};

/// A chat user known to the bot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub time_zone: String,
    pub locale: String,
    pub added_at: DateTime<Utc>,
}

impl User {
    /// A user row with default settings, as created on first contact.
    pub fn new(id: i64) -> Self {
        Self {
            id,
            time_zone: DEFAULT_TIME_ZONE.to_string(),
            locale: DEFAULT_LOCALE.to_string(),
            added_at: Utc::now(),
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user {} ({}, {})", self.id, self.locale, self.time_zone)
    }
}
