use chrono::{DateTime, Utc};

/// Message content after prefix resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Command {
        prefix: String,
        name: String,
        args: Vec<String>,
    },
    Empty,
}

/// Represents an incoming message from the chat platform
#[derive(Debug, Clone)]
pub struct Message {
    pub id: String,
    pub channel_id: i64,
    /// `None` for direct messages
    pub guild_id: Option<i64>,
    pub author_id: i64,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(channel_id: i64, author_id: i64, text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            channel_id,
            guild_id: None,
            author_id,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn in_guild(mut self, guild_id: i64) -> Self {
        self.guild_id = Some(guild_id);
        self
    }
}
