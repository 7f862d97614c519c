use async_trait::async_trait;
use crate::application::errors::BotError;

/// Platform identifier of a sent message
pub type MessageId = String;

/// Bot trait - abstraction for messaging platform adapters
#[async_trait]
pub trait Bot: Send + Sync {
    /// Start the bot and begin listening for messages
    async fn start(&self) -> Result<(), BotError>;

    /// Send a reply to a channel, returning the id of the sent message
    async fn send_reply(&self, channel_id: i64, reply: &Reply) -> Result<MessageId, BotError>;

    /// Withdraw a previously sent message
    async fn delete_message(&self, channel_id: i64, message_id: &str) -> Result<(), BotError>;

    /// Get bot info
    fn bot_info(&self) -> BotInfo;
}

/// An outgoing message, optionally rendered as a coloured card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub title: Option<String>,
    pub body: String,
    /// Packed `0xRRGGBB` accent colour
    pub colour: Option<u32>,
}

impl Reply {
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            title: None,
            body: body.into(),
            colour: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_colour(mut self, colour: u32) -> Self {
        self.colour = Some(colour);
        self
    }
}

/// Bot information
#[derive(Debug, Clone)]
pub struct BotInfo {
    pub id: i64,
    pub name: String,
}
