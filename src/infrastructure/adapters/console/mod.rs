//! Console adapter for development/testing

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};

use crate::application::errors::BotError;
use crate::domain::traits::{Bot, BotInfo, MessageId, Reply};

/// Id the console bot answers mentions to
pub const CONSOLE_BOT_ID: i64 = 1;

/// Console bot adapter for local development
pub struct ConsoleAdapter {
    info: BotInfo,
    visible: Mutex<HashSet<MessageId>>,
    input: tokio::sync::Mutex<Lines<BufReader<Stdin>>>,
}

impl ConsoleAdapter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            info: BotInfo {
                id: CONSOLE_BOT_ID,
                name: name.into(),
            },
            visible: Mutex::new(HashSet::new()),
            input: tokio::sync::Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }

    /// Next line from stdin, `None` at end of input.
    pub async fn read_line(&self, prompt: &str) -> Option<String> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(prompt.as_bytes()).await.ok()?;
        stdout.flush().await.ok()?;

        let mut input = self.input.lock().await;
        match input.next_line().await {
            Ok(line) => line.map(|l| l.trim().to_string()),
            Err(e) => {
                tracing::warn!("stdin closed: {}", e);
                None
            }
        }
    }

    /// Messages sent and not yet withdrawn
    pub fn visible(&self) -> usize {
        self.visible.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

fn render(reply: &Reply) -> String {
    match (&reply.title, reply.colour) {
        (Some(title), Some(colour)) => format!("[{} #{:06x}] {}", title, colour, reply.body),
        (Some(title), None) => format!("[{}] {}", title, reply.body),
        (None, _) => reply.body.clone(),
    }
}

#[async_trait]
impl Bot for ConsoleAdapter {
    async fn start(&self) -> Result<(), BotError> {
        tracing::info!("Starting console bot (dev mode)");
        Ok(())
    }

    async fn send_reply(&self, channel_id: i64, reply: &Reply) -> Result<MessageId, BotError> {
        let id = uuid::Uuid::new_v4().to_string();
        println!("[BOT #{}] {}", channel_id, render(reply));
        self.visible
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone());
        Ok(id)
    }

    async fn delete_message(&self, channel_id: i64, message_id: &str) -> Result<(), BotError> {
        let removed = self
            .visible
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(message_id);
        if !removed {
            return Err(BotError::Platform(format!("message {} not found", message_id)));
        }
        println!("[BOT #{}] (withdrawn {})", channel_id, message_id);
        Ok(())
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}
