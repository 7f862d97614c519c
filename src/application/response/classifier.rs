use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::{Colour, Outcome, Palette};
use crate::application::errors::BotError;
use crate::domain::traits::{Bot, MessageId, Reply};

/// How long an outcome reply stays visible
pub const DEFAULT_EXPIRY: Duration = Duration::from_secs(5);

/// Turns outcomes into coloured, self-withdrawing replies
#[derive(Debug, Clone)]
pub struct ResponseClassifier {
    palette: Palette,
    expiry: Duration,
}

impl ResponseClassifier {
    /// `None` selects [`Palette::friday`].
    pub fn new(palette: Option<Palette>, expiry: Duration) -> Self {
        Self {
            palette: palette.unwrap_or_default(),
            expiry,
        }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    pub fn classify(&self, outcome: &Outcome) -> Colour {
        self.palette.colour(outcome.severity())
    }

    /// The outcome's own title wins; otherwise `Command Exception: <Severity>`.
    pub fn render(&self, outcome: &Outcome) -> Reply {
        let title = match outcome.title() {
            Some(title) => title.to_string(),
            None => format!("Command Exception: {}", outcome.severity().label()),
        };
        Reply::text(outcome.message())
            .with_title(title)
            .with_colour(self.classify(outcome).packed())
    }

    /// Send the rendered outcome and schedule its withdrawal.
    ///
    /// The withdrawal runs on its own task, so it happens whether or not the
    /// caller awaits the returned handle. A failed delete is only logged.
    pub async fn respond(
        &self,
        bot: Arc<dyn Bot>,
        channel_id: i64,
        outcome: &Outcome,
    ) -> Result<ExpiryHandle, BotError> {
        let reply = self.render(outcome);
        let message_id = bot.send_reply(channel_id, &reply).await?;
        let deadline = Instant::now() + self.expiry;

        let task = {
            let message_id = message_id.clone();
            tokio::spawn(async move {
                tokio::time::sleep_until(deadline).await;
                if let Err(e) = bot.delete_message(channel_id, &message_id).await {
                    tracing::debug!(channel_id, %message_id, "reply already gone: {}", e);
                }
            })
        };

        Ok(ExpiryHandle { message_id, task })
    }
}

impl Default for ResponseClassifier {
    fn default() -> Self {
        Self::new(None, DEFAULT_EXPIRY)
    }
}

/// Tracks a sent outcome reply until it is withdrawn
#[derive(Debug)]
pub struct ExpiryHandle {
    message_id: MessageId,
    task: JoinHandle<()>,
}

impl ExpiryHandle {
    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    pub fn is_expired(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait until the reply has been withdrawn.
    pub async fn expired(self) {
        if let Err(e) = self.task.await {
            tracing::warn!(message_id = %self.message_id, "expiry task failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::response::Severity;
    use crate::domain::traits::BotInfo;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingBot {
        sent: Mutex<Vec<(i64, Reply)>>,
        deleted: Mutex<Vec<(i64, String)>>,
        fail_deletes: bool,
    }

    #[async_trait]
    impl Bot for RecordingBot {
        async fn start(&self) -> Result<(), BotError> {
            Ok(())
        }

        async fn send_reply(&self, channel_id: i64, reply: &Reply) -> Result<MessageId, BotError> {
            let mut sent = self.sent.lock().unwrap();
            sent.push((channel_id, reply.clone()));
            Ok(format!("msg-{}", sent.len()))
        }

        async fn delete_message(&self, channel_id: i64, message_id: &str) -> Result<(), BotError> {
            if self.fail_deletes {
                return Err(BotError::Platform("Unknown Message".to_string()));
            }
            self.deleted.lock().unwrap().push((channel_id, message_id.to_string()));
            Ok(())
        }

        fn bot_info(&self) -> BotInfo {
            BotInfo { id: 1, name: "test".to_string() }
        }
    }

    #[test]
    fn test_render_uses_palette_entry() {
        let classifier = ResponseClassifier::default();
        let reply = classifier.render(&Outcome::cooldown("Try again in 3s"));

        assert_eq!(reply.body, "Try again in 3s");
        assert_eq!(reply.title.as_deref(), Some("Command Exception: Pending"));
        assert_eq!(reply.colour, Some(Palette::friday().pending.packed()));
    }

    #[test]
    fn test_outcome_title_replaces_fallback() {
        let classifier = ResponseClassifier::default();
        let outcome = Outcome::cooldown("Espera 3s").with_title("Excepción: Pendiente");
        let reply = classifier.render(&outcome);

        assert_eq!(reply.title.as_deref(), Some("Excepción: Pendiente"));
        assert_eq!(reply.colour, Some(Palette::friday().pending.packed()));
    }

    #[test]
    fn test_custom_palette_overrides_default() {
        let mut palette = Palette::friday();
        palette.success = Colour::new(0, 255, 0);
        let classifier = ResponseClassifier::new(Some(palette), DEFAULT_EXPIRY);

        assert_eq!(classifier.classify(&Outcome::success("ok")), Colour::new(0, 255, 0));
        assert_eq!(classifier.classify(&Outcome::neutral("ok")), Palette::friday().neutral);
    }

    #[test]
    fn test_every_severity_has_a_colour() {
        let classifier = ResponseClassifier::default();
        for severity in Severity::ALL {
            let reply = classifier.render(&Outcome::from_severity(severity, "x"));
            assert!(reply.colour.is_some());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cooldown_reply_is_withdrawn_after_delay() {
        let bot = Arc::new(RecordingBot::default());
        let classifier = ResponseClassifier::default();

        let handle = classifier
            .respond(bot.clone(), 42, &Outcome::cooldown("Try again in 3s"))
            .await
            .unwrap();

        {
            let sent = bot.sent.lock().unwrap();
            assert_eq!(sent.len(), 1);
            assert_eq!(sent[0].1.colour, Some(0xff847c));
        }

        tokio::time::advance(Duration::from_secs(4)).await;
        tokio::task::yield_now().await;
        assert!(bot.deleted.lock().unwrap().is_empty());
        assert!(!handle.is_expired());

        tokio::time::advance(Duration::from_secs(1)).await;
        let message_id = handle.message_id().to_string();
        handle.expired().await;

        assert_eq!(*bot.deleted.lock().unwrap(), vec![(42, message_id)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_withdrawal_does_not_depend_on_caller() {
        let bot = Arc::new(RecordingBot::default());
        let classifier = ResponseClassifier::new(None, Duration::from_secs(2));

        let handle = classifier.respond(bot.clone(), 1, &Outcome::success("saved")).await.unwrap();
        drop(handle);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(bot.deleted.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_withdrawal_is_swallowed() {
        let bot = Arc::new(RecordingBot {
            fail_deletes: true,
            ..Default::default()
        });
        let classifier = ResponseClassifier::default();

        let handle = classifier.respond(bot.clone(), 1, &Outcome::neutral("hi")).await.unwrap();
        handle.expired().await;

        assert_eq!(bot.sent.lock().unwrap().len(), 1);
        assert!(bot.deleted.lock().unwrap().is_empty());
    }
}
