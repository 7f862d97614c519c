//! Per-user command cooldowns

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// Remembers until when each user is held off each command
///
/// Entries whose cooldown has run out are dropped on the next check.
#[derive(Debug, Default)]
pub struct CooldownTracker {
    ready_at: Mutex<HashMap<(i64, String), Instant>>,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a use, or return how long the user still has to wait.
    pub fn check(&self, user_id: i64, command: &str, cooldown: Duration) -> Result<(), Duration> {
        let mut ready_at = self.ready_at.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        ready_at.retain(|_, until| *until > now);

        let key = (user_id, command.to_string());
        if let Some(until) = ready_at.get(&key) {
            return Err(until.duration_since(now));
        }

        if !cooldown.is_zero() {
            ready_at.insert(key, now + cooldown);
        }
        Ok(())
    }

    /// Entries still cooling down, as of the last check.
    pub fn len(&self) -> usize {
        self.ready_at.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
