//! In-memory storage implementation
//!
//! Backs dev mode and the test suite. Optional artificial latency and an
//! offline switch let callers exercise suspension points and store outages.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::application::errors::StorageError;
use crate::domain::entities::{Guild, User};
use crate::domain::traits::Store;

/// Call counters, useful for checking what reached the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub user_fetches: usize,
    pub user_upserts: usize,
    pub guild_fetches: usize,
    pub guild_upserts: usize,
    pub prefix_fetches: usize,
}

#[derive(Debug, Default)]
struct Counters {
    user_fetches: AtomicUsize,
    user_upserts: AtomicUsize,
    guild_fetches: AtomicUsize,
    guild_upserts: AtomicUsize,
    prefix_fetches: AtomicUsize,
}

/// Map-backed store
#[derive(Default)]
pub struct MemoryStore {
    users: Arc<RwLock<HashMap<i64, User>>>,
    guilds: Arc<RwLock<HashMap<i64, Guild>>>,
    prefixes: Arc<RwLock<HashMap<i64, Vec<String>>>>,
    latency: Option<Duration>,
    offline: AtomicBool,
    counters: Counters,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long inside every call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// While offline every call fails with a database error.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            user_fetches: self.counters.user_fetches.load(Ordering::SeqCst),
            user_upserts: self.counters.user_upserts.load(Ordering::SeqCst),
            guild_fetches: self.counters.guild_fetches.load(Ordering::SeqCst),
            guild_upserts: self.counters.guild_upserts.load(Ordering::SeqCst),
            prefix_fetches: self.counters.prefix_fetches.load(Ordering::SeqCst),
        }
    }

    async fn round_trip(&self, counter: Option<&AtomicUsize>) -> Result<(), StorageError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(StorageError::Database("store offline".to_string()));
        }
        if let Some(counter) = counter {
            counter.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn fetch_user(&self, id: i64) -> Result<Option<User>, StorageError> {
        self.round_trip(Some(&self.counters.user_fetches)).await?;
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn upsert_user(&self, id: i64, time_zone: &str, locale: &str) -> Result<User, StorageError> {
        self.round_trip(Some(&self.counters.user_upserts)).await?;
        let mut users = self.users.write().await;
        let user = users.entry(id).or_insert_with(|| User::new(id));
        user.time_zone = time_zone.to_string();
        user.locale = locale.to_string();
        Ok(user.clone())
    }

    async fn insert_many_users(&self, users: &[User]) -> Result<Vec<i64>, StorageError> {
        self.round_trip(None).await?;
        let mut stored = self.users.write().await;
        let mut inserted = Vec::new();
        for user in users {
            if !stored.contains_key(&user.id) {
                stored.insert(user.id, user.clone());
                inserted.push(user.id);
            }
        }
        Ok(inserted)
    }

    async fn fetch_all_users(&self) -> Result<Vec<User>, StorageError> {
        self.round_trip(None).await?;
        Ok(self.users.read().await.values().cloned().collect())
    }

    async fn fetch_guild(&self, id: i64) -> Result<Option<Guild>, StorageError> {
        self.round_trip(Some(&self.counters.guild_fetches)).await?;
        Ok(self.guilds.read().await.get(&id).cloned())
    }

    async fn upsert_guild(&self, id: i64, locale: &str) -> Result<Guild, StorageError> {
        self.round_trip(Some(&self.counters.guild_upserts)).await?;
        let mut guilds = self.guilds.write().await;
        let guild = guilds.entry(id).or_insert_with(|| Guild::new(id));
        guild.locale = locale.to_string();
        Ok(guild.clone())
    }

    async fn insert_many_guilds(&self, guilds: &[Guild]) -> Result<Vec<i64>, StorageError> {
        self.round_trip(None).await?;
        let mut stored = self.guilds.write().await;
        let mut inserted = Vec::new();
        for guild in guilds {
            if !stored.contains_key(&guild.id) {
                stored.insert(guild.id, guild.clone());
                inserted.push(guild.id);
            }
        }
        Ok(inserted)
    }

    async fn fetch_all_guilds(&self) -> Result<Vec<Guild>, StorageError> {
        self.round_trip(None).await?;
        Ok(self.guilds.read().await.values().cloned().collect())
    }

    async fn fetch_prefixes(&self, guild_id: i64) -> Result<Vec<String>, StorageError> {
        self.round_trip(Some(&self.counters.prefix_fetches)).await?;
        Ok(self.prefixes.read().await.get(&guild_id).cloned().unwrap_or_default())
    }

    async fn add_prefix(&self, guild_id: i64, prefix: &str) -> Result<bool, StorageError> {
        self.round_trip(None).await?;
        let mut prefixes = self.prefixes.write().await;
        let registered = prefixes.entry(guild_id).or_default();
        let wanted = prefix.to_lowercase();
        if registered.iter().any(|p| p.to_lowercase() == wanted) {
            return Ok(false);
        }
        registered.push(prefix.to_string());
        Ok(true)
    }

    async fn remove_prefix(&self, guild_id: i64, prefix: &str) -> Result<bool, StorageError> {
        self.round_trip(None).await?;
        let mut prefixes = self.prefixes.write().await;
        let Some(registered) = prefixes.get_mut(&guild_id) else {
            return Ok(false);
        };
        let wanted = prefix.to_lowercase();
        let before = registered.len();
        registered.retain(|p| p.to_lowercase() != wanted);
        Ok(registered.len() != before)
    }
}
