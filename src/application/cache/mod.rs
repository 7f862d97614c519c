//! Session-scoped entity cache with fetch-through to the store
//!
//! One async mutex guards the whole map and stays held across the store round
//! trip on a miss, so concurrent misses for the same id issue a single write.
//! Tokio's mutex is fair: queued callers resume in arrival order.
//!
//! Entries are never evicted. The population is bounded by the users and
//! guilds the bot actually sees during one process lifetime.

mod entity;

pub use entity::CachedEntity;

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::application::errors::StorageError;
use crate::domain::entities::{Guild, User};
use crate::domain::traits::Store;

pub type UserCache = EntityCache<User>;
pub type GuildCache = EntityCache<Guild>;

pub struct EntityCache<E: CachedEntity> {
    store: Arc<dyn Store>,
    entries: Mutex<HashMap<i64, E>>,
}

impl<E: CachedEntity> EntityCache<E> {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Cached entity, or the stored row, or a freshly created default row.
    ///
    /// Store failures propagate and leave the cache untouched.
    pub async fn get_or_fetch(&self, id: i64) -> Result<E, StorageError> {
        let mut entries = self.entries.lock().await;
        if let Some(entity) = entries.get(&id) {
            return Ok(entity.clone());
        }

        let entity = E::fetch_or_create(self.store.as_ref(), id).await?;
        tracing::debug!(id, kind = E::KIND, "cache hydrated");
        entries.insert(id, entity.clone());
        Ok(entity)
    }

    /// Cached entity only; never touches the store.
    pub async fn get(&self, id: i64) -> Option<E> {
        self.entries.lock().await.get(&id).cloned()
    }

    /// Overwrite the cache entry. The caller must already have persisted `entity`.
    pub async fn set(&self, entity: E) {
        self.entries.lock().await.insert(entity.id(), entity);
    }

    /// Register entities that should not exist yet and seed the cache with them.
    ///
    /// Rows the store already had are skipped there and left out of the cache,
    /// so a later [`get_or_fetch`](Self::get_or_fetch) reads the persisted values.
    pub async fn insert_many(&self, entities: Vec<E>) -> Result<usize, StorageError> {
        let mut entries = self.entries.lock().await;
        let inserted = E::insert_many(self.store.as_ref(), &entities).await?;

        let mut seeded = 0;
        for entity in entities {
            if inserted.contains(&entity.id()) {
                entries.insert(entity.id(), entity);
                seeded += 1;
            }
        }
        Ok(seeded)
    }

    /// Seed the cache with every persisted row, keeping entries already cached.
    pub async fn warm(&self) -> Result<usize, StorageError> {
        let mut entries = self.entries.lock().await;
        let rows = E::fetch_all(self.store.as_ref()).await?;

        let mut seeded = 0;
        for row in rows {
            if let std::collections::hash_map::Entry::Vacant(slot) = entries.entry(row.id()) {
                slot.insert(row);
                seeded += 1;
            }
        }
        tracing::info!(kind = E::KIND, seeded, "cache warmed");
        Ok(seeded)
    }

    pub async fn entries(&self) -> Vec<E> {
        self.entries.lock().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::MemoryStore;
    use std::time::Duration;

    fn slow_store() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::new().with_latency(Duration::from_millis(50)))
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_misses_upsert_once() {
        let store = slow_store();
        let cache = Arc::new(UserCache::new(store.clone()));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move { cache.get_or_fetch(77).await })
            })
            .collect();

        let mut users = Vec::new();
        for task in tasks {
            users.push(task.await.unwrap().unwrap());
        }

        assert_eq!(store.stats().user_upserts, 1);
        assert!(users.windows(2).all(|pair| pair[0] == pair[1]));
    }

    #[tokio::test]
    async fn test_fetch_through_prefers_existing_row() {
        let store = Arc::new(MemoryStore::new());
        store.upsert_user(5, "Asia/Tokyo", "es_ES").await.unwrap();
        let cache = UserCache::new(store.clone());

        let user = cache.get_or_fetch(5).await.unwrap();
        assert_eq!(user.locale, "es_ES");
        assert_eq!(user.time_zone, "Asia/Tokyo");
        assert_eq!(store.stats().user_upserts, 1);
    }

    #[tokio::test]
    async fn test_miss_creates_default_row() {
        let store = Arc::new(MemoryStore::new());
        let cache = UserCache::new(store.clone());

        let user = cache.get_or_fetch(5).await.unwrap();
        assert_eq!(user.locale, "en_US");
        assert_eq!(user.time_zone, "UTC");
        assert_eq!(store.fetch_user(5).await.unwrap(), Some(user));
    }

    #[tokio::test]
    async fn test_set_then_get_skips_store() {
        let store = Arc::new(MemoryStore::new());
        let cache = UserCache::new(store.clone());

        let user = User::new(3).with_locale("es_ES");
        cache.set(user.clone()).await;

        assert_eq!(cache.get(3).await, Some(user));
        assert_eq!(store.stats(), Default::default());
    }

    #[tokio::test]
    async fn test_get_never_fetches() {
        let store = Arc::new(MemoryStore::new());
        store.upsert_guild(1, "es_ES").await.unwrap();
        let cache = GuildCache::new(store.clone());

        assert_eq!(cache.get(1).await, None);
        assert_eq!(store.stats().guild_fetches, 0);
    }

    #[tokio::test]
    async fn test_insert_many_seeds_without_fetching() {
        let store = Arc::new(MemoryStore::new());
        let cache = UserCache::new(store.clone());

        let users: Vec<User> = (1..=5).map(User::new).collect();
        assert_eq!(cache.insert_many(users).await.unwrap(), 5);

        for id in 1..=5 {
            assert!(cache.get(id).await.is_some());
        }
        let stats = store.stats();
        assert_eq!(stats.user_fetches, 0);
        assert_eq!(stats.user_upserts, 0);
    }

    #[tokio::test]
    async fn test_insert_many_leaves_conflicting_rows_uncached() {
        let store = Arc::new(MemoryStore::new());
        store.upsert_user(1, "UTC", "es_ES").await.unwrap();
        let cache = UserCache::new(store.clone());

        let seeded = cache.insert_many(vec![User::new(1), User::new(2)]).await.unwrap();

        assert_eq!(seeded, 1);
        assert_eq!(cache.get(1).await, None);
        assert_eq!(cache.get_or_fetch(1).await.unwrap().locale, "es_ES");
    }

    #[tokio::test]
    async fn test_store_failure_leaves_no_entry() {
        let store = Arc::new(MemoryStore::new());
        let cache = UserCache::new(store.clone());

        store.set_offline(true);
        assert!(cache.get_or_fetch(9).await.is_err());
        assert!(cache.is_empty().await);

        store.set_offline(false);
        assert!(cache.get_or_fetch(9).await.is_ok());
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_warm_keeps_fresher_entries() {
        let store = Arc::new(MemoryStore::new());
        store.upsert_guild(1, "en_US").await.unwrap();
        store.upsert_guild(2, "en_US").await.unwrap();
        let cache = GuildCache::new(store.clone());
        cache.set(Guild::new(1).with_locale("es_ES")).await;

        assert_eq!(cache.warm().await.unwrap(), 1);
        assert_eq!(cache.get(1).await.unwrap().locale, "es_ES");
        assert_eq!(cache.len().await, 2);
    }
}
