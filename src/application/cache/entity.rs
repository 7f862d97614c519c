use async_trait::async_trait;

use crate::application::errors::StorageError;
use crate::domain::entities::{Guild, User, DEFAULT_LOCALE, DEFAULT_TIME_ZONE};
use crate::domain::traits::Store;

/// A record the [`EntityCache`](super::EntityCache) can hydrate from the store
#[async_trait]
pub trait CachedEntity: Clone + Send + Sync + 'static {
    /// Short name used in log fields.
    const KIND: &'static str;

    fn id(&self) -> i64;

    /// Read the row, creating it with default values if it does not exist.
    async fn fetch_or_create(store: &dyn Store, id: i64) -> Result<Self, StorageError>;

    /// Insert rows skipping conflicts; returns the ids written.
    async fn insert_many(store: &dyn Store, entities: &[Self]) -> Result<Vec<i64>, StorageError>;

    async fn fetch_all(store: &dyn Store) -> Result<Vec<Self>, StorageError>;
}

#[async_trait]
impl CachedEntity for User {
    const KIND: &'static str = "user";

    fn id(&self) -> i64 {
        self.id
    }

    async fn fetch_or_create(store: &dyn Store, id: i64) -> Result<Self, StorageError> {
        match store.fetch_user(id).await? {
            Some(user) => Ok(user),
            None => store.upsert_user(id, DEFAULT_TIME_ZONE, DEFAULT_LOCALE).await,
        }
    }

    async fn insert_many(store: &dyn Store, entities: &[Self]) -> Result<Vec<i64>, StorageError> {
        store.insert_many_users(entities).await
    }

    async fn fetch_all(store: &dyn Store) -> Result<Vec<Self>, StorageError> {
        store.fetch_all_users().await
    }
}

#[async_trait]
impl CachedEntity for Guild {
    const KIND: &'static str = "guild";

    fn id(&self) -> i64 {
        self.id
    }

    async fn fetch_or_create(store: &dyn Store, id: i64) -> Result<Self, StorageError> {
        match store.fetch_guild(id).await? {
            Some(guild) => Ok(guild),
            None => store.upsert_guild(id, DEFAULT_LOCALE).await,
        }
    }

    async fn insert_many(store: &dyn Store, entities: &[Self]) -> Result<Vec<i64>, StorageError> {
        store.insert_many_guilds(entities).await
    }

    async fn fetch_all(store: &dyn Store) -> Result<Vec<Self>, StorageError> {
        store.fetch_all_guilds().await
    }
}
