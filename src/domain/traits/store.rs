use async_trait::async_trait;
use crate::application::errors::StorageError;
use crate::domain::entities::{Guild, User};

/// Store trait - abstraction for data persistence
///
/// Absence is reported as `Ok(None)`; `Err` is reserved for I/O and query failures.
#[async_trait]
pub trait Store: Send + Sync {
    // User operations
    async fn fetch_user(&self, id: i64) -> Result<Option<User>, StorageError>;
    async fn upsert_user(&self, id: i64, time_zone: &str, locale: &str) -> Result<User, StorageError>;
    /// Inserts rows that do not exist yet and returns the ids actually written.
    async fn insert_many_users(&self, users: &[User]) -> Result<Vec<i64>, StorageError>;
    async fn fetch_all_users(&self) -> Result<Vec<User>, StorageError>;

    // Guild operations
    async fn fetch_guild(&self, id: i64) -> Result<Option<Guild>, StorageError>;
    async fn upsert_guild(&self, id: i64, locale: &str) -> Result<Guild, StorageError>;
    async fn insert_many_guilds(&self, guilds: &[Guild]) -> Result<Vec<i64>, StorageError>;
    async fn fetch_all_guilds(&self) -> Result<Vec<Guild>, StorageError>;

    // Prefix operations
    /// Prefixes in registration order.
    async fn fetch_prefixes(&self, guild_id: i64) -> Result<Vec<String>, StorageError>;
    /// Returns `false` when the prefix is already registered (ignoring case).
    async fn add_prefix(&self, guild_id: i64, prefix: &str) -> Result<bool, StorageError>;
    /// Returns `false` when no such prefix was registered.
    async fn remove_prefix(&self, guild_id: i64, prefix: &str) -> Result<bool, StorageError>;
}
