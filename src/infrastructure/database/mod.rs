//! SQLite storage implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use crate::application::errors::StorageError;
use crate::domain::entities::{Guild, User};
use crate::domain::traits::Store;

/// Store backed by a single SQLite connection
///
/// Queries run on tokio's blocking pool so the runtime threads never wait on disk.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self, StorageError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                time_zone TEXT NOT NULL,
                locale TEXT NOT NULL,
                added_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS guilds (
                id INTEGER PRIMARY KEY,
                locale TEXT NOT NULL,
                added_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS prefixes (
                guild_id INTEGER NOT NULL,
                prefix TEXT NOT NULL COLLATE NOCASE,
                UNIQUE (guild_id, prefix)
            );
            CREATE INDEX IF NOT EXISTS idx_prefixes_guild ON prefixes(guild_id);",
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&mut Connection) -> Result<T, StorageError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().unwrap_or_else(PoisonError::into_inner);
            f(&mut conn)
        })
        .await
        .map_err(|e| StorageError::Task(e.to_string()))?
    }
}

fn parse_time(raw: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StorageError::Serialization(format!("bad timestamp '{}': {}", raw, e)))
}

type UserRow = (i64, String, String, String);
type GuildRow = (i64, String, String);

fn user_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn guild_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<GuildRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
}

fn into_user((id, time_zone, locale, added_at): UserRow) -> Result<User, StorageError> {
    Ok(User {
        id,
        time_zone,
        locale,
        added_at: parse_time(&added_at)?,
    })
}

fn into_guild((id, locale, added_at): GuildRow) -> Result<Guild, StorageError> {
    Ok(Guild {
        id,
        locale,
        added_at: parse_time(&added_at)?,
    })
}

fn select_user(conn: &Connection, id: i64) -> Result<Option<User>, StorageError> {
    conn.query_row(
        "SELECT id, time_zone, locale, added_at FROM users WHERE id = ?1",
        [id],
        user_row,
    )
    .optional()?
    .map(into_user)
    .transpose()
}

fn select_guild(conn: &Connection, id: i64) -> Result<Option<Guild>, StorageError> {
    conn.query_row("SELECT id, locale, added_at FROM guilds WHERE id = ?1", [id], guild_row)
        .optional()?
        .map(into_guild)
        .transpose()
}

#[async_trait]
impl Store for SqliteStore {
    async fn fetch_user(&self, id: i64) -> Result<Option<User>, StorageError> {
        self.with_conn(move |conn| select_user(conn, id)).await
    }

    async fn upsert_user(&self, id: i64, time_zone: &str, locale: &str) -> Result<User, StorageError> {
        let time_zone = time_zone.to_string();
        let locale = locale.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO users (id, time_zone, locale, added_at) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET time_zone = excluded.time_zone, locale = excluded.locale",
                params![id, time_zone, locale, Utc::now().to_rfc3339()],
            )?;
            select_user(conn, id)?
                .ok_or_else(|| StorageError::Database(format!("user {} missing after upsert", id)))
        })
        .await
    }

    async fn insert_many_users(&self, users: &[User]) -> Result<Vec<i64>, StorageError> {
        let users = users.to_vec();
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            let mut inserted = Vec::new();
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO users (id, time_zone, locale, added_at) VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT(id) DO NOTHING",
                )?;
                for user in &users {
                    let added_at = user.added_at.to_rfc3339();
                    if stmt.execute(params![user.id, user.time_zone, user.locale, added_at])? > 0 {
                        inserted.push(user.id);
                    }
                }
            }
            tx.commit()?;
            Ok(inserted)
        })
        .await
    }

    async fn fetch_all_users(&self) -> Result<Vec<User>, StorageError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id, time_zone, locale, added_at FROM users ORDER BY id")?;
            let rows = stmt.query_map([], user_row)?;

            let mut users = Vec::new();
            for row in rows {
                users.push(into_user(row?)?);
            }
            Ok(users)
        })
        .await
    }

    async fn fetch_guild(&self, id: i64) -> Result<Option<Guild>, StorageError> {
        self.with_conn(move |conn| select_guild(conn, id)).await
    }

    async fn upsert_guild(&self, id: i64, locale: &str) -> Result<Guild, StorageError> {
        let locale = locale.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO guilds (id, locale, added_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET locale = excluded.locale",
                params![id, locale, Utc::now().to_rfc3339()],
            )?;
            select_guild(conn, id)?
                .ok_or_else(|| StorageError::Database(format!("guild {} missing after upsert", id)))
        })
        .await
    }

    async fn insert_many_guilds(&self, guilds: &[Guild]) -> Result<Vec<i64>, StorageError> {
        let guilds = guilds.to_vec();
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            let mut inserted = Vec::new();
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO guilds (id, locale, added_at) VALUES (?1, ?2, ?3)
                     ON CONFLICT(id) DO NOTHING",
                )?;
                for guild in &guilds {
                    if stmt.execute(params![guild.id, guild.locale, guild.added_at.to_rfc3339()])? > 0 {
                        inserted.push(guild.id);
                    }
                }
            }
            tx.commit()?;
            Ok(inserted)
        })
        .await
    }

    async fn fetch_all_guilds(&self) -> Result<Vec<Guild>, StorageError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id, locale, added_at FROM guilds ORDER BY id")?;
            let rows = stmt.query_map([], guild_row)?;

            let mut guilds = Vec::new();
            for row in rows {
                guilds.push(into_guild(row?)?);
            }
            Ok(guilds)
        })
        .await
    }

    async fn fetch_prefixes(&self, guild_id: i64) -> Result<Vec<String>, StorageError> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare("SELECT prefix FROM prefixes WHERE guild_id = ?1 ORDER BY rowid")?;
            let rows = stmt.query_map([guild_id], |row| row.get(0))?;
            Ok(rows.collect::<Result<Vec<String>, _>>()?)
        })
        .await
    }

    async fn add_prefix(&self, guild_id: i64, prefix: &str) -> Result<bool, StorageError> {
        let prefix = prefix.to_string();
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            if stored_prefix(&tx, guild_id, &prefix)?.is_some() {
                return Ok(false);
            }
            tx.execute(
                "INSERT INTO prefixes (guild_id, prefix) VALUES (?1, ?2)",
                params![guild_id, prefix],
            )?;
            tx.commit()?;
            Ok(true)
        })
        .await
    }

    async fn remove_prefix(&self, guild_id: i64, prefix: &str) -> Result<bool, StorageError> {
        let prefix = prefix.to_string();
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            let Some(stored) = stored_prefix(&tx, guild_id, &prefix)? else {
                return Ok(false);
            };
            tx.execute(
                "DELETE FROM prefixes WHERE guild_id = ?1 AND prefix = ?2",
                params![guild_id, stored],
            )?;
            tx.commit()?;
            Ok(true)
        })
        .await
    }
}

/// The registered spelling of `prefix`, compared with Unicode case folding.
///
/// SQLite's NOCASE collation only folds ASCII, so the comparison happens here.
fn stored_prefix(conn: &Connection, guild_id: i64, prefix: &str) -> Result<Option<String>, StorageError> {
    let wanted = prefix.to_lowercase();
    let mut stmt = conn.prepare("SELECT prefix FROM prefixes WHERE guild_id = ?1")?;
    let rows = stmt.query_map([guild_id], |row| row.get::<_, String>(0))?;
    for row in rows {
        let stored = row?;
        if stored.to_lowercase() == wanted {
            return Ok(Some(stored));
        }
    }
    Ok(None)
}
