//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Database: SQLite persistence
//! - Storage: In-memory persistence
//! - Adapters: Platform integrations

pub mod adapters;
pub mod config;
pub mod database;
pub mod storage;
