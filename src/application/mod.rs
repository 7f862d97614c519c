//! Application layer - Runtime state and the response path
//!
//! This layer contains:
//! - Cache: write-through entity caches over the store
//! - I18n: the locale table and translator
//! - Messaging: prefix resolution, parsing, commands and dispatch
//! - Response: outcomes and their time-boxed replies
//! - Services: built-in commands and settings updates
//! - Errors: layer errors

pub mod cache;
pub mod errors;
pub mod i18n;
pub mod messaging;
pub mod response;
pub mod services;
pub mod state;
