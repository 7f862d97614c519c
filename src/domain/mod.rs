//! Domain layer - Core records and the seams infrastructure plugs into
//!
//! This layer contains:
//! - Entities: Cached records (User, Guild) and incoming messages
//! - Traits: Abstractions for infrastructure (Bot, Store)

pub mod entities;
pub mod traits;
