//! Domain entities - Records cached at runtime and mirrored in the store

pub mod guild;
pub mod message;
pub mod user;

pub use guild::Guild;
pub use message::{Content, Message};
pub use user::User;

/// Locale assigned to users and guilds until they pick one.
pub const DEFAULT_LOCALE: &str = "en_US";

/// Time zone assigned to users until they pick one.
pub const DEFAULT_TIME_ZONE: &str = "UTC";
