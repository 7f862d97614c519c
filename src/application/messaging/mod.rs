//! Messaging - Prefix resolution, parsing, commands and dispatch

pub mod command;
pub mod cooldown;
pub mod dispatcher;
pub mod parser;
pub mod prefix;

pub use command::{Command, CommandContext, CommandHandler, CommandRegistry, CommandResult};
pub use cooldown::CooldownTracker;
pub use dispatcher::{CommandDispatcher, Dispatch};
pub use parser::MessageParser;
pub use prefix::{PrefixMatcher, PrefixResolver};
