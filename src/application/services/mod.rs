//! Application services - Built-in commands and the settings-update path

pub mod command_service;
pub mod settings_service;

pub use command_service::register_defaults;
pub use settings_service::{is_valid_time_zone, SettingsService};
