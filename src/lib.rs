//! Runtime state and response layer for a localized chat bot

pub mod application;
pub mod domain;
pub mod infrastructure;
