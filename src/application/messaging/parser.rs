//! Message parser - Splits prefixed text into a command name and arguments

use crate::domain::entities::Content;

/// Parses message text once its prefix is known
#[derive(Debug, Clone, Default)]
pub struct MessageParser;

impl MessageParser {
    pub fn new() -> Self {
        Self
    }

    /// `prefix` must be the slice the resolver matched at the start of `text`.
    pub fn parse(&self, text: &str, prefix: Option<&str>) -> Content {
        let Some(prefix) = prefix else {
            return if text.trim().is_empty() {
                Content::Empty
            } else {
                Content::Text(text.to_string())
            };
        };

        let rest = text.get(prefix.len()..).unwrap_or_default();
        let mut parts = rest.split_whitespace();
        let Some(name) = parts.next() else {
            return Content::Empty;
        };

        Content::Command {
            prefix: prefix.to_string(),
            name: name.to_lowercase(),
            args: parts.map(str::to_string).collect(),
        }
    }
}
