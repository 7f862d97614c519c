//! Locale-keyed translation tables
//!
//! The resource is a JSON document whose top-level keys are locale tags
//! (`en_US`, `es_ES`, ...). Each locale maps to a nested object of strings,
//! addressed with dotted keys such as `user_commands.time.message`.

mod table;
mod translator;

pub use table::LocaleTable;
pub use translator::{read_table, Translator};

/// Substitute `{name}` placeholders in a translated template.
///
/// Unknown placeholders are left untouched.
pub fn fill(template: &str, args: &[(&str, &str)]) -> String {
    args.iter().fold(template.to_string(), |text, (name, value)| {
        text.replace(&format!("{{{}}}", name), value)
    })
}
