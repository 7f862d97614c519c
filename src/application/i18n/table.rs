use serde_json::{Map, Value};
use std::path::Path;

use crate::application::errors::TranslationError;

/// A parsed translation document: locale tag -> nested string tree
#[derive(Debug, Clone, PartialEq)]
pub struct LocaleTable {
    locales: Map<String, Value>,
}

impl LocaleTable {
    /// Parse a UTF-8 JSON document.
    ///
    /// The root must be an object and every locale entry must itself be an object.
    pub fn parse(path: &Path, bytes: &[u8]) -> Result<Self, TranslationError> {
        let malformed = |reason: String| TranslationError::Malformed {
            path: path.to_path_buf(),
            reason,
        };

        let root: Value = serde_json::from_slice(bytes).map_err(|e| malformed(e.to_string()))?;
        let Value::Object(locales) = root else {
            return Err(malformed("root is not an object".to_string()));
        };

        if let Some((locale, _)) = locales.iter().find(|(_, tree)| !tree.is_object()) {
            return Err(malformed(format!("locale '{}' is not an object", locale)));
        }

        Ok(Self { locales })
    }

    pub fn contains_locale(&self, locale: &str) -> bool {
        self.locales.contains_key(locale)
    }

    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.locales.keys().map(String::as_str)
    }

    /// Walk `key` segment by segment under `locale`.
    pub fn lookup(&self, key: &str, locale: &str) -> Result<&str, TranslationError> {
        let mut node = self
            .locales
            .get(locale)
            .ok_or_else(|| TranslationError::UnsupportedLocale(locale.to_string()))?;

        for segment in key.split('.') {
            node = node
                .get(segment)
                .ok_or_else(|| TranslationError::MissingKey {
                    key: key.to_string(),
                    segment: segment.to_string(),
                })?;
        }

        node.as_str()
            .ok_or_else(|| TranslationError::NotALeaf(key.to_string()))
    }
}
