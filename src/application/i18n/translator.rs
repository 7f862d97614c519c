use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use super::LocaleTable;
use crate::application::errors::TranslationError;

/// Resolves dotted keys against the current locale table
///
/// Readers take a snapshot of the table, so a concurrent [`Translator::reload`]
/// never exposes a half-swapped structure. A failed reload keeps the old table.
pub struct Translator {
    path: PathBuf,
    table: RwLock<Option<Arc<LocaleTable>>>,
}

impl Translator {
    /// A translator that has not loaded anything yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            table: RwLock::new(None),
        }
    }

    /// Read and parse `path`, failing if it is missing or malformed.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, TranslationError> {
        let translator = Self::new(path);
        translator.reload().await?;
        Ok(translator)
    }

    pub fn from_table(path: impl Into<PathBuf>, table: LocaleTable) -> Self {
        Self {
            path: path.into(),
            table: RwLock::new(Some(Arc::new(table))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the resource and swap it in. Returns the number of locales loaded.
    pub async fn reload(&self) -> Result<usize, TranslationError> {
        let table = read_table(&self.path).await?;
        let count = table.locales().count();

        *self.table.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(table));
        tracing::info!(path = %self.path.display(), locales = count, "translations loaded");
        Ok(count)
    }

    pub fn translate(&self, key: &str, locale: &str) -> Result<String, TranslationError> {
        let table = self.snapshot().ok_or(TranslationError::NotLoaded)?;
        table.lookup(key, locale).map(str::to_string)
    }

    pub fn is_supported_locale(&self, locale: &str) -> bool {
        self.snapshot()
            .map(|table| table.contains_locale(locale))
            .unwrap_or(false)
    }

    pub fn is_loaded(&self) -> bool {
        self.snapshot().is_some()
    }

    pub fn locales(&self) -> Vec<String> {
        let mut locales: Vec<String> = self
            .snapshot()
            .map(|table| table.locales().map(str::to_string).collect())
            .unwrap_or_default();
        locales.sort();
        locales
    }

    fn snapshot(&self) -> Option<Arc<LocaleTable>> {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Read a locale table from disk without touching any translator.
pub async fn read_table(path: &Path) -> Result<LocaleTable, TranslationError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => TranslationError::NotFound {
            path: path.to_path_buf(),
        },
        _ => TranslationError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    LocaleTable::parse(path, &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: &str = r#"{
        "en_US": { "user_commands": { "time": { "message": "It is {time}" } } },
        "es_ES": { "user_commands": { "time": { "message": "Son las {time}" } } }
    }"#;

    fn temp_file(contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("yuzu-i18n-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[tokio::test]
    async fn test_translate_leaf() {
        let path = temp_file(GOOD);
        let translator = Translator::load(&path).await.unwrap();

        assert_eq!(
            translator.translate("user_commands.time.message", "en_US").unwrap(),
            "It is {time}"
        );
        assert_eq!(
            translator.translate("user_commands.time.message", "es_ES").unwrap(),
            "Son las {time}"
        );
        assert!(translator.is_supported_locale("es_ES"));
        assert!(!translator.is_supported_locale("de_DE"));
        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let path = std::env::temp_dir().join(format!("yuzu-missing-{}.json", uuid::Uuid::new_v4()));
        let err = Translator::load(&path).await.err().unwrap();
        assert!(matches!(err, TranslationError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_malformed_file_is_malformed() {
        let path = temp_file("{ \"en_US\": ");
        let err = Translator::load(&path).await.err().unwrap();
        assert!(matches!(err, TranslationError::Malformed { .. }));
        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_previous_table() {
        let path = temp_file(GOOD);
        let translator = Translator::load(&path).await.unwrap();

        std::fs::write(&path, "this is not json").unwrap();
        let err = translator.reload().await.unwrap_err();
        assert!(matches!(err, TranslationError::Malformed { .. }));

        assert_eq!(
            translator.translate("user_commands.time.message", "en_US").unwrap(),
            "It is {time}"
        );
        assert_eq!(translator.locales(), vec!["en_US", "es_ES"]);
        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn test_reload_picks_up_new_strings() {
        let path = temp_file(GOOD);
        let translator = Translator::load(&path).await.unwrap();

        std::fs::write(&path, r#"{ "en_US": { "ping": "pong" } }"#).unwrap();
        assert_eq!(translator.reload().await.unwrap(), 1);

        assert_eq!(translator.translate("ping", "en_US").unwrap(), "pong");
        assert!(!translator.is_supported_locale("es_ES"));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_unloaded_translator() {
        let translator = Translator::new("nowhere.json");
        assert!(!translator.is_loaded());
        assert!(matches!(
            translator.translate("a", "en_US"),
            Err(TranslationError::NotLoaded)
        ));
        assert!(!translator.is_supported_locale("en_US"));
    }
}
