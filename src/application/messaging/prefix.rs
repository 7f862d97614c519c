//! Per-guild command prefix matching

use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::application::errors::PrefixError;
use crate::domain::traits::Store;

/// A compiled, anchored, case-insensitive alternation of prefixes
///
/// Case folding is Unicode-aware, matching how the stores compare prefixes.
///
/// Longer prefixes are tried first so `"y"` never shadows `"yu"`; equal-length
/// prefixes keep registration order. A mention of the bot always matches last.
#[derive(Debug, Clone)]
pub struct PrefixMatcher {
    pattern: Regex,
    prefixes: Vec<String>,
}

impl PrefixMatcher {
    pub fn build(prefixes: &[String], mention_id: i64) -> Result<Self, regex::Error> {
        let mut ordered: Vec<String> = Vec::with_capacity(prefixes.len());
        for prefix in prefixes.iter().filter(|p| !p.is_empty()) {
            let folded = prefix.to_lowercase();
            if !ordered.iter().any(|p| p.to_lowercase() == folded) {
                ordered.push(prefix.clone());
            }
        }
        ordered.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));

        let mut alternatives: Vec<String> = ordered.iter().map(|p| regex::escape(p)).collect();
        alternatives.push(format!(r"<@!?{}>\s*", mention_id));

        let pattern = Regex::new(&format!("(?i)^(?:{})", alternatives.join("|")))?;
        Ok(Self {
            pattern,
            prefixes: ordered,
        })
    }

    /// The matched prefix, as it appears in `content`.
    pub fn find<'a>(&self, content: &'a str) -> Option<&'a str> {
        self.pattern.find(content).map(|m| m.as_str())
    }

    /// Registered prefixes in match precedence order.
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    pub fn is_mention_only(&self) -> bool {
        self.prefixes.is_empty()
    }
}

/// Resolves the command prefix of incoming messages
///
/// Guild matchers are built on first use from the store and cached until
/// [`invalidate`](Self::invalidate) is called. Direct messages use the default
/// prefix and never reach the store.
pub struct PrefixResolver {
    store: Arc<dyn Store>,
    mention_id: i64,
    direct: PrefixMatcher,
    matchers: Mutex<HashMap<i64, Arc<PrefixMatcher>>>,
}

impl PrefixResolver {
    pub fn new(store: Arc<dyn Store>, default_prefix: &str, mention_id: i64) -> Result<Self, PrefixError> {
        let direct = PrefixMatcher::build(&[default_prefix.to_string()], mention_id)?;
        Ok(Self {
            store,
            mention_id,
            direct,
            matchers: Mutex::new(HashMap::new()),
        })
    }

    pub async fn resolve<'a>(
        &self,
        guild_id: Option<i64>,
        content: &'a str,
    ) -> Result<Option<&'a str>, PrefixError> {
        match guild_id {
            None => Ok(self.direct.find(content)),
            Some(guild_id) => Ok(self.matcher_for(guild_id).await?.find(content)),
        }
    }

    /// The cached matcher for `guild_id`, loading it from the store on first use.
    pub async fn matcher_for(&self, guild_id: i64) -> Result<Arc<PrefixMatcher>, PrefixError> {
        let mut matchers = self.matchers.lock().await;
        if let Some(matcher) = matchers.get(&guild_id) {
            return Ok(Arc::clone(matcher));
        }

        let prefixes = self.store.fetch_prefixes(guild_id).await?;
        let matcher = Arc::new(PrefixMatcher::build(&prefixes, self.mention_id)?);
        tracing::debug!(guild_id, prefixes = ?matcher.prefixes(), "prefix matcher built");
        matchers.insert(guild_id, Arc::clone(&matcher));
        Ok(matcher)
    }

    /// Drop the cached matcher so the next message rebuilds it.
    pub async fn invalidate(&self, guild_id: i64) -> bool {
        self.matchers.lock().await.remove(&guild_id).is_some()
    }

    pub async fn is_cached(&self, guild_id: i64) -> bool {
        self.matchers.lock().await.contains_key(&guild_id)
    }
}
