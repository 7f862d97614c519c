use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity tag carried by every outcome, one per palette entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Success,
    Neutral,
    Pending,
    Cancelled,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::Error,
        Severity::Success,
        Severity::Neutral,
        Severity::Pending,
        Severity::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Success => "success",
            Severity::Neutral => "neutral",
            Severity::Pending => "pending",
            Severity::Cancelled => "cancelled",
        }
    }

    /// Translation key of the localized reply title.
    pub fn title_key(&self) -> String {
        format!("responses.{}.title", self.as_str())
    }

    /// Capitalised form used in the fallback reply title.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Error => "Error",
            Severity::Success => "Success",
            Severity::Neutral => "Neutral",
            Severity::Pending => "Pending",
            Severity::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The five kinds of outcome a command may raise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    CommandError,
    CommandOnCooldown,
    CommandCancelled,
    CommandSuccess,
    CommandNeutral,
}

impl OutcomeKind {
    pub fn default_severity(self) -> Severity {
        match self {
            OutcomeKind::CommandError => Severity::Error,
            OutcomeKind::CommandOnCooldown => Severity::Pending,
            OutcomeKind::CommandCancelled => Severity::Cancelled,
            OutcomeKind::CommandSuccess => Severity::Success,
            OutcomeKind::CommandNeutral => Severity::Neutral,
        }
    }

    /// The kind whose default severity is `severity`.
    pub fn for_severity(severity: Severity) -> Self {
        match severity {
            Severity::Error => OutcomeKind::CommandError,
            Severity::Pending => OutcomeKind::CommandOnCooldown,
            Severity::Cancelled => OutcomeKind::CommandCancelled,
            Severity::Success => OutcomeKind::CommandSuccess,
            Severity::Neutral => OutcomeKind::CommandNeutral,
        }
    }
}

/// A classified command result that ends normal command flow
///
/// Raised by handlers as `Err(Outcome::...into())`. Only outcomes created with
/// [`Severity::Error`] are logged, once, when they are created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    kind: OutcomeKind,
    severity: Severity,
    message: String,
    title: Option<String>,
}

impl Outcome {
    pub fn new(kind: OutcomeKind, message: impl Into<String>) -> Self {
        Self::with_severity(kind, kind.default_severity(), message)
    }

    /// Build an outcome whose severity differs from its kind's default.
    pub fn with_severity(kind: OutcomeKind, severity: Severity, message: impl Into<String>) -> Self {
        let message = message.into();
        if severity == Severity::Error {
            tracing::error!(kind = ?kind, "{}", message);
        }
        Self {
            kind,
            severity,
            message,
            title: None,
        }
    }

    pub fn from_severity(severity: Severity, message: impl Into<String>) -> Self {
        Self::new(OutcomeKind::for_severity(severity), message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(OutcomeKind::CommandError, message)
    }

    pub fn cooldown(message: impl Into<String>) -> Self {
        Self::new(OutcomeKind::CommandOnCooldown, message)
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(OutcomeKind::CommandCancelled, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(OutcomeKind::CommandSuccess, message)
    }

    pub fn neutral(message: impl Into<String>) -> Self {
        Self::new(OutcomeKind::CommandNeutral, message)
    }

    /// Reply title to use instead of the classifier's fallback.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn kind(&self) -> OutcomeKind {
        self.kind
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn captured_logs(f: impl FnOnce()) -> String {
        let buffer = Captured::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = buffer.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_default_severities() {
        assert_eq!(Outcome::error("x").severity(), Severity::Error);
        assert_eq!(Outcome::cooldown("x").severity(), Severity::Pending);
        assert_eq!(Outcome::cancelled("x").severity(), Severity::Cancelled);
        assert_eq!(Outcome::success("x").severity(), Severity::Success);
        assert_eq!(Outcome::neutral("x").severity(), Severity::Neutral);
    }

    #[test]
    fn test_severity_override() {
        let outcome = Outcome::with_severity(OutcomeKind::CommandOnCooldown, Severity::Neutral, "later");
        assert_eq!(outcome.kind(), OutcomeKind::CommandOnCooldown);
        assert_eq!(outcome.severity(), Severity::Neutral);
        assert_eq!(outcome.message(), "later");
    }

    #[test]
    fn test_factory_is_total() {
        for severity in Severity::ALL {
            let outcome = Outcome::from_severity(severity, "msg");
            assert_eq!(outcome.severity(), severity);
            assert_eq!(outcome.kind().default_severity(), severity);
        }
    }

    #[test]
    fn test_only_errors_are_logged() {
        let logs = captured_logs(|| {
            let _ = Outcome::success("done");
            let _ = Outcome::cooldown("wait");
            let _ = Outcome::cancelled("stopped");
            let _ = Outcome::neutral("meh");
        });
        assert!(logs.is_empty(), "unexpected log output: {}", logs);

        let logs = captured_logs(|| {
            let _ = Outcome::error("database exploded");
        });
        assert!(logs.contains("ERROR"));
        assert!(logs.contains("database exploded"));
    }

    #[test]
    fn test_severity_serde_names() {
        let json = serde_json::to_string(&Severity::Pending).unwrap();
        assert_eq!(json, "\"pending\"");
        let parsed: Severity = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(parsed, Severity::Cancelled);
    }
}
