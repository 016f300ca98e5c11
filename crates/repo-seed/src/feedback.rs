/// One progress event from a provisioning run.
///
/// The engine reports what it is doing (repository created, file added or
/// updated, ancillary step skipped) but never prints: each event goes to a
/// caller-supplied [`ProgressSink`], and reports additionally aggregate the
/// events describing non-fatal problems. Severity is routing advice for
/// frontends; the CLI sends `Info` to stdout and everything else to stderr.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Info(String),
    Warning(String),
    Error(String),
}

impl Feedback {
    pub fn info(msg: impl Into<String>) -> Self {
        Self::Info(msg.into())
    }

    pub fn warning(msg: impl Into<String>) -> Self {
        Self::Warning(msg.into())
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self::Error(msg.into())
    }

    pub fn is_info(&self) -> bool {
        self.prefix().is_none()
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Self::Warning(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// The event text, without any severity prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Info(msg) | Self::Warning(msg) | Self::Error(msg) => msg,
        }
    }

    fn prefix(&self) -> Option<&'static str> {
        match self {
            Self::Info(_) => None,
            Self::Warning(_) => Some("warning"),
            Self::Error(_) => Some("error"),
        }
    }
}

impl std::fmt::Display for Feedback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.prefix() {
            Some(prefix) => write!(f, "{prefix}: {}", self.message()),
            None => f.write_str(self.message()),
        }
    }
}

/// Receives feedback events as they happen.
///
/// Events are observational: sinks must not influence control flow, and
/// with a concurrent sync pass they may arrive from multiple workers.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: Feedback);
}

impl<F> ProgressSink for F
where
    F: Fn(Feedback) + Send + Sync,
{
    fn emit(&self, event: Feedback) {
        self(event)
    }
}

/// Sink that discards every event.
pub struct NullSink;

impl ProgressSink for NullSink {
    fn emit(&self, _event: Feedback) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_progress_text_passes_through_unchanged() {
        // Per-file progress lines render exactly as emitted.
        let event = Feedback::info("Added: b/c.txt");
        assert!(event.is_info());
        assert_eq!(event.message(), "Added: b/c.txt");
        assert_eq!(event.to_string(), "Added: b/c.txt");
    }

    #[test]
    fn warnings_and_errors_carry_a_severity_prefix() {
        // Frontends route on severity; the rendered prefix is what a CLI
        // user sees on stderr.
        let warn = Feedback::warning("skipping symlink: link.txt");
        assert!(warn.is_warning());
        assert_eq!(warn.to_string(), "warning: skipping symlink: link.txt");

        let err = Feedback::error("Failed to add/update a.txt: HTTP 403");
        assert!(err.is_error());
        assert_eq!(err.to_string(), "error: Failed to add/update a.txt: HTTP 403");
        assert_eq!(err.message(), "Failed to add/update a.txt: HTTP 403");
    }

    #[test]
    fn closures_are_sinks() {
        let sink = |event: Feedback| {
            assert_eq!(event.message(), "Repository 'ada/demo' created successfully.");
        };
        sink.emit(Feedback::info("Repository 'ada/demo' created successfully."));
    }
}
