use std::path::PathBuf;

use crate::license::LicenseKey;

/// Validated input for one provisioning run.
///
/// Constructed once by the caller (CLI, UI form) and handed to the engine
/// as a single immutable value; it lives for exactly one run.
#[derive(Debug, Clone)]
pub struct ProjectSpec {
    pub repository_name: String,
    pub description: String,
    pub license: LicenseKey,
    pub author_name: String,
    /// Verbatim PATENTS file text. `None` means no PATENTS file is written.
    pub patent_notice: Option<String>,
    pub local_root: PathBuf,
    pub private: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum SpecError {
    #[error("repository name must not be empty")]
    EmptyName,

    #[error("repository name '{0}' contains characters the remote store rejects")]
    InvalidName(String),

    #[error("author name must not be empty")]
    EmptyAuthor,

    #[error("project directory not found: {}", .0.display())]
    RootNotFound(PathBuf),
}

impl ProjectSpec {
    /// Validate and build a spec. Repositories are non-private and have no
    /// patent notice unless opted in via the `with_` builders.
    pub fn new(
        repository_name: impl Into<String>,
        description: impl Into<String>,
        license: LicenseKey,
        author_name: impl Into<String>,
        local_root: impl Into<PathBuf>,
    ) -> Result<Self, SpecError> {
        let repository_name = repository_name.into().trim().to_owned();
        if repository_name.is_empty() {
            return Err(SpecError::EmptyName);
        }
        if !valid_repository_name(&repository_name) {
            return Err(SpecError::InvalidName(repository_name));
        }

        let author_name = author_name.into().trim().to_owned();
        if author_name.is_empty() {
            return Err(SpecError::EmptyAuthor);
        }

        let local_root = local_root.into();
        if !local_root.is_dir() {
            return Err(SpecError::RootNotFound(local_root));
        }

        Ok(Self {
            repository_name,
            description: description.into(),
            license,
            author_name,
            patent_notice: None,
            local_root,
            private: false,
        })
    }

    /// Attach a patent notice. Empty or whitespace-only text normalizes to
    /// no notice, so a PATENTS write is never attempted for it.
    pub fn with_patent_notice(mut self, notice: impl Into<String>) -> Self {
        let notice = notice.into();
        self.patent_notice = if notice.trim().is_empty() {
            None
        } else {
            Some(notice)
        };
        self
    }

    pub fn with_private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }
}

fn valid_repository_name(name: &str) -> bool {
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}
