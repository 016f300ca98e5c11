use chrono::Datelike;

use crate::feedback::{Feedback, ProgressSink};
use crate::store::{ContentStore, StoreError};

/// Canonical key into the fixed table of supported licenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LicenseKey {
    Mit,
    Apache2,
    Gpl3,
    Bsd3Clause,
}

/// Fallback when a display name is not in the table.
pub const DEFAULT_LICENSE: LicenseKey = LicenseKey::Mit;

impl LicenseKey {
    /// Canonical machine key used by the remote template source.
    pub fn api_key(&self) -> &'static str {
        match self {
            Self::Mit => "mit",
            Self::Apache2 => "apache-2.0",
            Self::Gpl3 => "gpl-3.0",
            Self::Bsd3Clause => "bsd-3-clause",
        }
    }

    /// Human-readable name shown in pickers.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Mit => "MIT License",
            Self::Apache2 => "Apache License 2.0",
            Self::Gpl3 => "GNU General Public License v3.0",
            Self::Bsd3Clause => "BSD 3-Clause License",
        }
    }

    /// All supported licenses in display order.
    pub fn all() -> [LicenseKey; 4] {
        [Self::Mit, Self::Apache2, Self::Gpl3, Self::Bsd3Clause]
    }

    /// Look up a license by display name (exact) or canonical key
    /// (case-insensitive).
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        Self::all().into_iter().find(|key| {
            key.display_name() == trimmed || key.api_key().eq_ignore_ascii_case(trimmed)
        })
    }
}

impl std::fmt::Display for LicenseKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.api_key())
    }
}

/// Resolve user input to a license key, falling back to [`DEFAULT_LICENSE`]
/// when the name is unknown. The fallback is reported, never silent, so UI
/// drift in display names degrades loudly instead of failing the run.
pub fn key_for_display_name(input: &str, sink: &dyn ProgressSink) -> LicenseKey {
    match LicenseKey::parse(input) {
        Some(key) => key,
        None => {
            sink.emit(Feedback::warning(format!(
                "unknown license '{input}', falling back to {}",
                DEFAULT_LICENSE.display_name()
            )));
            DEFAULT_LICENSE
        }
    }
}

/// A license template with its placeholders filled in.
/// Derived per run, never persisted.
#[derive(Debug, Clone)]
pub struct LicenseTemplate {
    pub key: LicenseKey,
    pub text: String,
}

/// Replace `[year]` and `[fullname]` placeholders in a raw template.
///
/// Exact case-sensitive string match, single pass, every occurrence; all
/// other text passes through byte-identical.
pub fn fill_placeholders(template: &str, year: i32, fullname: &str) -> String {
    template
        .replace("[year]", &year.to_string())
        .replace("[fullname]", fullname)
}

/// Fetch the raw template for `key` through the store and fill it in.
pub async fn resolve_license(
    store: &dyn ContentStore,
    key: LicenseKey,
    author_name: &str,
    year: i32,
) -> Result<LicenseTemplate, StoreError> {
    let raw = store.license_template(key.api_key()).await?;

    Ok(LicenseTemplate {
        key,
        text: fill_placeholders(&raw, year, author_name),
    })
}

/// Four-digit current calendar year from the system clock.
pub fn current_year() -> i32 {
    chrono::Utc::now().year()
}
