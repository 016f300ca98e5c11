use std::fmt;
use std::sync::Arc;

/// The account a credential authenticates as on the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub login: String,
}

/// A repository on the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoHandle {
    pub owner: String,
    pub name: String,
}

impl RepoHandle {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepoHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Opaque token naming the remote file revision an update is based on.
/// Required by the store's optimistic-update precondition; never cached
/// across runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionToken(String);

impl VersionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Handle to a file that exists on the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFileHandle {
    /// Forward-slash path relative to the repository root.
    pub path: String,
    pub version: VersionToken,
}

/// Errors crossing the remote store boundary.
///
/// A missing file is not an error: [`ContentStore::file_handle`] returns
/// `Ok(None)` for it, so callers branch on a closed set of outcomes instead
/// of inspecting status codes. Messages carry the remote's own text where
/// available.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("license template not found: {0}")]
    LicenseNotFound(String),

    #[error("version conflict: {0}")]
    VersionConflict(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("remote API error: {0}")]
    Api(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// The narrow interface the engine needs from a remote content store.
///
/// Implementations hold the authenticated session; the engine shares it
/// read-only across all operations in a run and keeps no state of its own
/// between runs.
#[async_trait::async_trait]
pub trait ContentStore: Send + Sync {
    /// Who the supplied credential authenticates as.
    async fn identity(&self) -> Result<Identity, StoreError>;

    /// Create a new, empty repository under `owner`. Never auto-initializes
    /// content; the engine fully controls what goes in.
    async fn create_repository(
        &self,
        owner: &str,
        name: &str,
        description: &str,
        private: bool,
    ) -> Result<RepoHandle, StoreError>;

    /// Probe for an existing file. `Ok(None)` means the file does not exist.
    async fn file_handle(
        &self,
        repo: &RepoHandle,
        path: &str,
    ) -> Result<Option<RemoteFileHandle>, StoreError>;

    async fn create_file(
        &self,
        repo: &RepoHandle,
        path: &str,
        content: &[u8],
        message: &str,
    ) -> Result<(), StoreError>;

    async fn update_file(
        &self,
        repo: &RepoHandle,
        path: &str,
        content: &[u8],
        message: &str,
        version: &VersionToken,
    ) -> Result<(), StoreError>;

    /// Raw license template text for a canonical license key.
    async fn license_template(&self, key: &str) -> Result<String, StoreError>;
}

#[async_trait::async_trait]
impl<T: ContentStore + ?Sized> ContentStore for Arc<T> {
    async fn identity(&self) -> Result<Identity, StoreError> {
        (**self).identity().await
    }

    async fn create_repository(
        &self,
        owner: &str,
        name: &str,
        description: &str,
        private: bool,
    ) -> Result<RepoHandle, StoreError> {
        (**self)
            .create_repository(owner, name, description, private)
            .await
    }

    async fn file_handle(
        &self,
        repo: &RepoHandle,
        path: &str,
    ) -> Result<Option<RemoteFileHandle>, StoreError> {
        (**self).file_handle(repo, path).await
    }

    async fn create_file(
        &self,
        repo: &RepoHandle,
        path: &str,
        content: &[u8],
        message: &str,
    ) -> Result<(), StoreError> {
        (**self).create_file(repo, path, content, message).await
    }

    async fn update_file(
        &self,
        repo: &RepoHandle,
        path: &str,
        content: &[u8],
        message: &str,
        version: &VersionToken,
    ) -> Result<(), StoreError> {
        (**self)
            .update_file(repo, path, content, message, version)
            .await
    }

    async fn license_template(&self, key: &str) -> Result<String, StoreError> {
        (**self).license_template(key).await
    }
}
