use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::feedback::{Feedback, ProgressSink};
use crate::store::{
    ContentStore, Identity, RemoteFileHandle, RepoHandle, StoreError, VersionToken,
};

/// Sink that records every event for later assertions.
#[derive(Default)]
pub struct CollectSink(Mutex<Vec<Feedback>>);

impl CollectSink {
    pub fn events(&self) -> Vec<Feedback> {
        self.0.lock().unwrap().clone()
    }
}

impl ProgressSink for CollectSink {
    fn emit(&self, event: Feedback) {
        self.0.lock().unwrap().push(event);
    }
}

struct FileRecord {
    content: Vec<u8>,
    version: String,
}

#[derive(Default)]
struct Inner {
    repos: HashMap<String, HashMap<String, FileRecord>>,
    licenses: HashMap<String, String>,
    fail_writes: HashSet<String>,
    fail_probes: HashSet<String>,
    next_version: u64,
    calls: usize,
}

/// In-memory `ContentStore` for testing: one fake account, any number of
/// repositories, per-path version counters, and injectable failures.
pub struct MemoryStore {
    login: String,
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Register a raw license template under a canonical key.
    pub fn add_license(&self, key: impl Into<String>, text: impl Into<String>) {
        self.inner
            .lock()
            .unwrap()
            .licenses
            .insert(key.into(), text.into());
    }

    /// Make every create/update for `path` fail with a write error.
    pub fn fail_writes_on(&self, path: impl Into<String>) {
        self.inner.lock().unwrap().fail_writes.insert(path.into());
    }

    /// Make the existence probe for `path` fail (not a NotFound signal).
    pub fn fail_probe_on(&self, path: impl Into<String>) {
        self.inner.lock().unwrap().fail_probes.insert(path.into());
    }

    pub fn repo_exists(&self, full_name: &str) -> bool {
        self.inner.lock().unwrap().repos.contains_key(full_name)
    }

    pub fn has_file(&self, full_name: &str, path: &str) -> bool {
        self.file_content(full_name, path).is_some()
    }

    pub fn file_content(&self, full_name: &str, path: &str) -> Option<Vec<u8>> {
        self.inner
            .lock()
            .unwrap()
            .repos
            .get(full_name)
            .and_then(|files| files.get(path))
            .map(|record| record.content.clone())
    }

    /// Total remote calls made against this store.
    pub fn call_count(&self) -> usize {
        self.inner.lock().unwrap().calls
    }
}

impl Inner {
    fn bump_version(&mut self) -> String {
        self.next_version += 1;
        format!("v{}", self.next_version)
    }
}

#[async_trait::async_trait]
impl ContentStore for MemoryStore {
    async fn identity(&self) -> Result<Identity, StoreError> {
        self.inner.lock().unwrap().calls += 1;
        Ok(Identity {
            login: self.login.clone(),
        })
    }

    async fn create_repository(
        &self,
        owner: &str,
        name: &str,
        _description: &str,
        _private: bool,
    ) -> Result<RepoHandle, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls += 1;

        let full_name = format!("{owner}/{name}");
        if inner.repos.contains_key(&full_name) {
            return Err(StoreError::Api(format!(
                "name already exists on this account: {name}"
            )));
        }

        inner.repos.insert(full_name, HashMap::new());
        Ok(RepoHandle::new(owner, name))
    }

    async fn file_handle(
        &self,
        repo: &RepoHandle,
        path: &str,
    ) -> Result<Option<RemoteFileHandle>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls += 1;

        if inner.fail_probes.contains(path) {
            return Err(StoreError::Api(format!("injected probe failure: {path}")));
        }

        let files = inner
            .repos
            .get(&repo.full_name())
            .ok_or_else(|| StoreError::Api(format!("no such repository: {repo}")))?;

        Ok(files.get(path).map(|record| RemoteFileHandle {
            path: path.to_owned(),
            version: VersionToken::new(record.version.clone()),
        }))
    }

    async fn create_file(
        &self,
        repo: &RepoHandle,
        path: &str,
        content: &[u8],
        _message: &str,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls += 1;

        if inner.fail_writes.contains(path) {
            return Err(StoreError::Api(format!("injected write failure: {path}")));
        }

        let version = inner.bump_version();
        let files = inner
            .repos
            .get_mut(&repo.full_name())
            .ok_or_else(|| StoreError::Api(format!("no such repository: {repo}")))?;

        if files.contains_key(path) {
            return Err(StoreError::Api(format!("file already exists: {path}")));
        }

        files.insert(
            path.to_owned(),
            FileRecord {
                content: content.to_vec(),
                version,
            },
        );
        Ok(())
    }

    async fn update_file(
        &self,
        repo: &RepoHandle,
        path: &str,
        content: &[u8],
        _message: &str,
        version: &VersionToken,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls += 1;

        if inner.fail_writes.contains(path) {
            return Err(StoreError::Api(format!("injected write failure: {path}")));
        }

        let next = inner.bump_version();
        let files = inner
            .repos
            .get_mut(&repo.full_name())
            .ok_or_else(|| StoreError::Api(format!("no such repository: {repo}")))?;

        let record = files
            .get_mut(path)
            .ok_or_else(|| StoreError::Api(format!("no such file: {path}")))?;

        if record.version != version.as_str() {
            return Err(StoreError::VersionConflict(format!(
                "{path} is at {}, update was based on {}",
                record.version,
                version.as_str()
            )));
        }

        record.content = content.to_vec();
        record.version = next;
        Ok(())
    }

    async fn license_template(&self, key: &str) -> Result<String, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls += 1;

        inner
            .licenses
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::LicenseNotFound(key.to_owned()))
    }
}
