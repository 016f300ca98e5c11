use base64::Engine;

use repo_seed::{
    ContentStore, Identity, RemoteFileHandle, RepoHandle, StoreError, VersionToken,
};

use crate::content::{
    ContentResponse, CreateRepoRequest, ErrorResponse, RepoResponse, UserResponse, WriteRequest,
};

/// Canonical source of raw license texts, keyed by `licenses/{key}.txt`.
const LICENSE_SOURCE_REPO: &str = "github/choosealicense.com";

const USER_AGENT: &str = "repo-seeder";

/// Configuration for the GitHub-backed content store.
#[derive(Debug, Clone)]
pub struct GitHubStoreConfig {
    /// Personal access token with repo scope.
    pub token: String,
    pub api_base_url: Option<String>,
}

/// `ContentStore` over the GitHub REST v3 API.
pub struct GitHubStore {
    config: GitHubStoreConfig,
    client: reqwest::Client,
}

impl GitHubStore {
    pub fn new(config: GitHubStoreConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn api_base(&self) -> &str {
        self.config
            .api_base_url
            .as_deref()
            .unwrap_or("https://api.github.com")
    }

    fn build_request(
        &self,
        method: reqwest::Method,
        url: impl reqwest::IntoUrl,
    ) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github+json")
            .header("Authorization", format!("Bearer {}", self.config.token))
    }

    /// Build the Contents API URL for `path`, percent-encoding each
    /// segment. File names may legally contain `#`, `?` or `%`, which
    /// interpolated raw would truncate or rewrite the URL path and silently
    /// address the wrong remote key.
    fn contents_url(&self, repo: &RepoHandle, path: &str) -> Result<reqwest::Url, StoreError> {
        let mut url = reqwest::Url::parse(self.api_base())
            .map_err(|e| StoreError::Parse(format!("invalid API base URL: {e}")))?;

        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| StoreError::Parse("API base URL cannot be a base".into()))?;
            segments.pop_if_empty();
            segments.extend(["repos", &repo.owner, &repo.name, "contents"]);
            segments.extend(path.split('/'));
        }

        Ok(url)
    }

    /// Pull GitHub's error message out of a failed response, falling back
    /// to the raw body text.
    async fn error_message(response: reqwest::Response) -> String {
        let status = response.status();
        let body = response.text().await.unwrap_or_else(|_| "unknown".into());

        match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(err) => format!("HTTP {status}: {}", err.message),
            Err(_) => format!("HTTP {status}: {body}"),
        }
    }

    fn decode_content(encoded: &str) -> Result<Vec<u8>, StoreError> {
        // GitHub returns base64 with newlines embedded
        let cleaned: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();

        base64::engine::general_purpose::STANDARD
            .decode(&cleaned)
            .map_err(|e| StoreError::Parse(format!("base64 decode failed: {e}")))
    }

    fn encode_content(bytes: &[u8]) -> String {
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }

    async fn write_file(
        &self,
        repo: &RepoHandle,
        path: &str,
        content: &[u8],
        message: &str,
        version: Option<&VersionToken>,
    ) -> Result<(), StoreError> {
        let url = self.contents_url(repo, path)?;
        let body = WriteRequest {
            message: message.to_owned(),
            content: Self::encode_content(content),
            sha: version.map(|v| v.as_str().to_owned()),
        };

        let response = self
            .build_request(reqwest::Method::PUT, url)
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let message = Self::error_message(response).await;
        if status.as_u16() == 409 {
            return Err(StoreError::VersionConflict(message));
        }
        Err(StoreError::Api(message))
    }
}

#[async_trait::async_trait]
impl ContentStore for GitHubStore {
    async fn identity(&self) -> Result<Identity, StoreError> {
        let url = format!("{}/user", self.api_base());

        let response = self
            .build_request(reqwest::Method::GET, url)
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 401 {
            return Err(StoreError::Auth(Self::error_message(response).await));
        }
        if !status.is_success() {
            return Err(StoreError::Api(Self::error_message(response).await));
        }

        let user: UserResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))?;

        Ok(Identity { login: user.login })
    }

    async fn create_repository(
        &self,
        _owner: &str,
        name: &str,
        description: &str,
        private: bool,
    ) -> Result<RepoHandle, StoreError> {
        // Repositories are created under the authenticated user; the
        // response is authoritative for the owner login.
        let url = format!("{}/user/repos", self.api_base());
        let body = CreateRepoRequest {
            name: name.to_owned(),
            description: description.to_owned(),
            private,
            auto_init: false,
        };

        let response = self
            .build_request(reqwest::Method::POST, url)
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StoreError::Api(Self::error_message(response).await));
        }

        let repo: RepoResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))?;

        Ok(RepoHandle::new(repo.owner.login, repo.name))
    }

    async fn file_handle(
        &self,
        repo: &RepoHandle,
        path: &str,
    ) -> Result<Option<RemoteFileHandle>, StoreError> {
        let url = self.contents_url(repo, path)?;

        let response = self
            .build_request(reqwest::Method::GET, url)
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        // Missing is an expected signal, not an error: it drives the
        // create-vs-update branch.
        if response.status().as_u16() == 404 {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(StoreError::Api(Self::error_message(response).await));
        }

        let content: ContentResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))?;

        Ok(Some(RemoteFileHandle {
            path: content.path,
            version: VersionToken::new(content.sha),
        }))
    }

    async fn create_file(
        &self,
        repo: &RepoHandle,
        path: &str,
        content: &[u8],
        message: &str,
    ) -> Result<(), StoreError> {
        self.write_file(repo, path, content, message, None).await
    }

    async fn update_file(
        &self,
        repo: &RepoHandle,
        path: &str,
        content: &[u8],
        message: &str,
        version: &VersionToken,
    ) -> Result<(), StoreError> {
        self.write_file(repo, path, content, message, Some(version))
            .await
    }

    async fn license_template(&self, key: &str) -> Result<String, StoreError> {
        let url = format!(
            "{}/repos/{}/contents/licenses/{}.txt",
            self.api_base(),
            LICENSE_SOURCE_REPO,
            key,
        );

        let response = self
            .build_request(reqwest::Method::GET, url)
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        if response.status().as_u16() == 404 {
            return Err(StoreError::LicenseNotFound(key.to_owned()));
        }
        if !response.status().is_success() {
            return Err(StoreError::Api(Self::error_message(response).await));
        }

        let content: ContentResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))?;

        let encoded = content
            .content
            .ok_or_else(|| StoreError::Parse("no content in response".into()))?;
        let bytes = Self::decode_content(&encoded)?;

        String::from_utf8(bytes).map_err(|e| StoreError::Parse(format!("invalid UTF-8: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_round_trip() {
        let encoded = GitHubStore::encode_content(b"hello world");
        assert_eq!(GitHubStore::decode_content(&encoded).unwrap(), b"hello world");
    }

    #[test]
    fn decode_tolerates_embedded_newlines() {
        // "hello world" split the way GitHub wraps content bodies.
        let wrapped = "aGVsbG8g\nd29ybGQ=\n";
        assert_eq!(GitHubStore::decode_content(wrapped).unwrap(), b"hello world");
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            GitHubStore::decode_content("not!!base64"),
            Err(StoreError::Parse(_))
        ));
    }
}
