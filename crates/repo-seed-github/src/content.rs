use serde::{Deserialize, Serialize};

/// Response from GitHub's Contents API.
/// `GET /repos/{owner}/{repo}/contents/{path}`
#[derive(Debug, Deserialize)]
pub struct ContentResponse {
    pub path: String,
    pub sha: String,
    pub content: Option<String>,
}

/// Request body for the Contents API write endpoint.
/// `PUT /repos/{owner}/{repo}/contents/{path}`
#[derive(Debug, Serialize)]
pub struct WriteRequest {
    pub message: String,
    /// Base64-encoded file bytes, as the API requires.
    pub content: String,
    /// Blob SHA of the revision being replaced; present only for updates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

/// Request body for `POST /user/repos`.
#[derive(Debug, Serialize)]
pub struct CreateRepoRequest {
    pub name: String,
    pub description: String,
    pub private: bool,
    pub auto_init: bool,
}

/// Response from `POST /user/repos`.
#[derive(Debug, Deserialize)]
pub struct RepoResponse {
    pub name: String,
    pub owner: OwnerResponse,
}

#[derive(Debug, Deserialize)]
pub struct OwnerResponse {
    pub login: String,
}

/// Response from `GET /user`.
#[derive(Debug, Deserialize)]
pub struct UserResponse {
    pub login: String,
}

/// GitHub's error body shape: `{"message": "..."}`.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}
