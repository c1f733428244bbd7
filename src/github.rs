use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use bytes::Bytes;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::{Result, SyncError},
    store::ContentStore,
    types::{BranchInfo, EntryType, RemoteContent, RepoInfo, RepoRef, TreeEntry},
};

const DEFAULT_API_BASE: &str = "https://api.github.com";
const ACCEPT_HEADER: &str = "application/vnd.github.v3+json";

/// GitHub-backed content store
///
/// Talks to the GitHub REST v3 API. The credential is opaque to this
/// type: it is attached as a bearer token and never inspected or
/// refreshed. Every method is a single request with no retry.
#[derive(Clone)]
pub struct GitHubStore {
    client: Client,
    api_base: String,
    token: String,
}

#[derive(Deserialize)]
struct RefObject {
    sha: String,
}

#[derive(Deserialize)]
struct RefResponse {
    object: RefObject,
}

#[derive(Deserialize)]
struct ApiTreeItem {
    path: String,
    #[serde(rename = "type")]
    item_type: String,
}

#[derive(Deserialize)]
struct TreeResponse {
    tree: Vec<ApiTreeItem>,
}

#[derive(Deserialize)]
struct ContentResponse {
    content: String,
    sha: String,
}

#[derive(Deserialize)]
struct CommitRef {
    sha: String,
}

#[derive(Deserialize)]
struct ApiBranch {
    name: String,
    commit: CommitRef,
}

impl GitHubStore {
    /// Create a store using the given access token
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, DEFAULT_API_BASE)
    }

    /// Create a store pointed at a non-default API base (mock servers)
    pub fn with_base_url(token: impl Into<String>, api_base: impl Into<String>) -> Self {
        let client = Client::builder()
            .user_agent("RepoPush")
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn repo_url(&self, repo: &RepoRef, suffix: &str) -> String {
        format!(
            "{}/repos/{}/{}{}",
            self.api_base, repo.owner, repo.name, suffix
        )
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .bearer_auth(&self.token)
            .header("Accept", ACCEPT_HEADER)
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.token)
            .header("Accept", ACCEPT_HEADER)
    }

    /// Map a non-2xx response to the error taxonomy
    async fn error_for(&self, response: Response, what: &str) -> SyncError {
        let status = response.status();
        let message = response.text().await.unwrap_or_default();
        match status {
            StatusCode::UNAUTHORIZED => SyncError::Unauthenticated,
            StatusCode::NOT_FOUND => SyncError::not_found(what),
            StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                SyncError::conflict(format!("{what}: {message}"))
            }
            status => SyncError::Upstream {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Decode a base64 content payload, tolerating embedded newlines
    fn decode_content(raw: &str) -> Result<Bytes> {
        let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        let decoded = BASE64
            .decode(compact)
            .map_err(|e| SyncError::invalid(format!("malformed base64 content: {e}")))?;
        Ok(Bytes::from(decoded))
    }
}

#[async_trait]
impl ContentStore for GitHubStore {
    async fn get_repository(&self, repo: &RepoRef) -> Result<Option<RepoInfo>> {
        let url = self.repo_url(repo, "");
        let response = self.get(&url).send().await?;

        match response.status() {
            StatusCode::OK => Ok(Some(response.json().await?)),
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(self.error_for(response, &repo.full_name()).await),
        }
    }

    async fn branch_exists(&self, repo: &RepoRef, branch: &str) -> Result<bool> {
        let url = self.repo_url(repo, &format!("/branches/{branch}"));
        let response = self.get(&url).send().await?;

        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(self.error_for(response, branch).await),
        }
    }

    async fn ref_tip(&self, repo: &RepoRef, branch: &str) -> Result<String> {
        let url = self.repo_url(repo, &format!("/git/refs/heads/{branch}"));
        let response = self.get(&url).send().await?;

        if response.status() == StatusCode::OK {
            let data: RefResponse = response.json().await?;
            Ok(data.object.sha)
        } else {
            Err(self
                .error_for(response, &format!("ref {}:{branch}", repo.full_name()))
                .await)
        }
    }

    async fn create_branch(&self, repo: &RepoRef, branch: &str, from_sha: &str) -> Result<()> {
        let url = self.repo_url(repo, "/git/refs");
        let body = json!({
            "ref": format!("refs/heads/{branch}"),
            "sha": from_sha,
        });
        let response = self
            .request(reqwest::Method::POST, &url)
            .json(&body)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(self.error_for(response, &format!("branch {branch}")).await)
        }
    }

    async fn get_tree(&self, repo: &RepoRef, branch: &str) -> Result<Vec<TreeEntry>> {
        let url = self.repo_url(repo, &format!("/git/trees/{branch}?recursive=1"));
        let response = self.get(&url).send().await?;

        if response.status() == StatusCode::OK {
            let data: TreeResponse = response.json().await?;
            let entries = data
                .tree
                .into_iter()
                .map(|item| TreeEntry {
                    path: item.path,
                    entry_type: match item.item_type.as_str() {
                        "blob" => EntryType::Blob,
                        // "tree", submodule "commit" entries, anything else
                        _ => EntryType::Tree,
                    },
                })
                .collect();
            Ok(entries)
        } else {
            Err(self
                .error_for(response, &format!("tree {}:{branch}", repo.full_name()))
                .await)
        }
    }

    async fn get_file(
        &self,
        repo: &RepoRef,
        path: &str,
        reference: &str,
    ) -> Result<RemoteContent> {
        let url = self.repo_url(repo, &format!("/contents/{path}?ref={reference}"));
        let response = self.get(&url).send().await?;

        if response.status() == StatusCode::OK {
            let data: ContentResponse = response.json().await?;
            Ok(RemoteContent {
                content: Self::decode_content(&data.content)?,
                sha: data.sha,
            })
        } else {
            Err(self.error_for(response, path).await)
        }
    }

    async fn put_file(
        &self,
        repo: &RepoRef,
        path: &str,
        content_b64: &str,
        message: &str,
        branch: &str,
        sha: Option<&str>,
    ) -> Result<()> {
        let url = self.repo_url(repo, &format!("/contents/{path}"));
        let mut body = json!({
            "message": message,
            "content": content_b64,
            "branch": branch,
        });
        if let Some(sha) = sha {
            body["sha"] = json!(sha);
        }

        let response = self
            .request(reqwest::Method::PUT, &url)
            .json(&body)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(self.error_for(response, path).await)
        }
    }

    async fn delete_file(
        &self,
        repo: &RepoRef,
        path: &str,
        sha: &str,
        message: &str,
        branch: &str,
    ) -> Result<()> {
        let url = self.repo_url(repo, &format!("/contents/{path}"));
        let body = json!({
            "message": message,
            "sha": sha,
            "branch": branch,
        });
        let response = self
            .request(reqwest::Method::DELETE, &url)
            .json(&body)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(self.error_for(response, path).await)
        }
    }

    async fn delete_repository(&self, repo: &RepoRef) -> Result<()> {
        let url = self.repo_url(repo, "");
        let response = self
            .request(reqwest::Method::DELETE, &url)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            // Deletion needs its own scope; this failure is user-actionable
            StatusCode::FORBIDDEN => Err(SyncError::InsufficientScope {
                action: format!("delete repository {}", repo.full_name()),
            }),
            _ => Err(self.error_for(response, &repo.full_name()).await),
        }
    }

    async fn create_repository(&self, name: &str) -> Result<RepoInfo> {
        let url = format!("{}/user/repos", self.api_base);
        let body = json!({
            "name": name,
            "auto_init": true,
            "private": false,
        });
        let response = self
            .request(reqwest::Method::POST, &url)
            .json(&body)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(self.error_for(response, name).await)
        }
    }

    async fn list_branches(&self, repo: &RepoRef) -> Result<Vec<BranchInfo>> {
        let url = self.repo_url(repo, "/branches");
        let response = self.get(&url).send().await?;

        if response.status() == StatusCode::OK {
            let branches: Vec<ApiBranch> = response.json().await?;
            Ok(branches
                .into_iter()
                .map(|b| BranchInfo {
                    name: b.name,
                    sha: b.commit.sha,
                })
                .collect())
        } else {
            Err(self.error_for(response, &repo.full_name()).await)
        }
    }
}
