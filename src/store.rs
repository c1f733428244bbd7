use async_trait::async_trait;

use crate::{
    error::Result,
    types::{BranchInfo, RemoteContent, RepoInfo, RepoRef, TreeEntry},
};

/// Typed accessor to the hosting provider's content API
///
/// Each method maps to exactly one remote call: synchronous
/// request/response, single attempt, no retry and no orchestration.
/// Orchestration layers compose these calls and own all sequencing.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Probe a repository
    ///
    /// Returns `None` when the repository does not exist. Any non-2xx
    /// response other than "not found" is an error, not an absence signal.
    async fn get_repository(&self, repo: &RepoRef) -> Result<Option<RepoInfo>>;

    /// Check whether a branch exists
    async fn branch_exists(&self, repo: &RepoRef, branch: &str) -> Result<bool>;

    /// Commit sha at the tip of a branch
    ///
    /// Returns `SyncError::NotFound` if the branch is absent.
    async fn ref_tip(&self, repo: &RepoRef, branch: &str) -> Result<String>;

    /// Create a branch ref pointing at `from_sha`
    ///
    /// Returns `SyncError::Conflict` if the ref already exists.
    async fn create_branch(&self, repo: &RepoRef, branch: &str, from_sha: &str) -> Result<()>;

    /// Recursive tree listing for a branch
    ///
    /// Returns `SyncError::NotFound` if the ref name does not resolve
    /// to a commit.
    async fn get_tree(&self, repo: &RepoRef, branch: &str) -> Result<Vec<TreeEntry>>;

    /// Fetch one file's decoded content and revision token
    async fn get_file(&self, repo: &RepoRef, path: &str, reference: &str)
        -> Result<RemoteContent>;

    /// Create or update one file
    ///
    /// `sha` present means update-at-revision; absent means create.
    /// Returns `SyncError::Conflict` for a tokenless write to an existing
    /// path or a stale token.
    async fn put_file(
        &self,
        repo: &RepoRef,
        path: &str,
        content_b64: &str,
        message: &str,
        branch: &str,
        sha: Option<&str>,
    ) -> Result<()>;

    /// Delete one file at a known revision
    async fn delete_file(
        &self,
        repo: &RepoRef,
        path: &str,
        sha: &str,
        message: &str,
        branch: &str,
    ) -> Result<()>;

    /// Delete a whole repository
    ///
    /// Returns `SyncError::InsufficientScope` when the credential lacks
    /// deletion permission.
    async fn delete_repository(&self, repo: &RepoRef) -> Result<()>;

    /// Create a repository under the authenticated account
    ///
    /// Always auto-initialized with an initial commit so a default
    /// branch ref exists immediately.
    async fn create_repository(&self, name: &str) -> Result<RepoInfo>;

    /// List all branches of a repository
    async fn list_branches(&self, repo: &RepoRef) -> Result<Vec<BranchInfo>>;
}
