use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};

/// Identifies a repository on the hosting provider
///
/// Resolved fresh on every operation; never persisted locally.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Parse an `https://github.com/<owner>/<repo>` style URL
    ///
    /// Trailing `.git` suffixes and extra path segments are ignored.
    pub fn parse_url(url: &str) -> Result<Self> {
        let rest = url
            .split("github.com/")
            .nth(1)
            .ok_or_else(|| SyncError::invalid(format!("not a repository URL: {url}")))?;

        let mut segments = rest.split('/').filter(|s| !s.is_empty());
        let owner = segments
            .next()
            .ok_or_else(|| SyncError::invalid(format!("missing owner in URL: {url}")))?;
        let name = segments
            .next()
            .map(|n| n.trim_end_matches(".git"))
            .filter(|n| !n.is_empty())
            .ok_or_else(|| SyncError::invalid(format!("missing repository in URL: {url}")))?;

        Ok(Self::new(owner, name))
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Repository metadata returned by an existence probe or creation
#[derive(Debug, Clone, Deserialize)]
pub struct RepoInfo {
    pub default_branch: String,
    pub html_url: String,
}

/// How the bytes in a [`FileEntry`] are encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentEncoding {
    /// Raw bytes (not necessarily valid UTF-8 despite the name)
    Utf8,
    /// Content is already base64 text, ready for the wire
    Base64,
}

/// One file queued for transfer
///
/// Immutable once constructed for a given transfer attempt.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub path: String,
    pub content: Bytes,
    pub encoding: ContentEncoding,
}

impl FileEntry {
    pub fn text(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: Bytes::from(content.into()),
            encoding: ContentEncoding::Utf8,
        }
    }

    pub fn binary(path: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            encoding: ContentEncoding::Utf8,
        }
    }

    /// Content that is already base64-encoded (e.g. straight off the wire)
    pub fn base64(path: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            encoding: ContentEncoding::Base64,
        }
    }
}

/// Validate a slash-separated repository path
///
/// Rejects empty paths, traversal segments, absolute paths, backslashes
/// and NUL bytes. Returns the path unchanged on success.
pub fn validate_path(path: &str) -> Result<&str> {
    if path.is_empty() {
        return Err(SyncError::invalid("path is empty"));
    }
    if path.starts_with('/') {
        return Err(SyncError::invalid(format!("path is absolute: {path}")));
    }
    if path.contains('\\') || path.contains('\0') {
        return Err(SyncError::invalid(format!(
            "path contains illegal characters: {path}"
        )));
    }
    if path.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..") {
        return Err(SyncError::invalid(format!(
            "path contains traversal or empty segments: {path}"
        )));
    }
    Ok(path)
}

/// Revision token for an existing remote path
///
/// Required to overwrite the path; its absence means "create new".
#[derive(Debug, Clone)]
pub struct RemoteFileHandle {
    pub path: String,
    pub sha: String,
}

/// Decoded content of a remote file plus its revision token
#[derive(Debug, Clone)]
pub struct RemoteContent {
    pub content: Bytes,
    pub sha: String,
}

/// Type of tree entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Blob,
    Tree,
}

/// One entry of a recursive tree listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
}

/// Result of one attempted file write
#[derive(Debug, Clone, Serialize)]
pub struct TransferOutcome {
    pub path: String,
    pub success: bool,
    pub error: Option<String>,
}

/// Aggregate counts for a batch transfer
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TransferSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

/// Per-path outcomes plus summary counts for a batch transfer
///
/// Never collapsed into a single pass/fail: one file failing does not
/// make the batch an error.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub outcomes: Vec<TransferOutcome>,
    pub summary: TransferSummary,
}

impl BatchReport {
    pub fn from_outcomes(outcomes: Vec<TransferOutcome>) -> Self {
        let successful = outcomes.iter().filter(|o| o.success).count();
        let summary = TransferSummary {
            total: outcomes.len(),
            successful,
            failed: outcomes.len() - successful,
        };
        Self { outcomes, summary }
    }
}

/// How an import treats an existing destination repository
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Reuse or create the destination, never delete
    Add,
    /// Delete an existing destination and recreate it from scratch
    Overwrite,
}

/// Counts reported after a branch-to-branch sync
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SyncReport {
    pub files_synced: usize,
    pub total_files: usize,
}

/// One branch of a repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchInfo {
    pub name: String,
    pub sha: String,
}

/// Result of a successful create-and-push
#[derive(Debug, Clone, Serialize)]
pub struct PushOutcome {
    pub repository_url: String,
    pub repository_name: String,
}

/// Result of a repository name probe
#[derive(Debug, Clone, Copy, Serialize)]
pub struct NameAvailability {
    pub exists: bool,
    pub available: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url() {
        let repo = RepoRef::parse_url("https://github.com/octocat/hello-world").unwrap();
        assert_eq!(repo.owner, "octocat");
        assert_eq!(repo.name, "hello-world");

        let repo = RepoRef::parse_url("https://github.com/octocat/hello.git").unwrap();
        assert_eq!(repo.name, "hello");

        // Extra path segments are ignored
        let repo = RepoRef::parse_url("https://github.com/octocat/hello/tree/main").unwrap();
        assert_eq!(repo.name, "hello");
    }

    #[test]
    fn test_parse_url_invalid() {
        assert!(matches!(
            RepoRef::parse_url("https://example.com/foo/bar"),
            Err(SyncError::Invalid { .. })
        ));
        assert!(matches!(
            RepoRef::parse_url("https://github.com/onlyowner"),
            Err(SyncError::Invalid { .. })
        ));
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("README.md").is_ok());
        assert!(validate_path("src/lib.rs").is_ok());
        assert!(validate_path("a/b/c.txt").is_ok());

        assert!(validate_path("").is_err());
        assert!(validate_path("/etc/passwd").is_err());
        assert!(validate_path("../escape").is_err());
        assert!(validate_path("dir/../escape").is_err());
        assert!(validate_path("dir//double").is_err());
        assert!(validate_path("win\\path").is_err());
        assert!(validate_path("nul\0byte").is_err());
    }

    #[test]
    fn test_batch_report_counts() {
        let report = BatchReport::from_outcomes(vec![
            TransferOutcome {
                path: "a".into(),
                success: true,
                error: None,
            },
            TransferOutcome {
                path: "b".into(),
                success: false,
                error: Some("boom".into()),
            },
        ]);
        assert_eq!(report.summary.total, 2);
        assert_eq!(report.summary.successful, 1);
        assert_eq!(report.summary.failed, 1);
    }
}
