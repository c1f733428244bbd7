use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use tracing::{info, warn};

use crate::{
    error::{Result, SyncError},
    provision::{provision, RetryPolicy},
    store::ContentStore,
    sync::sync_branch,
    transfer::{transfer, MessagePolicy},
    tree::{enumerate_blobs, MAX_IMPORT_FILES},
    types::{
        validate_path, BatchReport, BranchInfo, FileEntry, ImportMode, NameAvailability,
        PushOutcome, RepoRef, SyncReport,
    },
};

/// Most files accepted in one upload batch
pub const MAX_UPLOAD_FILES: usize = 100;

const DEFAULT_BRANCH: &str = "main";

/// Where the files for a push come from
#[derive(Debug, Clone)]
pub enum PushSource {
    /// An inline or archive-derived file map, already in memory
    Files(Vec<FileEntry>),
    /// Another repository's contents, enumerated and fetched remotely
    RemoteRepository(RepoRef),
}

/// Request parameters for [`RepoService::create_and_push`]
#[derive(Debug, Clone)]
pub struct PushParams {
    pub repository_name: String,
    /// Defaults to `main` when unset
    pub target_branch: Option<String>,
    pub mode: ImportMode,
    pub source: PushSource,
}

/// Request parameters for [`RepoService::sync_contents`]
///
/// Both repositories belong to the authenticated account.
#[derive(Debug, Clone)]
pub struct SyncParams {
    pub source_repo: String,
    pub source_branch: String,
    pub dest_repo: String,
    pub dest_branch: String,
}

/// Entry point for the push/sync use cases
///
/// Holds the store (which carries the opaque credential) and the
/// authenticated account name; everything else arrives as
/// request-scoped parameters. One method per use case, plain
/// request/response, no ambient state.
pub struct RepoService {
    store: Arc<dyn ContentStore>,
    account: String,
    retry: RetryPolicy,
}

impl RepoService {
    pub fn new(store: Arc<dyn ContentStore>, account: impl Into<String>) -> Self {
        Self {
            store,
            account: account.into(),
            retry: RetryPolicy::deletion_settle(),
        }
    }

    /// Override the deletion-settle polling strategy
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn owned_repo(&self, name: &str) -> RepoRef {
        RepoRef::new(&self.account, name)
    }

    /// Provision the destination repository and push the source files
    ///
    /// Structural failures (cannot provision, source tree too large,
    /// invalid paths) abort before any file is written. Per-file write
    /// failures are recorded in the transfer outcomes and logged, not
    /// raised.
    pub async fn create_and_push(&self, params: PushParams) -> Result<PushOutcome> {
        if params.repository_name.trim().is_empty() {
            return Err(SyncError::invalid("repository name is required"));
        }

        let dest = self.owned_repo(&params.repository_name);
        let branch = params
            .target_branch
            .as_deref()
            .unwrap_or(DEFAULT_BRANCH)
            .to_string();

        if let PushSource::Files(files) = &params.source {
            for file in files {
                validate_path(&file.path)?;
            }
        }

        info!(
            dest = %dest, branch = %branch, mode = ?params.mode,
            "provisioning destination repository"
        );
        let repo_info = provision(&*self.store, params.mode, &dest, &branch, &self.retry).await?;

        let files = match params.source {
            PushSource::Files(files) => files,
            PushSource::RemoteRepository(source) => self.collect_remote_files(&source).await?,
        };

        if !files.is_empty() {
            let report = transfer(&*self.store, &dest, &branch, &files, &MessagePolicy::Add).await;
            info!(
                dest = %dest,
                successful = report.summary.successful,
                failed = report.summary.failed,
                "push complete"
            );
        }

        Ok(PushOutcome {
            repository_url: repo_info.html_url,
            repository_name: dest.name,
        })
    }

    /// Enumerate a source repository and pull every blob into memory
    ///
    /// Uses the source's default branch; the enumerator still falls back
    /// to the conventional secondary name if the ref does not resolve.
    /// A blob whose content fetch fails is skipped, mirroring the
    /// partial-tolerance of the write side.
    async fn collect_remote_files(&self, source: &RepoRef) -> Result<Vec<FileEntry>> {
        let source_info = self
            .store
            .get_repository(source)
            .await?
            .ok_or_else(|| SyncError::not_found(source.full_name()))?;
        let source_branch = source_info.default_branch;

        let blobs =
            enumerate_blobs(&*self.store, source, &source_branch, MAX_IMPORT_FILES).await?;

        let mut files = Vec::with_capacity(blobs.len());
        for blob in blobs {
            match self.store.get_file(source, &blob.path, &source_branch).await {
                Ok(remote) => files.push(FileEntry::binary(blob.path, remote.content)),
                Err(e) => {
                    warn!(source = %source, path = %blob.path, error = %e, "skipping unfetchable file")
                }
            }
        }

        info!(source = %source, files = files.len(), "collected source repository contents");
        Ok(files)
    }

    /// Copy one branch's contents into another under this account
    pub async fn sync_contents(&self, params: SyncParams) -> Result<SyncReport> {
        let source = self.owned_repo(&params.source_repo);
        let dest = self.owned_repo(&params.dest_repo);
        sync_branch(
            &*self.store,
            &source,
            &params.source_branch,
            &dest,
            &params.dest_branch,
        )
        .await
    }

    /// Write a batch of files to an existing repository branch
    ///
    /// One custom message applies to every file when given; otherwise
    /// each file gets its own `Upload {path}` message.
    pub async fn upload_batch(
        &self,
        dest: &RepoRef,
        branch: &str,
        files: Vec<FileEntry>,
        message: Option<String>,
    ) -> Result<BatchReport> {
        if files.len() > MAX_UPLOAD_FILES {
            return Err(SyncError::TooLarge {
                count: files.len(),
                limit: MAX_UPLOAD_FILES,
            });
        }
        for file in &files {
            validate_path(&file.path)?;
        }

        let policy = match message {
            Some(message) => MessagePolicy::Fixed(message),
            None => MessagePolicy::Upload,
        };
        Ok(transfer(&*self.store, dest, branch, &files, &policy).await)
    }

    /// Create a single new file; an existing path is a `Conflict`
    pub async fn create_single_file(
        &self,
        dest: &RepoRef,
        branch: &str,
        path: &str,
        content: &[u8],
        message: Option<String>,
    ) -> Result<()> {
        validate_path(path)?;

        let encoded = BASE64.encode(content);
        let message = message.unwrap_or_else(|| MessagePolicy::Create.render(path));

        // Deliberately tokenless: creation must fail on an existing path
        self.store
            .put_file(dest, path, &encoded, &message, branch, None)
            .await
    }

    /// Delete a single file at a known revision
    pub async fn delete_single_file(
        &self,
        dest: &RepoRef,
        branch: &str,
        path: &str,
        sha: &str,
        message: Option<String>,
    ) -> Result<()> {
        validate_path(path)?;
        let message = message.unwrap_or_else(|| format!("Delete {path}"));
        self.store.delete_file(dest, path, sha, &message, branch).await
    }

    /// List the branches of a repository
    pub async fn list_branches(&self, repo: &RepoRef) -> Result<Vec<BranchInfo>> {
        self.store.list_branches(repo).await
    }

    /// Check whether a repository name is free under this account
    pub async fn check_name_availability(&self, name: &str) -> Result<NameAvailability> {
        if name.trim().is_empty() {
            return Err(SyncError::invalid("repository name is required"));
        }
        let exists = self
            .store
            .get_repository(&self.owned_repo(name))
            .await?
            .is_some();
        Ok(NameAvailability {
            exists,
            available: !exists,
        })
    }
}
