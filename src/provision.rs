use std::time::Duration;

use tracing::{info, warn};

use crate::{
    branch::ensure_branch,
    error::{Result, SyncError},
    store::ContentStore,
    types::{ImportMode, RepoInfo, RepoRef},
};

/// Bounded retry strategy for operations that settle eventually
///
/// Configured by the caller and passed in explicitly; no inline timers.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    /// Polling cadence for confirming a repository deletion has settled
    ///
    /// Remote deletions are eventually consistent; ten half-second polls
    /// cover the window the provider usually needs.
    pub fn deletion_settle() -> Self {
        Self {
            max_attempts: 10,
            delay: Duration::from_millis(500),
        }
    }
}

/// Poll until the repository is confirmed absent
async fn await_deletion(
    store: &dyn ContentStore,
    repo: &RepoRef,
    retry: &RetryPolicy,
) -> Result<()> {
    for attempt in 1..=retry.max_attempts {
        if store.get_repository(repo).await?.is_none() {
            return Ok(());
        }
        warn!(repo = %repo, attempt, "deletion not yet settled");
        tokio::time::sleep(retry.delay).await;
    }
    Err(SyncError::Upstream {
        status: 0,
        message: format!(
            "repository {} still present after {} deletion polls",
            repo.full_name(),
            retry.max_attempts
        ),
    })
}

async fn create_with_branch(
    store: &dyn ContentStore,
    repo: &RepoRef,
    branch: &str,
) -> Result<RepoInfo> {
    let info = store.create_repository(&repo.name).await?;
    info!(repo = %repo, url = %info.html_url, "repository created");

    // Creation auto-initializes the default branch; only a differently
    // named target needs an explicit ref
    if branch != info.default_branch {
        ensure_branch(store, repo, branch).await?;
    }
    Ok(info)
}

/// Resolve the destination repository for an import
///
/// State machine over (mode, existence):
/// - absent: create, then ensure the target branch
/// - `Add` + present: reuse, ensure the target branch
/// - `Overwrite` + present: delete, wait for the deletion to settle,
///   recreate, ensure the target branch
///
/// A deletion rejected for missing scope surfaces as
/// `InsufficientScope` and never falls through to recreation: the
/// repository still legitimately exists.
pub async fn provision(
    store: &dyn ContentStore,
    mode: ImportMode,
    repo: &RepoRef,
    branch: &str,
    retry: &RetryPolicy,
) -> Result<RepoInfo> {
    let existing = store.get_repository(repo).await?;

    match (mode, existing) {
        (_, None) => {
            info!(repo = %repo, "repository absent, creating");
            create_with_branch(store, repo, branch).await
        }
        (ImportMode::Add, Some(info)) => {
            info!(repo = %repo, "add mode, reusing existing repository");
            ensure_branch(store, repo, branch).await?;
            Ok(info)
        }
        (ImportMode::Overwrite, Some(_)) => {
            info!(repo = %repo, "overwrite mode, deleting existing repository");
            store.delete_repository(repo).await?;
            await_deletion(store, repo, retry).await?;
            create_with_branch(store, repo, branch).await
        }
    }
}
