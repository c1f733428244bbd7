use tracing::{debug, info};

use crate::{
    error::{Result, SyncError},
    store::ContentStore,
    types::RepoRef,
};

/// Ensure a branch exists, creating it from the default branch if absent
///
/// Idempotent: the common fast path is a single existence probe. When the
/// branch is missing it is created at the default branch's tip commit.
/// A concurrent creation racing this one surfaces from the store as a
/// `Conflict`, which is treated as success since the intent is satisfied.
pub async fn ensure_branch(store: &dyn ContentStore, repo: &RepoRef, branch: &str) -> Result<()> {
    if store.branch_exists(repo, branch).await? {
        debug!(repo = %repo, branch, "branch already exists");
        return Ok(());
    }

    info!(repo = %repo, branch, "creating branch from default");

    let info = store
        .get_repository(repo)
        .await?
        .ok_or_else(|| SyncError::not_found(repo.full_name()))?;
    let tip = store.ref_tip(repo, &info.default_branch).await?;

    match store.create_branch(repo, branch, &tip).await {
        // Someone else created it first; the branch exists either way
        Err(SyncError::Conflict { .. }) => Ok(()),
        other => other,
    }
}
