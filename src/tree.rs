use tracing::{debug, warn};

use crate::{
    error::{Result, SyncError},
    store::ContentStore,
    types::{EntryType, RepoRef, TreeEntry},
};

/// Ceiling for a whole-repository import
pub const MAX_IMPORT_FILES: usize = 500;

/// Ceiling for a branch-to-branch sync
pub const MAX_SYNC_FILES: usize = 100;

/// Conventional secondary default branch tried when the requested ref
/// does not resolve
pub const FALLBACK_BRANCH: &str = "master";

/// Enumerate the blob entries of a branch, bounded by `max_files`
///
/// Fetches the recursive tree and filters out directories. When the
/// requested ref does not resolve, retries once against
/// [`FALLBACK_BRANCH`] before surfacing `NotFound` (repositories predate
/// the current default-branch convention often enough to warrant it).
///
/// The ceiling is checked before any content is fetched: exceeding it
/// returns `SyncError::TooLarge { count, limit }` with zero per-file
/// calls made.
pub async fn enumerate_blobs(
    store: &dyn ContentStore,
    repo: &RepoRef,
    branch: &str,
    max_files: usize,
) -> Result<Vec<TreeEntry>> {
    let tree = match store.get_tree(repo, branch).await {
        Ok(tree) => tree,
        Err(SyncError::NotFound { .. }) if branch != FALLBACK_BRANCH => {
            warn!(repo = %repo, branch, "ref not resolvable, retrying fallback branch");
            store.get_tree(repo, FALLBACK_BRANCH).await?
        }
        Err(e) => return Err(e),
    };

    let blobs: Vec<TreeEntry> = tree
        .into_iter()
        .filter(|entry| entry.entry_type == EntryType::Blob)
        .collect();

    if blobs.len() > max_files {
        return Err(SyncError::TooLarge {
            count: blobs.len(),
            limit: max_files,
        });
    }

    debug!(repo = %repo, branch, files = blobs.len(), "enumerated source tree");
    Ok(blobs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ceilings() {
        // Import allows a larger working set than the per-sync bound
        assert!(MAX_IMPORT_FILES > MAX_SYNC_FILES);
    }
}
