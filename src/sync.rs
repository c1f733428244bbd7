use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use tracing::{info, warn};

use crate::{
    branch::ensure_branch,
    error::Result,
    store::ContentStore,
    transfer::{lookup_handle, MessagePolicy},
    tree::{enumerate_blobs, MAX_SYNC_FILES},
    types::{RepoRef, SyncReport},
};

/// Copy the contents of one branch into another
///
/// Ensures the destination branch exists, enumerates the source tree
/// (bounded by [`MAX_SYNC_FILES`], checked before any content moves),
/// then per blob: fetch from the source, probe the destination for a
/// revision token, write. Individual file failures are logged and
/// skipped; only counts survive into the report.
pub async fn sync_branch(
    store: &dyn ContentStore,
    source: &RepoRef,
    source_branch: &str,
    dest: &RepoRef,
    dest_branch: &str,
) -> Result<SyncReport> {
    info!(
        source = %source, source_branch,
        dest = %dest, dest_branch,
        "syncing branch contents"
    );

    ensure_branch(store, dest, dest_branch).await?;

    let blobs = enumerate_blobs(store, source, source_branch, MAX_SYNC_FILES).await?;
    let total_files = blobs.len();

    let policy = MessagePolicy::SyncFrom {
        repo: source.name.clone(),
        branch: source_branch.to_string(),
    };

    let mut files_synced = 0;
    for blob in &blobs {
        let result = async {
            let remote = store.get_file(source, &blob.path, source_branch).await?;
            let handle = lookup_handle(store, dest, &blob.path, dest_branch).await?;
            let content = BASE64.encode(&remote.content);
            store
                .put_file(
                    dest,
                    &blob.path,
                    &content,
                    &policy.render(&blob.path),
                    dest_branch,
                    handle.as_ref().map(|h| h.sha.as_str()),
                )
                .await
        }
        .await;

        match result {
            Ok(()) => files_synced += 1,
            Err(e) => warn!(path = %blob.path, error = %e, "failed to sync file"),
        }
    }

    info!(files_synced, total_files, "sync complete");
    Ok(SyncReport {
        files_synced,
        total_files,
    })
}
