use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use tracing::{debug, warn};

use crate::{
    error::{Result, SyncError},
    store::ContentStore,
    types::{BatchReport, ContentEncoding, FileEntry, RemoteFileHandle, RepoRef, TransferOutcome},
};

/// Commit message shape applied to each written file
#[derive(Debug, Clone)]
pub enum MessagePolicy {
    /// `Create {path}`
    Create,
    /// `Add {path}`
    Add,
    /// `Upload {path}`
    Upload,
    /// The same message for every file
    Fixed(String),
    /// `Sync: Merged {path} from {repo}:{branch}`
    SyncFrom { repo: String, branch: String },
}

impl MessagePolicy {
    pub fn render(&self, path: &str) -> String {
        match self {
            MessagePolicy::Create => format!("Create {path}"),
            MessagePolicy::Add => format!("Add {path}"),
            MessagePolicy::Upload => format!("Upload {path}"),
            MessagePolicy::Fixed(message) => message.clone(),
            MessagePolicy::SyncFrom { repo, branch } => {
                format!("Sync: Merged {path} from {repo}:{branch}")
            }
        }
    }
}

/// Look up the revision token for a path on a branch, if the path exists
///
/// Absence is data (`None`), anything else is a real error. The token
/// must be fetched immediately before the corresponding write; caching
/// it would widen the race window against concurrent external edits.
pub async fn lookup_handle(
    store: &dyn ContentStore,
    repo: &RepoRef,
    path: &str,
    branch: &str,
) -> Result<Option<RemoteFileHandle>> {
    match store.get_file(repo, path, branch).await {
        Ok(remote) => Ok(Some(RemoteFileHandle {
            path: path.to_string(),
            sha: remote.sha,
        })),
        Err(SyncError::NotFound { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Normalize a file entry's content to base64 wire text
///
/// Byte-safe: `Utf8` entries are raw bytes run through the encoder (the
/// bytes need not actually be valid UTF-8); `Base64` entries are already
/// wire text and pass through.
fn encode_content(file: &FileEntry) -> Result<String> {
    match file.encoding {
        ContentEncoding::Utf8 => Ok(BASE64.encode(&file.content)),
        ContentEncoding::Base64 => String::from_utf8(file.content.to_vec())
            .map_err(|_| SyncError::invalid(format!("base64 entry is not ASCII: {}", file.path))),
    }
}

/// Write one file, probing for an existing revision first
///
/// The probe decides create vs. update: a path left behind by a
/// partially completed prior run is updated with its current token
/// rather than tripping a duplicate-create conflict.
async fn transfer_one(
    store: &dyn ContentStore,
    dest: &RepoRef,
    branch: &str,
    file: &FileEntry,
    policy: &MessagePolicy,
) -> Result<()> {
    let handle = lookup_handle(store, dest, &file.path, branch).await?;
    let content = encode_content(file)?;
    let message = policy.render(&file.path);

    store
        .put_file(
            dest,
            &file.path,
            &content,
            &message,
            branch,
            handle.as_ref().map(|h| h.sha.as_str()),
        )
        .await
}

/// Write a batch of files to a destination branch
///
/// Files are processed independently; a failure is recorded in that
/// file's [`TransferOutcome`] and never aborts the rest of the batch.
/// The report carries one outcome per input file, in input order.
pub async fn transfer(
    store: &dyn ContentStore,
    dest: &RepoRef,
    branch: &str,
    files: &[FileEntry],
    policy: &MessagePolicy,
) -> BatchReport {
    let mut outcomes = Vec::with_capacity(files.len());

    for file in files {
        match transfer_one(store, dest, branch, file, policy).await {
            Ok(()) => {
                debug!(dest = %dest, path = %file.path, "file written");
                outcomes.push(TransferOutcome {
                    path: file.path.clone(),
                    success: true,
                    error: None,
                });
            }
            Err(e) => {
                warn!(dest = %dest, path = %file.path, error = %e, "file write failed");
                outcomes.push(TransferOutcome {
                    path: file.path.clone(),
                    success: false,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    BatchReport::from_outcomes(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn test_message_policy_render() {
        assert_eq!(MessagePolicy::Create.render("a.txt"), "Create a.txt");
        assert_eq!(MessagePolicy::Add.render("a.txt"), "Add a.txt");
        assert_eq!(MessagePolicy::Upload.render("a.txt"), "Upload a.txt");
        assert_eq!(
            MessagePolicy::Fixed("Initial import".into()).render("a.txt"),
            "Initial import"
        );
        assert_eq!(
            MessagePolicy::SyncFrom {
                repo: "upstream".into(),
                branch: "main".into()
            }
            .render("a.txt"),
            "Sync: Merged a.txt from upstream:main"
        );
    }

    #[test]
    fn test_encode_content_binary_safe() {
        // Not valid UTF-8, must still encode
        let file = FileEntry::binary("blob.bin", Bytes::from_static(&[0xff, 0x00, 0x80]));
        assert_eq!(encode_content(&file).unwrap(), "/wCA");
    }

    #[test]
    fn test_encode_content_passthrough() {
        let file = FileEntry::base64("a.txt", Bytes::from_static(b"aGVsbG8="));
        assert_eq!(encode_content(&file).unwrap(), "aGVsbG8=");
    }
}
