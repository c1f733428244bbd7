pub mod branch;
pub mod error;
pub mod github;
pub mod provision;
pub mod service;
pub mod store;
pub mod sync;
pub mod transfer;
pub mod tree;
pub mod types;

pub use branch::ensure_branch;
pub use error::{Result, SyncError};
pub use github::GitHubStore;
pub use provision::{provision, RetryPolicy};
pub use service::{PushParams, PushSource, RepoService, SyncParams, MAX_UPLOAD_FILES};
pub use store::ContentStore;
pub use sync::sync_branch;
pub use transfer::{lookup_handle, transfer, MessagePolicy};
pub use tree::{enumerate_blobs, FALLBACK_BRANCH, MAX_IMPORT_FILES, MAX_SYNC_FILES};
pub use types::{
    validate_path, BatchReport, BranchInfo, ContentEncoding, EntryType, FileEntry, ImportMode,
    NameAvailability, PushOutcome, RemoteContent, RemoteFileHandle, RepoInfo, RepoRef, SyncReport,
    TransferOutcome, TransferSummary, TreeEntry,
};
