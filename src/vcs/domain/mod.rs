//! Domain values for publishing sandbox work to version control.

mod commit;
mod manifest;

pub use commit::{CommitContext, DEFAULT_COMMIT_MESSAGE, fallback_commit_message};
pub use manifest::RepoManifest;
