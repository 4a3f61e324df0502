//! Port contracts for version control collaborators.

mod branch_name;
mod commit_message;
mod inspector;
mod publisher;

pub use branch_name::BranchNameGenerator;
pub use commit_message::{CommitMessageError, CommitMessageGenerator};
pub use inspector::{RepositoryInspector, RepositoryInspectorError};
pub use publisher::{GitPublisher, PushError, PushOutcome};

#[cfg(test)]
pub use commit_message::MockCommitMessageGenerator;
