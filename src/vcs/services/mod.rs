//! Version control services.

mod commit_message;

pub use commit_message::CommitMessageResolver;
