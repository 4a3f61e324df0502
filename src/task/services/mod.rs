//! Application services for task progress reporting.

mod progress;

pub use progress::ProgressLogger;
