//! Agent services.

mod followup;

pub use followup::{FOLLOW_UP_TEMPLATE, FollowUpError, render_follow_up};
