//! Follow-up prompt rendering with conversation context.

use crate::task::domain::TaskMessage;
use minijinja::{Environment, context};
use thiserror::Error;

/// Template for follow-up prompts sent to a non-resumed agent session.
pub const FOLLOW_UP_TEMPLATE: &str = "\
{%- if history -%}
Previous conversation:
{% for entry in history %}
{{ entry.role }}: {{ entry.content }}
{% endfor %}
Follow-up request:
{% endif -%}
{{ message }}";

/// Template rendering failure.
#[derive(Debug, Clone, Error)]
#[error("failed to render follow-up prompt: {0}")]
pub struct FollowUpError(String);

/// Renders `message` with `history` (oldest first) as context.
///
/// # Errors
///
/// Returns [`FollowUpError`] when the template cannot be rendered.
pub fn render_follow_up(message: &str, history: &[TaskMessage]) -> Result<String, FollowUpError> {
    let entries: Vec<_> = history
        .iter()
        .map(|entry| {
            context! {
                role => entry.role().as_str(),
                content => entry.content().trim(),
            }
        })
        .collect();

    let environment = Environment::new();
    environment
        .render_str(
            FOLLOW_UP_TEMPLATE,
            context! { history => entries, message => message.trim() },
        )
        .map_err(|error| FollowUpError(error.to_string()))
}
