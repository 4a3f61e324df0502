//! Prompt text that is safe to hand to an agent command line.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prompt text with shell and flag metacharacters neutralised.
///
/// Backticks become single quotes, `$` and `\` are removed, and every line
/// starting with `-` gains a leading space so the agent CLI cannot read it as
/// a flag.
///
/// # Examples
///
///     use atelier::agent::domain::SanitizedPrompt;
///
///     let prompt = SanitizedPrompt::new("run `ls` on $HOME\n--force");
///     assert_eq!(prompt.as_str(), "run 'ls' on HOME\n --force");
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SanitizedPrompt(String);

impl SanitizedPrompt {
    /// Sanitises raw user text.
    #[must_use]
    pub fn new(raw: &str) -> Self {
        let cleaned: String = raw
            .chars()
            .filter(|ch| !matches!(ch, '$' | '\\'))
            .map(|ch| if ch == '`' { '\'' } else { ch })
            .collect();

        let lines: Vec<String> = cleaned
            .split('\n')
            .map(|line| {
                if line.starts_with('-') {
                    format!(" {line}")
                } else {
                    line.to_owned()
                }
            })
            .collect();

        Self(lines.join("\n"))
    }

    /// Returns the sanitised text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the prompt and returns its text.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SanitizedPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
