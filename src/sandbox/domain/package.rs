//! Package managers used to install project dependencies.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::SandboxCommand;

/// JavaScript package manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    /// npm, always available in the Node image.
    #[default]
    Npm,
    /// pnpm.
    Pnpm,
    /// Yarn.
    Yarn,
    /// Bun.
    Bun,
}

impl PackageManager {
    /// Lockfiles in detection order, paired with their manager.
    pub const LOCKFILES: [(&'static str, Self); 5] = [
        ("pnpm-lock.yaml", Self::Pnpm),
        ("yarn.lock", Self::Yarn),
        ("bun.lockb", Self::Bun),
        ("bun.lock", Self::Bun),
        ("package-lock.json", Self::Npm),
    ];

    /// Returns the executable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Pnpm => "pnpm",
            Self::Yarn => "yarn",
            Self::Bun => "bun",
        }
    }

    /// Returns the install command.
    #[must_use]
    pub fn install_command(self) -> SandboxCommand {
        SandboxCommand::new(self.as_str()).arg("install")
    }

    /// Returns the command that runs `script` from `package.json`.
    #[must_use]
    pub fn run_script(self, script: &str) -> SandboxCommand {
        SandboxCommand::new(self.as_str()).args(["run", script])
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
