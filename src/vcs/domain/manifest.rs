//! Repository metadata used to plan a sandbox.

use serde_json::Value;

/// Top-level manifests found in a repository.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepoManifest {
    package_json: Option<Value>,
    requirements_txt: Option<String>,
}

impl RepoManifest {
    /// Creates an empty manifest, meaning no recognised project files.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a parsed `package.json`.
    #[must_use]
    pub fn with_package_json(mut self, package_json: Value) -> Self {
        self.package_json = Some(package_json);
        self
    }

    /// Attaches the contents of `requirements.txt`.
    #[must_use]
    pub fn with_requirements(mut self, requirements: impl Into<String>) -> Self {
        self.requirements_txt = Some(requirements.into());
        self
    }

    /// Returns the parsed `package.json`.
    #[must_use]
    pub const fn package_json(&self) -> Option<&Value> {
        self.package_json.as_ref()
    }

    /// Returns the raw `requirements.txt`.
    #[must_use]
    pub fn requirements(&self) -> Option<&str> {
        self.requirements_txt.as_deref()
    }

    /// Returns `true` when `package.json` declares `name` as a runtime or
    /// development dependency.
    #[must_use]
    pub fn has_node_dependency(&self, name: &str) -> bool {
        let Some(package) = &self.package_json else {
            return false;
        };
        ["dependencies", "devDependencies"]
            .iter()
            .filter_map(|section| package.get(section))
            .any(|deps| deps.get(name).is_some())
    }

    /// Returns the `scripts.<name>` entry of `package.json`.
    #[must_use]
    pub fn script(&self, name: &str) -> Option<&str> {
        self.package_json
            .as_ref()?
            .get("scripts")?
            .get(name)?
            .as_str()
    }

    /// Returns `true` when `requirements.txt` pins `name`.
    #[must_use]
    pub fn has_python_requirement(&self, name: &str) -> bool {
        self.requirements_txt.as_deref().is_some_and(|requirements| {
            requirements.lines().any(|line| {
                let package = line
                    .split(['=', '<', '>', '~', '!', '[', ';', ' '])
                    .next()
                    .unwrap_or_default();
                package.trim().eq_ignore_ascii_case(name)
            })
        })
    }
}
