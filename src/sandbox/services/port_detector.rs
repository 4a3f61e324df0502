//! Dev server port inference from repository manifests.

use crate::vcs::domain::RepoManifest;

/// Port used when nothing more specific is detected.
pub const DEFAULT_DEV_PORT: u16 = 3000;

/// Node frameworks checked in order; the first declared dependency wins.
const NODE_FRAMEWORK_PORTS: &[(&str, u16)] = &[
    ("vite", 5173),
    ("@sveltejs/kit", 5173),
    ("next", 3000),
    ("nuxt", 3000),
    ("astro", 4321),
    ("@angular/core", 4200),
    ("gatsby", 8000),
    ("react-scripts", 3000),
];

const PYTHON_FRAMEWORK_PORTS: &[(&str, u16)] = &[("flask", 5000), ("django", 8000), ("fastapi", 8000)];

/// Infers the port the project's dev server binds to.
///
/// An explicit `--port`/`-p` flag in the `dev` script takes precedence over
/// framework defaults.
///
/// ```
/// use atelier::sandbox::services::detect_port;
/// use atelier::vcs::domain::RepoManifest;
///
/// let manifest = RepoManifest::new().with_package_json(serde_json::json!({
///     "devDependencies": { "vite": "^5.0.0" }
/// }));
/// assert_eq!(detect_port(&manifest), 5173);
/// assert_eq!(detect_port(&RepoManifest::new()), 3000);
/// ```
#[must_use]
pub fn detect_port(manifest: &RepoManifest) -> u16 {
    if let Some(port) = manifest.script("dev").and_then(explicit_port) {
        return port;
    }
    if let Some(port) = NODE_FRAMEWORK_PORTS
        .iter()
        .find(|(name, _)| manifest.has_node_dependency(name))
        .map(|(_, port)| *port)
    {
        return port;
    }
    PYTHON_FRAMEWORK_PORTS
        .iter()
        .find(|(name, _)| manifest.has_python_requirement(name))
        .map_or(DEFAULT_DEV_PORT, |(_, port)| *port)
}

fn explicit_port(script: &str) -> Option<u16> {
    let mut tokens = script.split_whitespace();
    while let Some(token) = tokens.next() {
        if let Some(value) = token.strip_prefix("--port=") {
            return value.parse().ok();
        }
        if token == "--port" || token == "-p" {
            return tokens.next().and_then(|value| value.parse().ok());
        }
    }
    None
}
