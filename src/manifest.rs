//! The package manifest document and its definition workflow.
//!
//! A [`Manifest`] is an explicit value: it is created by [`define`] (or
//! [`Manifest::new`]), mutated through its methods, persisted as pretty
//! printed JSON, and reloaded later by the install-time runner. The list
//! fields (`files`, `extensions`, `dependencies`) are ordered and set-like;
//! all mutation goes through deduplicating methods.

use std::fs;
use std::path::{Path, PathBuf};

use semver::VersionReq;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::hooks::HookAction;

/// File name suffix for persisted manifest documents.
pub const MANIFEST_SUFFIX: &str = ".manifest.json";

// ---------------------------------------------------------------------------
// Data model
// ---------------------------------------------------------------------------

/// A dependency on another package, pinned by a semver requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    pub requirement: VersionReq,
}

/// A package manifest: identity, content lists, and deferred post-install
/// actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub name: String,
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,

    /// Files shipped with the package. Ordered, no duplicates.
    #[serde(default)]
    files: Vec<PathBuf>,

    /// Extension scripts the install toolchain executes after unpacking.
    /// Ordered, no duplicates.
    #[serde(default)]
    extensions: Vec<PathBuf>,

    #[serde(default)]
    dependencies: Vec<Dependency>,

    /// Deferred actions to run after installation, in registration order.
    #[serde(default)]
    pub(crate) post_install: Vec<HookAction>,

    /// Whether the install hook has been wired for this instance.
    /// Per-instance state, never persisted.
    #[serde(skip)]
    pub(crate) hook_installed: bool,
}

impl Manifest {
    /// Create an empty manifest with the given identity.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            homepage: None,
            files: Vec::new(),
            extensions: Vec::new(),
            dependencies: Vec::new(),
            post_install: Vec::new(),
            hook_installed: false,
        }
    }

    // -- persistence -------------------------------------------------------

    /// Load a manifest from a JSON document at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        let manifest = serde_json::from_str(&contents)?;
        Ok(manifest)
    }

    /// Write the manifest as pretty-printed JSON to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let pretty = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), pretty)?;
        Ok(())
    }

    // -- content lists -----------------------------------------------------

    /// Append `file` to the shipped-file list unless already present.
    pub fn push_file(&mut self, file: impl Into<PathBuf>) {
        let file = file.into();
        if !self.files.contains(&file) {
            self.files.push(file);
        }
    }

    /// Append `file` to the extension list unless already present.
    pub fn push_extension(&mut self, file: impl Into<PathBuf>) {
        let file = file.into();
        if !self.extensions.contains(&file) {
            self.extensions.push(file);
        }
    }

    /// Declare a dependency. A package already declared is left untouched.
    pub fn add_dependency(&mut self, name: impl Into<String>, requirement: VersionReq) {
        let name = name.into();
        if !self.dependencies.iter().any(|d| d.name == name) {
            self.dependencies.push(Dependency { name, requirement });
        }
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn extensions(&self) -> &[PathBuf] {
        &self.extensions
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// Look up a declared dependency by package name.
    pub fn dependency(&self, name: &str) -> Option<&Dependency> {
        self.dependencies.iter().find(|d| d.name == name)
    }

    // -- homepage ----------------------------------------------------------

    /// Set `homepage` to the GitHub project URL for `user`.
    ///
    /// With `project` as `None` the project name defaults to the manifest
    /// name, with a leading `"{user}-"` fork prefix stripped if present:
    ///
    /// - name `bar`, user `foo` → `http://github.com/foo/bar`
    /// - name `foo-bar`, user `foo` → `http://github.com/foo/bar`
    pub fn github(&mut self, user: &str, project: Option<&str>) {
        self.homepage = Some(github_url(user, &self.name, project));
    }
}

/// Derive a GitHub project URL from a user name and a package name.
///
/// Pure counterpart of [`Manifest::github`].
pub fn github_url(user: &str, name: &str, project: Option<&str>) -> String {
    let fork_prefix = format!("{user}-");
    let project = project.unwrap_or_else(|| name.strip_prefix(&fork_prefix).unwrap_or(name));
    format!("http://github.com/{user}/{project}")
}

// ---------------------------------------------------------------------------
// Definition workflow
// ---------------------------------------------------------------------------

/// Define a manifest and persist it to `path`.
///
/// The manifest name defaults to the file name minus the
/// `.manifest.json` suffix; `configure` may override it along with any
/// other field. After configuration, the install hook is wired if any
/// post-install actions are pending, and the finished document is written
/// to `path`.
///
/// ```no_run
/// let manifest = pkgtools::define("demo.manifest.json", |m| {
///     m.version = "1.2.0".to_string();
///     m.github("some-hacker", None);
///     m.run_command("echo installed");
///     Ok(())
/// })?;
/// # Ok::<(), pkgtools::PkgToolsError>(())
/// ```
pub fn define<P, F>(path: P, configure: F) -> Result<Manifest>
where
    P: AsRef<Path>,
    F: FnOnce(&mut Manifest) -> Result<()>,
{
    let path = path.as_ref();
    let mut manifest = Manifest::new(default_name(path), "0.0.0");
    configure(&mut manifest)?;
    manifest.install_hook(path)?;
    manifest.save(path)?;
    Ok(manifest)
}

/// Default manifest name for a document path: the file name minus the
/// manifest suffix, falling back to the file stem.
fn default_name(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match file_name.strip_suffix(MANIFEST_SUFFIX) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or(file_name),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // -- github url derivation --------------------------------------------

    #[test]
    fn github_defaults_project_to_manifest_name() {
        let mut m = Manifest::new("bar", "0.1.0");
        m.github("foo", None);
        assert_eq!(m.homepage.as_deref(), Some("http://github.com/foo/bar"));
    }

    #[test]
    fn github_uses_explicit_project_name() {
        let mut m = Manifest::new("notbar", "0.1.0");
        m.github("foo", Some("bar"));
        assert_eq!(m.homepage.as_deref(), Some("http://github.com/foo/bar"));
    }

    #[test]
    fn github_strips_fork_prefix_from_name() {
        let mut m = Manifest::new("foo-bar", "0.1.0");
        m.github("foo", None);
        assert_eq!(m.homepage.as_deref(), Some("http://github.com/foo/bar"));
    }

    #[test]
    fn github_url_leaves_unrelated_prefix_alone() {
        assert_eq!(
            github_url("foo", "baz-bar", None),
            "http://github.com/foo/baz-bar"
        );
    }

    // -- list invariants ---------------------------------------------------

    #[test]
    fn push_file_deduplicates() {
        let mut m = Manifest::new("demo", "0.1.0");
        m.push_file("a.txt");
        m.push_file("b.txt");
        m.push_file("a.txt");
        assert_eq!(m.files(), [PathBuf::from("a.txt"), PathBuf::from("b.txt")]);
    }

    #[test]
    fn push_extension_deduplicates() {
        let mut m = Manifest::new("demo", "0.1.0");
        m.push_extension("hook.sh");
        m.push_extension("hook.sh");
        assert_eq!(m.extensions().len(), 1);
    }

    #[test]
    fn add_dependency_keeps_first_requirement() {
        let mut m = Manifest::new("demo", "0.1.0");
        m.add_dependency("serde", VersionReq::parse("^1.0").unwrap());
        m.add_dependency("serde", VersionReq::parse("^2.0").unwrap());
        assert_eq!(m.dependencies().len(), 1);
        assert_eq!(
            m.dependency("serde").unwrap().requirement,
            VersionReq::parse("^1.0").unwrap()
        );
    }

    // -- naming and persistence -------------------------------------------

    #[test]
    fn default_name_strips_manifest_suffix() {
        assert_eq!(default_name(Path::new("demo.manifest.json")), "demo");
        assert_eq!(default_name(Path::new("dir/my-pkg.manifest.json")), "my-pkg");
    }

    #[test]
    fn default_name_falls_back_to_file_stem() {
        assert_eq!(default_name(Path::new("demo.json")), "demo");
    }

    #[test]
    fn save_and_load_preserve_identity_and_lists() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("demo.manifest.json");

        let mut m = Manifest::new("demo", "1.0.0");
        m.github("foo", None);
        m.push_file("src/lib.rs");
        m.save(&path).unwrap();

        let loaded = Manifest::load(&path).unwrap();
        assert_eq!(loaded.name, "demo");
        assert_eq!(loaded.version, "1.0.0");
        assert_eq!(loaded.homepage.as_deref(), Some("http://github.com/foo/demo"));
        assert_eq!(loaded.files(), [PathBuf::from("src/lib.rs")]);
        assert!(!loaded.hook_installed, "wiring flag is per-instance");
    }
}
