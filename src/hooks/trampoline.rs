//! Trampoline generation and wiring.
//!
//! A manifest with pending post-install actions gets a small executable
//! script written into a scratch directory next to its document. The script
//! is registered in the manifest's `files` and `extensions` lists, so the
//! install toolchain discovers and executes it after unpacking; it execs
//! `pkgtools run-hooks` with the absolute manifest path, which reloads the
//! document and runs the recorded actions.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use semver::VersionReq;

use crate::error::{PkgToolsError, Result};
use crate::manifest::Manifest;

/// This library's package name; every hooked manifest depends on it so the
/// trampoline finds a compatible runtime at install time.
pub const PACKAGE_NAME: &str = env!("CARGO_PKG_NAME");

/// Current library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Scratch directory created next to the manifest document. Ships with the
/// package; recreated from scratch on every hooked manifest build.
pub const HOOK_DIR: &str = ".pkgtools";

/// Trampoline script name inside [`HOOK_DIR`].
pub const HOOK_SCRIPT: &str = "post-install.sh";

/// Render the trampoline script for a manifest document.
///
/// The embedded path must be absolute: the toolchain runs the script from
/// an unspecified working directory, possibly in a different process
/// lifetime entirely.
fn render_trampoline(manifest_path: &Path) -> String {
    format!(
        r#"#!/usr/bin/env bash
# Generated by pkgtools {version}. Reloads the manifest and runs its
# post-install actions. Regenerated on every manifest build; do not edit.
set -e
cd "$(dirname "$0")"
PKGTOOLS_BIN="${{PKGTOOLS_BIN:-pkgtools}}"
exec "$PKGTOOLS_BIN" run-hooks "{manifest}"
"#,
        version = VERSION,
        manifest = manifest_path.display(),
    )
}

/// Directory containing the manifest document. An empty parent means the
/// path is a bare file name, so the current directory.
fn source_dir(source: &Path) -> PathBuf {
    match source.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Resolve the absolute path of the manifest document without requiring the
/// document itself to exist yet (only its directory must).
fn absolute_manifest_path(source: &Path) -> Result<PathBuf> {
    let file_name = source.file_name().ok_or_else(|| {
        PkgToolsError::Other(format!("not a manifest file path: {}", source.display()))
    })?;
    Ok(fs::canonicalize(source_dir(source))?.join(file_name))
}

impl Manifest {
    /// True when no hook needs to be generated: one was already wired for
    /// this instance, nothing is pending, or this is pkgtools' own manifest
    /// (which must not depend on itself).
    fn hook_satisfied(&self) -> bool {
        self.hook_installed || !self.has_pending_hooks() || self.name == PACKAGE_NAME
    }

    /// Wire the install hook for the manifest document at `source`.
    ///
    /// A silent no-op returning `Ok(false)` when no hook is needed. Otherwise
    /// recreates the scratch directory, writes the executable trampoline,
    /// registers it (plus `source`) in `files`/`extensions` without
    /// duplicates, and pins an install-time dependency on pkgtools itself.
    pub fn install_hook(&mut self, source: impl AsRef<Path>) -> Result<bool> {
        if self.hook_satisfied() {
            return Ok(false);
        }
        let source = source.as_ref();
        self.hook_installed = true;

        let hook_dir = source_dir(source).join(HOOK_DIR);
        if hook_dir.exists() {
            fs::remove_dir_all(&hook_dir)?;
        }
        fs::create_dir_all(&hook_dir)?;

        let script_path = hook_dir.join(HOOK_SCRIPT);
        let manifest_path = absolute_manifest_path(source)?;
        fs::write(&script_path, render_trampoline(&manifest_path))?;
        fs::set_permissions(&script_path, fs::Permissions::from_mode(0o755))?;

        let registered = PathBuf::from(HOOK_DIR).join(HOOK_SCRIPT);
        self.push_file(source);
        self.push_file(&registered);
        self.push_extension(&registered);

        let requirement = VersionReq::parse(&format!("~{VERSION}"))
            .expect("crate version yields a valid tilde requirement");
        self.add_dependency(PACKAGE_NAME, requirement);

        eprintln!("[pkgtools] Wrote install hook {}", script_path.display());
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn hooked_manifest() -> Manifest {
        let mut m = Manifest::new("demo", "0.1.0");
        m.run_command("true");
        m
    }

    #[test]
    fn install_writes_executable_trampoline_with_absolute_path() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("demo.manifest.json");

        let mut m = hooked_manifest();
        assert!(m.install_hook(&source).unwrap());

        let script = tmp.path().join(HOOK_DIR).join(HOOK_SCRIPT);
        assert!(script.exists());

        let body = fs::read_to_string(&script).unwrap();
        assert!(body.starts_with("#!/usr/bin/env bash"));
        assert!(body.contains("run-hooks"));
        let embedded = fs::canonicalize(tmp.path())
            .unwrap()
            .join("demo.manifest.json");
        assert!(
            body.contains(&embedded.display().to_string()),
            "script must embed the absolute manifest path"
        );

        let mode = fs::metadata(&script).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn install_registers_lists_and_dependency() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("demo.manifest.json");

        let mut m = hooked_manifest();
        m.install_hook(&source).unwrap();

        let artifact = PathBuf::from(HOOK_DIR).join(HOOK_SCRIPT);
        assert_eq!(m.files(), [source.clone(), artifact.clone()]);
        assert_eq!(m.extensions(), [artifact]);

        let dep = m.dependency(PACKAGE_NAME).expect("self dependency pinned");
        assert!(dep
            .requirement
            .matches(&semver::Version::parse(VERSION).unwrap()));
    }

    #[test]
    fn install_twice_registers_once() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("demo.manifest.json");

        let mut m = hooked_manifest();
        assert!(m.install_hook(&source).unwrap());
        assert!(!m.install_hook(&source).unwrap(), "second call is a no-op");

        assert_eq!(m.files().len(), 2);
        assert_eq!(m.extensions().len(), 1);
        assert_eq!(m.dependencies().len(), 1);
    }

    #[test]
    fn no_pending_actions_means_no_hook() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("demo.manifest.json");

        let mut m = Manifest::new("demo", "0.1.0");
        assert!(!m.install_hook(&source).unwrap());

        assert!(!tmp.path().join(HOOK_DIR).exists());
        assert!(m.files().is_empty());
        assert!(m.extensions().is_empty());
        assert!(m.dependencies().is_empty());
    }

    #[test]
    fn own_manifest_never_gets_a_hook() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("pkgtools.manifest.json");

        let mut m = Manifest::new(PACKAGE_NAME, VERSION);
        m.run_command("true");
        assert!(!m.install_hook(&source).unwrap());
        assert!(!tmp.path().join(HOOK_DIR).exists());
    }

    #[test]
    fn stale_scratch_directory_is_cleared() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("demo.manifest.json");

        let hook_dir = tmp.path().join(HOOK_DIR);
        fs::create_dir_all(&hook_dir).unwrap();
        fs::write(hook_dir.join("stale.txt"), "old").unwrap();

        let mut m = hooked_manifest();
        m.install_hook(&source).unwrap();

        assert!(!hook_dir.join("stale.txt").exists());
        assert!(hook_dir.join(HOOK_SCRIPT).exists());
    }
}
