//! Install-time execution of a manifest's post-install actions.
//!
//! This is the target the generated trampoline execs. Ordering contract:
//! the no-op build file is written only after every action succeeded, so a
//! failing action leaves the extension unbuilt and the installation aborts.

use std::fs;
use std::path::Path;

use semver::Version;
use tracing::debug;

use crate::error::{PkgToolsError, Result};
use crate::hooks::trampoline::{PACKAGE_NAME, VERSION};
use crate::manifest::Manifest;

/// No-op build file expected by the install toolchain's extension step.
pub const BUILD_FILE: &str = "Makefile";

/// What an [`execute_hooks`] run did, for status output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookReport {
    pub actions_run: usize,
}

/// Reload the manifest at `manifest_path`, run its post-install actions,
/// and then write the no-op build file into `build_dir`.
pub fn execute_hooks(manifest_path: &Path, build_dir: &Path) -> Result<HookReport> {
    let manifest = Manifest::load(manifest_path)?;
    check_runtime(&manifest, manifest_path)?;

    debug!(
        manifest = %manifest.name,
        actions = manifest.hooks().len(),
        "running post-install actions"
    );
    manifest.run_hooks()?;

    // Empty build and install targets: the toolchain considers the
    // extension built once this file exists.
    fs::write(build_dir.join(BUILD_FILE), "all:\ninstall:\n")?;

    Ok(HookReport {
        actions_run: manifest.hooks().len(),
    })
}

/// The manifest pinned the pkgtools version it was built against; refuse to
/// run its actions under an incompatible runtime.
fn check_runtime(manifest: &Manifest, manifest_path: &Path) -> Result<()> {
    let Some(dep) = manifest.dependency(PACKAGE_NAME) else {
        return Ok(());
    };
    let current = Version::parse(VERSION).expect("crate version is valid semver");
    if !dep.requirement.matches(&current) {
        return Err(PkgToolsError::IncompatibleRuntime {
            path: manifest_path.display().to_string(),
            requirement: dep.requirement.clone(),
            current,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
