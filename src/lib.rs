//! pkgtools: post-install hook tooling for package manifests.
//!
//! A manifest registers deferred post-install actions while it is being
//! defined; pkgtools persists them with the manifest document and wires a
//! generated trampoline script into the manifest's extension list, so the
//! install toolchain re-executes the actions after unpacking, possibly in a
//! different process and working directory.

pub mod cli;
pub mod error;
pub mod hooks;
pub mod logging;
pub mod manifest;

pub use error::{PkgToolsError, Result};
pub use hooks::{execute_hooks, HookAction};
pub use manifest::{define, github_url, Manifest};
