//! Unified error type for pkgtools.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PkgToolsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("command {command:?} failed with {status}")]
    CommandFailed {
        command: String,
        status: std::process::ExitStatus,
    },

    #[error("manifest {path} requires pkgtools {requirement}, but this is pkgtools {current}")]
    IncompatibleRuntime {
        path: String,
        requirement: semver::VersionReq,
        current: semver::Version,
    },

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, PkgToolsError>;
