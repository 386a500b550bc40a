//! Deferred post-install actions.
//!
//! Actions are plain data, not captured code, so a manifest can be defined
//! in one process, persisted, and have its actions executed in another.
//! Execution is synchronous and in registration order; the first failure
//! aborts the remainder and must abort the installation.

use std::process::Command;

use serde::{Deserialize, Serialize};

use crate::error::{PkgToolsError, Result};
use crate::manifest::Manifest;

/// A single deferred action, stored in the manifest's `post_install` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum HookAction {
    /// Run a shell command. A non-zero exit aborts the installation.
    Command { command: String },
    /// Print a line on the installing user's terminal.
    Message { text: String },
}

impl HookAction {
    /// Execute this action on the calling thread.
    pub fn run(&self) -> Result<()> {
        match self {
            HookAction::Command { command } => {
                let status = Command::new("sh").arg("-c").arg(command).status()?;
                if !status.success() {
                    return Err(PkgToolsError::CommandFailed {
                        command: command.clone(),
                        status,
                    });
                }
                Ok(())
            }
            // stderr: stdout belongs to the install toolchain.
            HookAction::Message { text } => {
                eprintln!("{text}");
                Ok(())
            }
        }
    }
}

impl Manifest {
    /// Register a deferred post-install action.
    ///
    /// Returns the full registration sequence, in order.
    pub fn add_hook(&mut self, action: HookAction) -> &[HookAction] {
        self.post_install.push(action);
        &self.post_install
    }

    /// Register a shell command to run after installation.
    ///
    /// The command runs through `sh -c`; a non-zero exit fails the
    /// installation with a descriptive error.
    pub fn run_command(&mut self, command: impl Into<String>) {
        self.add_hook(HookAction::Command {
            command: command.into(),
        });
    }

    /// Register a message to show the installing user.
    pub fn post_install_message(&mut self, text: impl Into<String>) {
        self.add_hook(HookAction::Message { text: text.into() });
    }

    /// Registered actions, in registration order.
    pub fn hooks(&self) -> &[HookAction] {
        &self.post_install
    }

    /// True iff any post-install actions are registered.
    pub fn has_pending_hooks(&self) -> bool {
        !self.post_install.is_empty()
    }

    /// Run every registered action in order.
    ///
    /// The first failure propagates immediately; remaining actions are
    /// skipped. Nothing is caught here: a failing action must surface as a
    /// failed installation.
    pub fn run_hooks(&self) -> Result<()> {
        self.run_hooks_with(HookAction::run)
    }

    /// [`run_hooks`](Self::run_hooks) with a caller-supplied executor.
    pub fn run_hooks_with<F>(&self, mut exec: F) -> Result<()>
    where
        F: FnMut(&HookAction) -> Result<()>,
    {
        for action in &self.post_install {
            exec(action)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
