// SPDX-License-Identifier: MPL-2.0

//! Handling errors of composer invocations.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors that may occur while driving composer.
#[derive(Error, Debug)]
pub enum ComposerError {
    /// A setting needed before running any command was never provided.
    #[error("Please configure composer first: missing {field}")]
    ConfigurationMissing {
        /// Name of the missing setting.
        field: &'static str,
    },

    /// The requested composer home cannot be used.
    #[error("Path for composer home is not a directory or not writeable: {path:?}")]
    InvalidHome {
        /// Rejected path.
        path: PathBuf,
    },

    /// No environment variable allows locating the current composer home.
    #[error("The {variable} or COMPOSER_HOME environment variable must be set for composer to run correctly")]
    HomeUnresolved {
        /// Platform fallback variable that was looked up.
        variable: &'static str,
    },

    /// The composer process could not be started.
    #[error("Command \"{command}\" could not be started")]
    Spawn {
        /// Name of the composer command.
        command: String,
        /// Error raised by the operating system.
        source: std::io::Error,
    },

    /// Waiting for the composer process or reading its output failed.
    #[error("Command \"{command}\" could not be completed")]
    Io {
        /// Name of the composer command.
        command: String,
        /// Error raised by the operating system.
        source: std::io::Error,
    },

    /// The composer process did not exit in the allotted time.
    #[error("Command \"{command}\" timed out after {timeout:?}")]
    Timeout {
        /// Name of the composer command.
        command: String,
        /// Time limit that was exceeded.
        timeout: Duration,
    },

    /// Composer exited with a nonzero status.
    #[error("Command \"{command}\" failed: {output}")]
    CommandFailed {
        /// Name of the composer command.
        command: String,
        /// Everything composer printed before exiting.
        output: String,
        /// Exit status, if the process was not killed by a signal.
        code: Option<i32>,
    },

    /// A dry-run update failed.
    /// The message holds the conflict explanation, if any could be built,
    /// followed by the message of the original failure.
    #[error("{message}")]
    DryRunFailed {
        /// Phase of the dry run that failed.
        phase: Phase,
        /// Explanation followed by the original failure message.
        message: String,
        /// Original failure.
        source: Box<ComposerError>,
    },
}

impl ComposerError {
    /// Exit status of the composer process at the origin of this error.
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::CommandFailed { code, .. } => *code,
            Self::DryRunFailed { source, .. } => source.code(),
            _ => None,
        }
    }
}

/// The two steps of a dry-run update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    /// Registering the requested packages in the manifest, without installing.
    Require,
    /// Simulating the update of the whole dependency set.
    Update,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Require => write!(f, "require"),
            Self::Update => write!(f, "update --dry-run"),
        }
    }
}
