// SPDX-License-Identifier: MPL-2.0

//! Running composer as a child process.

use std::io::{self, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};

use log::{debug, warn};
use wait_timeout::ChildExt;

use crate::command::{CommandRunner, ComposerCommand};
use crate::config::{ComposerConfig, COMPOSER_CACHE_DIR_ENV, COMPOSER_ENV, COMPOSER_HOME_ENV};
use crate::error::ComposerError;

/// Option scoping a composer command to a project directory.
pub const WORKING_DIR_OPTION: &str = "--working-dir";

/// A [CommandRunner] starting one composer process per command.
///
/// The home and cache directories of the configuration
/// are passed to the child process only,
/// so several runners with different homes can coexist in one process.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    config: ComposerConfig,
}

impl ProcessRunner {
    /// Runner for the given configuration.
    pub fn new(config: ComposerConfig) -> Self {
        Self { config }
    }

    /// Configuration of this runner.
    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Full argument list for a command, including the working directory
    /// and the non-interactive switches.
    pub fn args(&self, command: &ComposerCommand, working_dir: Option<&Path>) -> Vec<String> {
        let working_dir = working_dir.unwrap_or_else(|| self.config.default_working_dir());
        let mut args = command.to_args();
        args.push(format!("{}={}", WORKING_DIR_OPTION, working_dir.display()));
        args.push("--no-interaction".into());
        args.push("--no-ansi".into());
        args
    }

    fn command(&self, args: &[String]) -> Command {
        let mut process = Command::new(self.config.binary());
        process
            .args(args)
            .env(COMPOSER_ENV, self.config.composer_json())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(home) = self.config.home() {
            process.env(COMPOSER_HOME_ENV, home);
        }
        if let Some(cache) = self.config.cache_dir() {
            process.env(COMPOSER_CACHE_DIR_ENV, cache);
        }
        process
    }
}

impl CommandRunner for ProcessRunner {
    fn run(
        &self,
        command: &ComposerCommand,
        working_dir: Option<&Path>,
    ) -> Result<String, ComposerError> {
        let args = self.args(command, working_dir);
        debug!("Running {} {}", self.config.binary().display(), args.join(" "));

        let spawn_error = |source: io::Error| ComposerError::Spawn {
            command: command.name().to_owned(),
            source,
        };
        let io_error = |source: io::Error| ComposerError::Io {
            command: command.name().to_owned(),
            source,
        };
        let mut child = self.command(&args).spawn().map_err(spawn_error)?;

        // Both pipes are drained while waiting, so a chatty composer never blocks on a full pipe.
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let status = match self.config.timeout() {
            Some(timeout) => match child.wait_timeout(timeout).map_err(io_error)? {
                Some(status) => status,
                None => {
                    warn!("{} did not exit within {:?}, killing it", command.name(), timeout);
                    // The process may have exited in between.
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ComposerError::Timeout {
                        command: command.name().to_owned(),
                        timeout,
                    });
                }
            },
            None => child.wait().map_err(io_error)?,
        };

        let mut output = collect(stdout).map_err(io_error)?;
        let errors = collect(stderr).map_err(io_error)?;

        // Composer reports progress and problems on stderr.
        output.push_str(&errors);
        if status.success() {
            Ok(output)
        } else {
            debug!("{} exited with {}", command.name(), status);
            Err(ComposerError::CommandFailed {
                command: command.name().to_owned(),
                output,
                code: status.code(),
            })
        }
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<io::Result<String>> {
    thread::spawn(move || {
        let mut bytes = Vec::new();
        pipe.read_to_end(&mut bytes)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    })
}

fn collect(reader: Option<JoinHandle<io::Result<String>>>) -> io::Result<String> {
    match reader {
        Some(handle) => handle
            .join()
            .unwrap_or_else(|_| Err(io::Error::other("output reader panicked"))),
        None => Ok(String::new()),
    }
}
