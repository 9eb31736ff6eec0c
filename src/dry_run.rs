// SPDX-License-Identifier: MPL-2.0

//! Simulating the update of a project with new package requirements.
//!
//! A dry run happens in two phases.
//! The requested packages are first registered in `composer.json`
//! without installing anything (`composer require --no-update`),
//! the requirement is then staged.
//! The whole dependency set is then resolved without touching the project
//! (`composer update --dry-run`).
//!
//! If either phase fails, composer's output is analyzed
//! and the resulting [ComposerError::DryRunFailed] explains
//! which requested updates are blocked, by which packages,
//! and what versions of them could be tried instead.
//!
//! ```
//! # use std::path::Path;
//! # use composer_dry_run::command::{CommandRunner, ComposerCommand};
//! # use composer_dry_run::dry_run::RequireUpdateDryRun;
//! # use composer_dry_run::error::ComposerError;
//! # struct NothingToUpdate;
//! # impl CommandRunner for NothingToUpdate {
//! #     fn run(&self, _: &ComposerCommand, _: Option<&Path>) -> Result<String, ComposerError> {
//! #         Ok("Nothing to install or update".into())
//! #     }
//! # }
//! # let runner = NothingToUpdate;
//! let dry_run = RequireUpdateDryRun::new(runner);
//! let staged = dry_run.stage(["3rdp/e 1.2.0"], None)?;
//! let output = staged.update()?;
//! # assert_eq!(output, "Nothing to install or update");
//! # Ok::<(), ComposerError>(())
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use log::info;

use crate::command::{CommandRunner, ComposerCommand};
use crate::error::{ComposerError, Phase};
use crate::report::compose;

/// Dry-run updates through a [CommandRunner].
#[derive(Debug, Clone)]
pub struct RequireUpdateDryRun<R> {
    runner: R,
}

impl<R: CommandRunner> RequireUpdateDryRun<R> {
    /// Dry runs executed by `runner`.
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// Runner executing the commands.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// First phase: register the requested packages without installing them.
    pub fn stage<I, S>(
        &self,
        packages: I,
        working_dir: Option<&Path>,
    ) -> Result<StagedRequirement<'_, R>, ComposerError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let packages: Vec<String> = packages.into_iter().map(Into::into).collect();
        info!("Requiring {} package(s) without update", packages.len());
        let require = ComposerCommand::require(packages.iter().cloned(), true);
        match self.runner.run(&require, working_dir) {
            Ok(_) => Ok(StagedRequirement {
                dry_run: self,
                packages,
                working_dir: working_dir.map(Path::to_path_buf),
            }),
            Err(err) => Err(self.diagnose(Phase::Require, err, &packages, working_dir)),
        }
    }

    /// Both phases: returns the output of `composer update --dry-run`.
    pub fn run<I, S>(
        &self,
        packages: I,
        working_dir: Option<&Path>,
    ) -> Result<String, ComposerError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stage(packages, working_dir)?.update()
    }

    /// Wrap a failure with the explanation of its conflicts.
    fn diagnose(
        &self,
        phase: Phase,
        err: ComposerError,
        packages: &[String],
        working_dir: Option<&Path>,
    ) -> ComposerError {
        let original = err.to_string();
        let explanation = compose(&self.runner, &original, packages, working_dir);
        info!(
            "{} failed, {}",
            phase,
            if explanation.is_empty() {
                "no conflict could be explained"
            } else {
                "conflicts explained"
            }
        );
        let message = if explanation.is_empty() {
            original
        } else {
            format!("{}\n{}", explanation, original)
        };
        ComposerError::DryRunFailed {
            phase,
            message,
            source: Box::new(err),
        }
    }
}

/// Packages registered in `composer.json` but not resolved yet.
pub struct StagedRequirement<'a, R> {
    dry_run: &'a RequireUpdateDryRun<R>,
    packages: Vec<String>,
    working_dir: Option<PathBuf>,
}

// Runners need not implement `Debug`.
impl<R> fmt::Debug for StagedRequirement<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StagedRequirement")
            .field("packages", &self.packages)
            .field("working_dir", &self.working_dir)
            .finish_non_exhaustive()
    }
}

impl<'a, R: CommandRunner> StagedRequirement<'a, R> {
    /// Staged packages, as requested.
    pub fn packages(&self) -> &[String] {
        &self.packages
    }

    /// Directory the commands run in, if not the default one.
    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    /// Second phase: simulate the update and return composer's output unchanged.
    pub fn update(self) -> Result<String, ComposerError> {
        info!("Simulating update");
        let working_dir = self.working_dir.as_deref();
        self.dry_run
            .runner
            .run(&ComposerCommand::update_dry_run(), working_dir)
            .map_err(|err| {
                self.dry_run
                    .diagnose(Phase::Update, err, &self.packages, working_dir)
            })
    }
}

/// Require `packages` then simulate the update, in one go.
pub fn run_update_dry_run<R, I, S>(
    runner: &R,
    packages: I,
    working_dir: Option<&Path>,
) -> Result<String, ComposerError>
where
    R: CommandRunner + ?Sized,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    RequireUpdateDryRun::new(runner).run(packages, working_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Runner without a `Debug` implementation.
    struct Accepting<F>(F);

    impl<F: Fn(&ComposerCommand) -> bool> CommandRunner for Accepting<F> {
        fn run(
            &self,
            command: &ComposerCommand,
            _: Option<&Path>,
        ) -> Result<String, ComposerError> {
            if (self.0)(command) {
                Ok(String::new())
            } else {
                Err(ComposerError::CommandFailed {
                    command: command.name().to_owned(),
                    output: String::new(),
                    code: Some(1),
                })
            }
        }
    }

    #[test]
    fn staged_requirement_debug_does_not_need_runner_debug() {
        let dry_run = RequireUpdateDryRun::new(Accepting(|_: &ComposerCommand| true));
        let staged = dry_run
            .stage(["3rdp/e 1.2.0"], Some(Path::new("/srv/shop")))
            .unwrap();
        let debug = format!("{:?}", staged);
        assert!(debug.starts_with("StagedRequirement"));
        assert!(debug.contains("3rdp/e 1.2.0"));
        assert!(debug.contains("/srv/shop"));
    }

    #[test]
    fn failed_stage_can_be_unwrapped() {
        let dry_run = RequireUpdateDryRun::new(Accepting(|_: &ComposerCommand| false));
        let err = dry_run.stage(["3rdp/e 1.2.0"], None).unwrap_err();
        assert!(matches!(
            err,
            ComposerError::DryRunFailed {
                phase: Phase::Require,
                ..
            }
        ));
        assert_eq!(err.code(), Some(1));
    }
}
