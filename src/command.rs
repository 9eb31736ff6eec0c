// SPDX-License-Identifier: MPL-2.0

//! Composer commands and the trait executing them.
//!
//! A [ComposerCommand] is a command name with an ordered set of parameters,
//! the same shape composer's console application accepts as array input.
//! Executing it is the job of a [CommandRunner].
//! This crate ships [ProcessRunner](crate::runner::ProcessRunner),
//! which starts a composer process,
//! but any other way of reaching composer can be plugged in
//! by implementing the trait.

use std::fmt;
use std::path::Path;

use crate::error::ComposerError;
use crate::type_aliases::FxIndexMap;

/// Name of the `info` command.
pub const INFO: &str = "info";
/// Name of the `show` command.
pub const SHOW: &str = "show";
/// Name of the `require` command.
pub const REQUIRE: &str = "require";
/// Name of the `update` command.
pub const UPDATE: &str = "update";

/// Value of a command parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Param {
    /// Option without value, like `--dry-run`. Only rendered when set.
    Flag(bool),
    /// Single positional argument, like the package of `show`.
    Value(String),
    /// Several positional arguments, like the packages of `require`.
    List(Vec<String>),
}

/// A composer command with its parameters, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposerCommand {
    name: String,
    params: FxIndexMap<String, Param>,
}

impl ComposerCommand {
    /// Command without parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: FxIndexMap::default(),
        }
    }

    /// Add a parameter, replacing any previous value under the same key.
    pub fn with(mut self, key: impl Into<String>, value: Param) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    /// `composer info <package> [-i]`
    pub fn info(package: impl Into<String>, installed: bool) -> Self {
        Self::new(INFO)
            .with("package", Param::Value(package.into()))
            .with("-i", Param::Flag(installed))
    }

    /// `composer show <package>`
    pub fn show(package: impl Into<String>) -> Self {
        Self::new(SHOW).with("package", Param::Value(package.into()))
    }

    /// `composer require <packages...> [--no-update]`
    pub fn require<I, S>(packages: I, no_update: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(REQUIRE)
            .with(
                "packages",
                Param::List(packages.into_iter().map(Into::into).collect()),
            )
            .with("--no-update", Param::Flag(no_update))
    }

    /// `composer update --dry-run`
    pub fn update_dry_run() -> Self {
        Self::new(UPDATE).with("--dry-run", Param::Flag(true))
    }

    /// Name of the command.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value of a parameter.
    pub fn param(&self, key: &str) -> Option<&Param> {
        self.params.get(key)
    }

    /// Parameters, in insertion order.
    pub fn params(&self) -> impl Iterator<Item = (&str, &Param)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Command line arguments: the command name,
    /// then positional values in insertion order,
    /// then every flag that is set.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![self.name.clone()];
        for param in self.params.values() {
            match param {
                Param::Value(value) => args.push(value.clone()),
                Param::List(values) => args.extend(values.iter().cloned()),
                Param::Flag(_) => {}
            }
        }
        for (key, param) in &self.params {
            if let Param::Flag(true) = param {
                args.push(key.clone());
            }
        }
        args
    }
}

impl fmt::Display for ComposerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_args().join(" "))
    }
}

/// Trait executing composer commands.
///
/// Implementors return everything composer printed when it exits successfully,
/// and [ComposerError::CommandFailed] carrying that same text otherwise.
/// Commands must be run against `working_dir` when one is given,
/// and against the directory holding the configured `composer.json` otherwise.
pub trait CommandRunner {
    /// Runs a command to completion.
    fn run(
        &self,
        command: &ComposerCommand,
        working_dir: Option<&Path>,
    ) -> Result<String, ComposerError>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(
        &self,
        command: &ComposerCommand,
        working_dir: Option<&Path>,
    ) -> Result<String, ComposerError> {
        (**self).run(command, working_dir)
    }
}
