// SPDX-License-Identifier: MPL-2.0

//! Dry-run updates of composer projects, with readable conflict diagnostics.
//!
//! Applications managing PHP projects often need to know whether
//! a set of packages can be installed before actually installing them.
//! Composer answers that question with `composer update --dry-run`,
//! but when the answer is no, its explanation is written for someone
//! who already knows the dependency graph of the project by heart.
//!
//! This crate runs the dry run and, when it fails,
//! reads composer's output to tell which of the requested updates are blocked,
//! by which packages, and which versions of those packages could be tried instead.
//!
//! # Dry run
//!
//! ```ignore
//! let config = ComposerConfig::builder()
//!     .composer_json("/srv/shop/composer.json")
//!     .build()?;
//! let runner = ProcessRunner::new(config);
//!
//! match run_update_dry_run(&runner, ["3rdp/e 1.2.0"], None) {
//!     Ok(output) => println!("{}", output),
//!     Err(err) => eprintln!("{}", err),
//! }
//! ```
//!
//! The packages are first required without update, then the update is simulated.
//! Both phases are available separately through
//! [RequireUpdateDryRun::stage](dry_run::RequireUpdateDryRun::stage)
//! and [StagedRequirement::update](dry_run::StagedRequirement::update).
//!
//! # Conflict report
//!
//! When composer reports something like
//!
//! ```txt
//!   Problem 1
//!     - 3rdp/e 1.0.0 requires 3rdp/d 1.0.0 -> no matching package found.
//! ```
//!
//! while `3rdp/e 1.2.0` was requested, the error becomes
//!
//! ```txt
//! You are trying to update package(s) 3rdp/e to 1.2.0
//! But looks like it conflicts with the following packages:
//!  - 3rdp/d version 1.0.0 please try to upgrade it to one of the following package versions: 1.1.0, 1.2.0
//!
//! Command "update" failed: ...
//! ```
//!
//! where candidate versions come from `composer show 3rdp/d`.
//! The analysis is available on its own through [DiagnosticReport](report::DiagnosticReport),
//! and can be rendered differently by implementing [Reporter](report::Reporter).
//!
//! # Command runner
//!
//! Commands go through the [CommandRunner](command::CommandRunner) trait.
//! [ProcessRunner](runner::ProcessRunner) starts composer processes,
//! with the home and cache directories of its [ComposerConfig](config::ComposerConfig)
//! set on each child process rather than on the current process.
//! Moving composer to a new home while keeping its download cache
//! is handled by [HomeEnvironment](home::HomeEnvironment).
//!
//! Parsing composer output never fails:
//! lines that cannot be understood are skipped
//! and the report only gets less precise.

#![warn(missing_docs)]

pub mod command;
pub mod config;
pub mod conflict;
pub mod dry_run;
pub mod error;
pub mod home;
pub mod info;
pub mod package;
pub mod reconcile;
pub mod report;
pub mod runner;

mod type_aliases;

pub use type_aliases::{FxIndexMap, FxIndexSet, Map};
