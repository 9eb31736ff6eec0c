// SPDX-License-Identifier: MPL-2.0

//! Build a report as clear as possible as to why
//! a dry-run update failed.

use std::fmt;
use std::path::Path;

use log::{debug, warn};

use crate::command::{CommandRunner, ComposerCommand};
use crate::conflict::extract_conflict_edges;
use crate::info::parse_show_versions;
use crate::reconcile::{reconcile, Reconciliation};

/// A package standing in the way of the requested updates,
/// with the versions of it that could be tried instead.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockerLine {
    /// Package name.
    pub name: String,
    /// Version composer could not get past.
    pub constraint: String,
    /// Other versions of the package, empty if they could not be listed.
    pub candidates: Vec<String>,
}

impl fmt::Display for BlockerLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            " - {} version {} please try to upgrade it to one of the following package versions: {}",
            self.name,
            self.constraint,
            self.candidates.join(", ")
        )
    }
}

/// Explanation of a failed dry-run update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiagnosticReport {
    /// `<name> to <constraint>` for every requested update involved in a conflict.
    pub requested_updates: Vec<String>,
    /// Packages blocking those updates.
    pub conflicts: Vec<BlockerLine>,
}

impl DiagnosticReport {
    /// Analyze a failure message.
    ///
    /// Runs `composer show` once per blocking package
    /// to list the versions that could be tried instead.
    /// A failing `show` only leaves that package without candidates.
    pub fn build<R, I, S>(
        runner: &R,
        failure: &str,
        requested: I,
        working_dir: Option<&Path>,
    ) -> Self
    where
        R: CommandRunner + ?Sized,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let edges = extract_conflict_edges(failure);
        let Reconciliation { updates, blockers } = reconcile(&edges, requested);
        let conflicts = blockers
            .into_iter()
            .map(|(name, constraint)| {
                let show = ComposerCommand::show(name.as_str());
                let candidates = match runner.run(&show, working_dir) {
                    Ok(output) => parse_show_versions(&output),
                    Err(err) => {
                        warn!("Could not list versions of {}: {}", name, err);
                        Vec::new()
                    }
                };
                debug!("{} candidate versions for {}", candidates.len(), name);
                BlockerLine {
                    name,
                    constraint,
                    candidates,
                }
            })
            .collect();
        Self {
            requested_updates: updates,
            conflicts,
        }
    }

    /// Nothing to explain.
    pub fn is_empty(&self) -> bool {
        self.requested_updates.is_empty() && self.conflicts.is_empty()
    }
}

/// Reporter trait.
pub trait Reporter {
    /// Output type of the report.
    type Output;

    /// Generate a report from the diagnostic
    /// of a failed dry-run update.
    fn report(report: &DiagnosticReport) -> Self::Output;
}

/// Default reporter able to generate an explanation as a [String].
///
/// The explanation ends with a line break, unless it is empty,
/// so the original failure message can be appended to it directly.
pub struct DefaultStringReporter;

impl Reporter for DefaultStringReporter {
    type Output = String;

    fn report(report: &DiagnosticReport) -> Self::Output {
        if report.is_empty() {
            return String::new();
        }
        let mut lines = Vec::with_capacity(report.conflicts.len() + 2);
        if !report.requested_updates.is_empty() {
            lines.push(format!(
                "You are trying to update package(s) {}",
                report.requested_updates.join(", ")
            ));
        }
        lines.push("But looks like it conflicts with the following packages:".to_owned());
        lines.extend(report.conflicts.iter().map(|line| line.to_string()));
        let mut text = lines.join("\n");
        text.push('\n');
        text
    }
}

/// Explain a composer failure in terms of the requested packages.
/// Returns an empty string if the failure lists no conflicting requirement.
pub fn compose<R, I, S>(
    runner: &R,
    failure: &str,
    requested: I,
    working_dir: Option<&Path>,
) -> String
where
    R: CommandRunner + ?Sized,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let report = DiagnosticReport::build(runner, failure, requested, working_dir);
    DefaultStringReporter::report(&report)
}
