// SPDX-License-Identifier: MPL-2.0

//! Extracting unsatisfiable requirements from composer's error output.
//!
//! When composer cannot resolve the requirements of a project,
//! it lists the problems it ran into, for example:
//!
//! ```txt
//! Your requirements could not be resolved to an installable set of packages.
//!
//!   Problem 1
//!     - 3rdp/e 1.0.0 requires 3rdp/d 1.0.0 -> no matching package found.
//!     - Installation request for 3rdp/e 1.0.0 -> satisfiable by 3rdp/e[1.0.0].
//! ```
//!
//! Only the `requires ... -> no matching package` lines are understood,
//! every other line is ignored.

use std::fmt;
use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use crate::type_aliases::FxIndexSet;

/// One package requiring another at a version that cannot be installed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConflictEdge {
    /// Requiring package with its version, like `3rdp/e 1.0.0`.
    pub dependent: String,
    /// Required package with its constraint, like `3rdp/d 1.0.0`.
    pub dependency: String,
}

impl fmt::Display for ConflictEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} requires {}", self.dependent, self.dependency)
    }
}

fn requires_pattern() -> &'static Regex {
    static REQUIRES: OnceLock<Regex> = OnceLock::new();
    REQUIRES.get_or_init(|| {
        Regex::new(r"- (.*?) requires (.*?) -> no matching package")
            .expect("requires pattern is a valid regex")
    })
}

/// Distinct conflict edges of a failure message, in order of first appearance.
pub fn extract_conflict_edges(failure: &str) -> Vec<ConflictEdge> {
    let pattern = requires_pattern();
    let edges: FxIndexSet<ConflictEdge> = failure
        .lines()
        .filter_map(|line| pattern.captures(line))
        .map(|captures| ConflictEdge {
            dependent: captures[1].to_owned(),
            dependency: captures[2].to_owned(),
        })
        .collect();
    debug!("Found {} conflicting requirements", edges.len());
    edges.into_iter().collect()
}
