// SPDX-License-Identifier: MPL-2.0

//! Matching conflicts against the packages a user asked for.
//!
//! Every package mentioned in a conflict is either one the user requested,
//! meaning the requested update is blocked,
//! or another package standing in the way: a blocker.

use log::debug;

use crate::conflict::ConflictEdge;
use crate::package::{parse_requirements, Requirements};
use crate::type_aliases::FxIndexSet;

/// Requested updates involved in conflicts, and the packages blocking them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// `<name> to <constraint>` for every requested package found in a conflict,
    /// in request order.
    pub updates: Vec<String>,
    /// Packages found in conflicts that were not requested,
    /// with the version composer mentioned, in order of first appearance.
    pub blockers: Requirements,
}

impl Reconciliation {
    /// Nothing could be matched.
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.blockers.is_empty()
    }
}

/// Packages mentioned in conflicts, by name.
///
/// Each side of each edge is a `<name> <version>` pair.
/// A package mentioned with several versions keeps the last one.
pub fn conflict_requirements(edges: &[ConflictEdge]) -> Requirements {
    let spans: FxIndexSet<&str> = edges
        .iter()
        .flat_map(|edge| [edge.dependent.as_str(), edge.dependency.as_str()])
        .collect();
    parse_requirements(spans)
}

/// Split conflicts into blocked updates and blockers.
pub fn reconcile<I, S>(edges: &[ConflictEdge], requested: I) -> Reconciliation
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let conflicts = conflict_requirements(edges);
    if conflicts.is_empty() {
        return Reconciliation::default();
    }
    let requested = parse_requirements(requested);

    let updates = requested
        .iter()
        .filter(|(name, _)| conflicts.contains_key(name.as_str()))
        .map(|(name, constraint)| format!("{} to {}", name, constraint))
        .collect();
    let blockers: Requirements = conflicts
        .into_iter()
        .filter(|(name, _)| !requested.contains_key(name.as_str()))
        .collect();
    debug!("{} blocking packages", blockers.len());

    Reconciliation { updates, blockers }
}
