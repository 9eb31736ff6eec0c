// SPDX-License-Identifier: MPL-2.0

//! Package requirements as written on a composer command line,
//! like `vendor/package 1.2.0`.

use std::fmt;

use crate::type_aliases::FxIndexMap;

/// A package name with the version constraint requested for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PackageRequirement {
    /// Package name, like `vendor/package`.
    pub name: String,
    /// Version constraint, like `1.2.0` or `^2.0`.
    /// Empty if the requirement did not carry one.
    pub constraint: String,
}

impl PackageRequirement {
    /// Split `"<name> <constraint>"` on the first run of whitespace.
    /// Anything after the second token is ignored.
    pub fn parse(raw: &str) -> Self {
        let mut tokens = raw.split_whitespace();
        Self {
            name: tokens.next().unwrap_or_default().to_owned(),
            constraint: tokens.next().unwrap_or_default().to_owned(),
        }
    }
}

impl fmt::Display for PackageRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.constraint.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} {}", self.name, self.constraint)
        }
    }
}

/// Version constraints indexed by package name, in order of first appearance.
pub type Requirements = FxIndexMap<String, String>;

/// Collect requirements into a map from package name to constraint.
///
/// A name given twice keeps the position of its first occurrence
/// but the constraint of its last one.
/// Blank entries are skipped.
pub fn parse_requirements<I, S>(raw: I) -> Requirements
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut requirements = Requirements::default();
    for entry in raw {
        let requirement = PackageRequirement::parse(entry.as_ref());
        if requirement.name.is_empty() {
            continue;
        }
        requirements.insert(requirement.name, requirement.constraint);
    }
    requirements
}
