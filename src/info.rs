// SPDX-License-Identifier: MPL-2.0

//! Parsing the package reports printed by `composer info` and `composer show`.
//!
//! Those reports are meant for humans, one `key : value` field per line:
//!
//! ```txt
//! name     : 3rdp/d
//! descrip. : Plugin project A
//! keywords :
//! versions : * 1.0.0, 1.1.0, 1.2.0
//! type     : library
//! ```
//!
//! The version marked with `*` is the one currently installed.
//! Parsing never fails: fields that cannot be read are left empty.

use std::path::Path;
use std::sync::OnceLock;

use log::{debug, warn};
use regex::Regex;

use crate::command::{CommandRunner, ComposerCommand};
use crate::type_aliases::FxIndexMap;

/// Separator between the versions of a package.
const VERSION_SEPARATOR: &str = ", ";
/// Marker of the installed version.
const CURRENT_MARKER: char = '*';

/// Package report of `composer info`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PackageInfo {
    /// Every `key : value` field of the report, in order.
    pub fields: FxIndexMap<String, String>,
    /// Installed version, empty if none is marked.
    pub current_version: String,
    /// Listed versions other than the installed one, in order.
    pub available_versions: Vec<String>,
}

impl PackageInfo {
    /// Value of a field of the report.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Package name.
    pub fn name(&self) -> &str {
        self.field("name").unwrap_or_default()
    }

    /// Package description. Composer abbreviates the key.
    pub fn description(&self) -> &str {
        self.field("descrip.")
            .or_else(|| self.field("description"))
            .unwrap_or_default()
    }

    /// The `versions` field, as printed.
    pub fn versions_raw(&self) -> &str {
        self.field("versions").unwrap_or_default()
    }

    /// Package type, like `library` or `magento2-module`.
    pub fn package_type(&self) -> &str {
        self.field("type").unwrap_or_default()
    }
}

/// Parse a package report.
///
/// Only lines containing exactly one `:` are kept,
/// so values containing a colon themselves (URLs for instance) are dropped.
pub fn parse_info(raw: &str) -> PackageInfo {
    let mut fields = FxIndexMap::default();
    for line in raw.lines() {
        let mut chunks = line.split(':');
        if let (Some(key), Some(value), None) = (chunks.next(), chunks.next(), chunks.next()) {
            fields.insert(key.trim().to_owned(), value.trim().to_owned());
        }
    }
    debug!("Parsed {} package info fields", fields.len());

    let (current_version, available_versions) =
        split_versions(fields.get("versions").map(String::as_str).unwrap_or_default());
    PackageInfo {
        fields,
        current_version,
        available_versions,
    }
}

/// Split a `versions` field into the installed version and the others.
fn split_versions(versions: &str) -> (String, Vec<String>) {
    let tokens: Vec<&str> = versions.split(VERSION_SEPARATOR).collect();
    if let [single] = tokens.as_slice() {
        return (strip_marker(single).to_owned(), Vec::new());
    }
    let current = tokens
        .iter()
        .find(|v| v.starts_with(CURRENT_MARKER))
        .map(|v| strip_marker(v).to_owned())
        .unwrap_or_default();
    let available = tokens
        .iter()
        .filter(|v| !v.starts_with(CURRENT_MARKER))
        .map(|v| v.to_string())
        .collect();
    (current, available)
}

fn strip_marker(version: &str) -> &str {
    version.strip_prefix("* ").unwrap_or(version)
}

/// Versions listed by `composer show`, without the installed one.
/// Returns an empty list if the report has no `versions` line.
pub fn parse_show_versions(raw: &str) -> Vec<String> {
    static VERSIONS_LINE: OnceLock<Regex> = OnceLock::new();
    let pattern = VERSIONS_LINE.get_or_init(|| {
        Regex::new(r"versions : (.*)").expect("versions pattern is a valid regex")
    });
    match pattern.captures(raw) {
        Some(captures) => captures[1]
            .trim_end_matches('\r')
            .split(VERSION_SEPARATOR)
            .filter(|v| !v.contains(CURRENT_MARKER))
            .map(str::to_owned)
            .collect(),
        None => Vec::new(),
    }
}

/// Run `composer info` for a package and parse its report.
///
/// Returns `None` if composer fails,
/// a missing report only makes diagnostics less precise.
pub fn fetch_info(
    runner: &impl CommandRunner,
    package: &str,
    installed: bool,
    working_dir: Option<&Path>,
) -> Option<PackageInfo> {
    match runner.run(&ComposerCommand::info(package, installed), working_dir) {
        Ok(output) => Some(parse_info(&output)),
        Err(err) => {
            warn!("No info available for {}: {}", package, err);
            None
        }
    }
}
