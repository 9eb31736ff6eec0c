// SPDX-License-Identifier: MPL-2.0

//! Settings of the composer installation being driven.
//!
//! Composer reads its home and cache locations from environment variables.
//! Instead of changing the environment of the whole process,
//! those locations are kept in a [ComposerConfig]
//! and only handed to the composer processes started with it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ComposerError;
use crate::home::{Environment, ProcessEnvironment};

/// Binary started when none is configured.
pub const DEFAULT_BINARY: &str = "composer";

/// Variable holding the path to `composer.json`.
pub const COMPOSER_ENV: &str = "COMPOSER";
/// Variable holding the composer home directory.
pub const COMPOSER_HOME_ENV: &str = "COMPOSER_HOME";
/// Variable holding the composer cache directory.
pub const COMPOSER_CACHE_DIR_ENV: &str = "COMPOSER_CACHE_DIR";
/// Variable overriding the composer binary.
pub const COMPOSER_BINARY_ENV: &str = "COMPOSER_BINARY";

/// Settings used to start composer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComposerConfig {
    binary: PathBuf,
    composer_json: PathBuf,
    home: Option<PathBuf>,
    cache_dir: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl ComposerConfig {
    /// Start building a configuration.
    pub fn builder() -> ComposerConfigBuilder {
        ComposerConfigBuilder::default()
    }

    /// Builder filled from the `COMPOSER*` variables of the process environment.
    pub fn from_env() -> ComposerConfigBuilder {
        Self::from_environment(&ProcessEnvironment)
    }

    /// Builder filled from the `COMPOSER*` variables of the given environment.
    pub fn from_environment(env: &impl Environment) -> ComposerConfigBuilder {
        let mut builder = ComposerConfigBuilder::default();
        if let Some(binary) = env.var(COMPOSER_BINARY_ENV) {
            builder = builder.binary(binary);
        }
        if let Some(json) = env.var(COMPOSER_ENV) {
            builder = builder.composer_json(json);
        }
        if let Some(home) = env.var(COMPOSER_HOME_ENV) {
            builder = builder.home(home);
        }
        if let Some(cache) = env.var(COMPOSER_CACHE_DIR_ENV) {
            builder = builder.cache_dir(cache);
        }
        builder
    }

    /// Composer binary.
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Path to `composer.json`.
    pub fn composer_json(&self) -> &Path {
        &self.composer_json
    }

    /// Composer home directory, if one is set.
    pub fn home(&self) -> Option<&Path> {
        self.home.as_deref()
    }

    /// Composer cache directory, if one is set.
    pub fn cache_dir(&self) -> Option<&Path> {
        self.cache_dir.as_deref()
    }

    /// Maximum duration of a single composer command.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Directory commands run in when no explicit one is given:
    /// the one holding `composer.json`.
    pub fn default_working_dir(&self) -> &Path {
        match self.composer_json.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

/// Builder of [ComposerConfig].
#[derive(Debug, Clone, Default)]
pub struct ComposerConfigBuilder {
    binary: Option<PathBuf>,
    composer_json: Option<PathBuf>,
    home: Option<PathBuf>,
    cache_dir: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl ComposerConfigBuilder {
    /// Composer binary, `composer` on the `PATH` by default.
    pub fn binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = Some(binary.into());
        self
    }

    /// Path to `composer.json`. Required.
    pub fn composer_json(mut self, path: impl Into<PathBuf>) -> Self {
        self.composer_json = Some(path.into());
        self
    }

    /// Composer home directory.
    pub fn home(mut self, path: impl Into<PathBuf>) -> Self {
        self.home = Some(path.into());
        self
    }

    /// Composer cache directory.
    pub fn cache_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(path.into());
        self
    }

    /// Whether a cache directory has been set.
    pub fn has_cache_dir(&self) -> bool {
        self.cache_dir.is_some()
    }

    /// Kill composer commands running longer than this.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Finish the configuration.
    pub fn build(self) -> Result<ComposerConfig, ComposerError> {
        let composer_json = self
            .composer_json
            .ok_or(ComposerError::ConfigurationMissing {
                field: "composer_json",
            })?;
        Ok(ComposerConfig {
            binary: self.binary.unwrap_or_else(|| PathBuf::from(DEFAULT_BINARY)),
            composer_json,
            home: self.home,
            cache_dir: self.cache_dir,
            timeout: self.timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_aliases::Map;

    #[test]
    fn missing_manifest_is_reported() {
        let err = ComposerConfig::builder().home("/tmp/home").build().unwrap_err();
        assert!(matches!(
            err,
            ComposerError::ConfigurationMissing {
                field: "composer_json"
            }
        ));
    }

    #[test]
    fn defaults() {
        let config = ComposerConfig::builder()
            .composer_json("/srv/app/composer.json")
            .build()
            .unwrap();
        assert_eq!(config.binary(), Path::new("composer"));
        assert_eq!(config.default_working_dir(), Path::new("/srv/app"));
        assert_eq!(config.home(), None);
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn bare_manifest_runs_in_current_dir() {
        let config = ComposerConfig::builder()
            .composer_json("composer.json")
            .build()
            .unwrap();
        assert_eq!(config.default_working_dir(), Path::new("."));
    }

    #[test]
    fn read_from_environment() {
        let mut env = Map::default();
        env.insert(COMPOSER_ENV.to_owned(), "/srv/app/composer.json".to_owned());
        env.insert(COMPOSER_HOME_ENV.to_owned(), "/var/composer".to_owned());
        let config = ComposerConfig::from_environment(&env).build().unwrap();
        assert_eq!(config.composer_json(), Path::new("/srv/app/composer.json"));
        assert_eq!(config.home(), Some(Path::new("/var/composer")));
        assert_eq!(config.cache_dir(), None);
    }
}
