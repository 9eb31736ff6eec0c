// SPDX-License-Identifier: MPL-2.0

//! Moving composer to another home directory.
//!
//! Composer keeps its global settings, credentials and download cache
//! under its home directory.
//! When an application points composer at a home of its own,
//! the download cache of the previous home is kept,
//! so that switching homes does not mean downloading everything again.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::config::{ComposerConfigBuilder, COMPOSER_CACHE_DIR_ENV, COMPOSER_HOME_ENV};
use crate::error::ComposerError;
use crate::type_aliases::Map;

/// Read access to environment variables.
pub trait Environment {
    /// Value of a variable, `None` if unset or empty.
    fn var(&self, name: &str) -> Option<String>;
}

/// Environment of the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.is_empty())
    }
}

impl Environment for Map<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).filter(|v| !v.is_empty()).cloned()
    }
}

/// Composer home directory the way composer itself locates it.
pub fn current_home(env: &impl Environment) -> Result<PathBuf, ComposerError> {
    if let Some(home) = env.var(COMPOSER_HOME_ENV) {
        return Ok(PathBuf::from(home));
    }
    if cfg!(windows) {
        let appdata = env
            .var("APPDATA")
            .ok_or(ComposerError::HomeUnresolved { variable: "APPDATA" })?;
        Ok(PathBuf::from(format!("{}/Composer", appdata.replace('\\', "/"))))
    } else {
        let home = env
            .var("HOME")
            .ok_or(ComposerError::HomeUnresolved { variable: "HOME" })?;
        Ok(PathBuf::from(format!("{}/.composer", home.trim_end_matches('/'))))
    }
}

/// Settings resulting from a home change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HomeChange {
    /// The requested home already is the current one.
    Unchanged,
    /// Composer must use another home.
    Changed {
        /// New home directory.
        home: PathBuf,
        /// Cache directory of the previous home,
        /// when no cache directory was configured explicitly.
        cache_dir: Option<PathBuf>,
    },
}

/// A validated composer home directory to move to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeEnvironment {
    path: PathBuf,
}

impl HomeEnvironment {
    /// Fails unless `path` is an existing directory this process can write to.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, ComposerError> {
        let path = path.into();
        let is_dir = fs::metadata(&path).map(|meta| meta.is_dir()).unwrap_or(false);
        if !is_dir || !is_writable(&path) {
            return Err(ComposerError::InvalidHome { path });
        }
        Ok(Self { path })
    }

    /// Target home directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Settings needed to move composer from its current home to this one.
    pub fn change(&self, env: &impl Environment) -> Result<HomeChange, ComposerError> {
        let current = trim_trailing_slashes(&current_home(env)?);
        let target = trim_trailing_slashes(&self.path);
        if current == target {
            debug!("Composer home already is {}", target.display());
            return Ok(HomeChange::Unchanged);
        }
        let cache_dir = match env.var(COMPOSER_CACHE_DIR_ENV) {
            Some(_) => None,
            None => Some(current.join("cache")),
        };
        debug!(
            "Moving composer home from {} to {}",
            current.display(),
            target.display()
        );
        Ok(HomeChange::Changed {
            home: target,
            cache_dir,
        })
    }

    /// Fold the home change into a configuration.
    /// A cache directory already set on the builder is left alone.
    pub fn apply_to(
        &self,
        builder: ComposerConfigBuilder,
        env: &impl Environment,
    ) -> Result<ComposerConfigBuilder, ComposerError> {
        Ok(match self.change(env)? {
            HomeChange::Unchanged => builder,
            HomeChange::Changed { home, cache_dir } => {
                let builder = builder.home(home);
                match cache_dir {
                    Some(cache) if !builder.has_cache_dir() => builder.cache_dir(cache),
                    _ => builder,
                }
            }
        })
    }
}

/// Whether the current process can create a file in `dir`.
fn is_writable(dir: &Path) -> bool {
    match tempfile::Builder::new()
        .prefix(".composer-home-")
        .tempfile_in(dir)
    {
        Ok(_) => true,
        Err(err) => {
            debug!("Cannot write to {}: {}", dir.display(), err);
            false
        }
    }
}

fn trim_trailing_slashes(path: &Path) -> PathBuf {
    PathBuf::from(path.to_string_lossy().trim_end_matches('/'))
}
