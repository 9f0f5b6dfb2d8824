//! Crate-wide configuration: resolving the filesystem storage root.
//!
//! Precedence, per §6: an explicit path given to the constructor, else the
//! single environment variable `RDMS_DOC_ROOT`, else `dirs::home_dir()`
//! joined with `.rdms_doc`. No other environment inputs are read.

use std::path::PathBuf;

/// The single environment variable this crate reads.
pub const ROOT_ENV_VAR: &str = "RDMS_DOC_ROOT";

const DEFAULT_DIR_NAME: &str = ".rdms_doc";

/// Resolved configuration for a filesystem-backed [crate::Client].
#[derive(Clone, Debug)]
pub struct Config {
    pub root: PathBuf,
}

impl Config {
    /// Use `root` verbatim, bypassing the environment variable and the
    /// home-directory default.
    pub fn with_root(root: impl Into<PathBuf>) -> Config {
        Config { root: root.into() }
    }

    /// Resolve the root from `RDMS_DOC_ROOT`, falling back to
    /// `$HOME/.rdms_doc`.
    pub fn from_env() -> Config {
        let root = std::env::var_os(ROOT_ENV_VAR)
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|home| home.join(DEFAULT_DIR_NAME)))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DIR_NAME));
        Config { root }
    }
}

impl Default for Config {
    fn default() -> Config {
        Config::from_env()
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
