//! The loaded project a command works on.

use crate::config::{load_config, ConfigModel, EnvConfig, Named};
use crate::environment::resolve_env;
use crate::error::Result;
use crate::selection::select;
use log::debug;
use regex::Regex;
use std::path::{Path, PathBuf};

/// Project descriptor, selected environment and name filter of one invocation.
///
/// Everything is derived once and passed explicitly to the commands; nothing
/// is mutated afterwards.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub config: ConfigModel,
    /// Selected environment name, empty for the default layer
    pub env_name: String,
    /// Effective configuration of `env_name`
    pub env: EnvConfig,
    pub filter: Regex,
    /// Directory build paths are resolved against
    pub root: PathBuf,
}

impl Workspace {
    /// Loads the descriptor at `config_path` and resolves `env_name`.
    ///
    /// # Errors
    /// * `Error::ConfigError` if the descriptor cannot be loaded
    /// * `Error::FilterError` if `filter` is not a valid regular expression
    pub fn load<P: AsRef<Path>>(config_path: P, env_name: &str, filter: &str) -> Result<Self> {
        let config = load_config(config_path)?;
        let root = std::env::current_dir()?;
        Self::new(config, env_name, filter, root)
    }

    pub fn new(config: ConfigModel, env_name: &str, filter: &str, root: PathBuf) -> Result<Self> {
        let env = resolve_env(&config, env_name);
        let filter = Regex::new(filter)?;
        debug!("Workspace at {} using environment '{env_name}'", root.display());
        Ok(Self {
            config,
            env_name: env_name.to_string(),
            env,
            filter,
            root,
        })
    }

    /// Definitions named in `allow_list` that pass the name filter.
    pub fn select<'a, T: Named>(&self, allow_list: &[String], definitions: &'a [T]) -> Vec<&'a T> {
        select(allow_list, &self.filter, definitions)
    }
}
