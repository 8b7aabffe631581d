//! Project descriptor handling.
//! This module provides the typed model of `project.yaml` and the loader that
//! reads it once per invocation.

use crate::constants::DEFAULT_IMAGE_TAG;
use crate::error::{Error, Result};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root of the project descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigModel {
    pub product: String,
    pub model: String,
    pub version: String,
    pub domain: String,
    pub project: String,
    /// Base layer shared by every environment
    pub default: EnvConfig,
    /// Sparse per-environment overrides, kept as raw YAML until resolved.
    /// See [`crate::environment::resolve_env`].
    pub env: IndexMap<String, serde_yaml::Value>,
    pub build: BuildConfig,
    pub generate: GenerateConfig,
}

/// Effective settings of one environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    pub config_src: String,
    pub config_tgt: String,
    pub configs: Vec<String>,

    pub binary_src: String,
    pub binary_tgt: String,
    pub binaries: Vec<String>,
    pub binary_build_env: Vec<String>,
    pub binary_build_args: Vec<String>,

    pub image_build_src: String,
    pub images: Vec<String>,
    pub image_prefix: String,
    pub image_tag: String,
    pub image_build_env: Vec<String>,
    pub image_build_args: Vec<String>,

    pub kubernetes_src: String,
    pub kubernetes_tgt: String,
    pub kubernetes_templates: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub binaries: Vec<BinaryDefinition>,
    pub images: Vec<ImageDefinition>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinaryDefinition {
    pub name: String,
    pub src: String,
    pub platform: Vec<String>,
    pub config_dir: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageDefinition {
    pub name: String,
    /// Base image passed as `BASE`; `$other` refers to another image's reference
    pub base: String,
    pub build_src: String,
    /// Third-party image pulled and re-tagged instead of building
    pub build_from: String,
    pub prefix: String,
    pub repo: String,
    pub tag: String,
    pub no_push: bool,
}

impl ImageDefinition {
    /// Computes the `[prefix/]repo:tag` reference of this image.
    ///
    /// The image's own fields win; the environment's `image_tag` and
    /// `image_prefix` fill the gaps, then `latest` and no prefix.
    pub fn image_name(&self, env: &EnvConfig) -> String {
        let repo = if self.repo.is_empty() { &self.name } else { &self.repo };
        let tag = [self.tag.as_str(), env.image_tag.as_str()]
            .into_iter()
            .find(|t| !t.is_empty())
            .unwrap_or(DEFAULT_IMAGE_TAG);
        let prefix = if self.prefix.is_empty() { &env.image_prefix } else { &self.prefix };
        let prefix = prefix.trim_end_matches('/');

        if prefix.is_empty() {
            format!("{repo}:{tag}")
        } else {
            format!("{prefix}/{repo}:{tag}")
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    pub configs: Vec<ResourceDefinition>,
    pub kubernetes: Vec<ResourceDefinition>,
}

/// A config bundle or deployment-template set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceDefinition {
    pub name: String,
    pub src: String,
    /// Glob patterns of files to materialize; empty selects everything
    pub files: Vec<String>,
}

/// Definitions that environments reference by name in their allow-lists.
pub trait Named {
    fn name(&self) -> &str;
}

impl Named for BinaryDefinition {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for ImageDefinition {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for ResourceDefinition {
    fn name(&self) -> &str {
        &self.name
    }
}

impl ConfigModel {
    /// Looks up the config directory of a binary, empty when unknown.
    pub fn config_dir(&self, binary: &str) -> &str {
        self.build
            .binaries
            .iter()
            .find(|b| b.name == binary)
            .map(|b| b.config_dir.as_str())
            .unwrap_or_default()
    }

    /// Looks up an image definition and computes its reference for `env`.
    pub fn image_name(&self, image: &str, env: &EnvConfig) -> Option<String> {
        self.build
            .images
            .iter()
            .find(|i| i.name == image)
            .map(|i| i.image_name(env))
    }
}

/// Parses descriptor content, trying JSON first and YAML second.
///
/// # Errors
/// * `Error::ConfigError` if the content is neither valid JSON nor valid YAML
///   for the descriptor schema
pub fn parse_config(content: &str) -> Result<ConfigModel> {
    match serde_json::from_str(content) {
        Ok(config) => Ok(config),
        Err(_) => serde_yaml::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Invalid configuration format: {e}"))),
    }
}

/// Loads the project descriptor.
///
/// When `project` is not set and a `go.mod` sits next to the descriptor, the
/// module path declared there is used as the project name.
///
/// # Arguments
/// * `config_path` - Path to the descriptor file
///
/// # Errors
/// * `Error::ConfigError` if the file is missing, malformed, or the adjacent
///   `go.mod` declares no module
pub fn load_config<P: AsRef<Path>>(config_path: P) -> Result<ConfigModel> {
    let config_path = config_path.as_ref();
    if !config_path.is_file() {
        return Err(Error::ConfigError(format!(
            "Invalid configuration path: {}",
            config_path.display()
        )));
    }
    debug!("Loading configuration from {}", config_path.display());
    let content = std::fs::read_to_string(config_path)?;
    let mut config = parse_config(&content)?;

    let go_mod = config_path.parent().unwrap_or(Path::new("")).join("go.mod");
    if config.project.is_empty() && go_mod.is_file() {
        let content = std::fs::read_to_string(&go_mod)?;
        config.project = module_path(&content).ok_or_else(|| {
            Error::ConfigError(format!("No module declared in {}", go_mod.display()))
        })?;
        debug!("Using module path '{}' as project", config.project);
    }
    Ok(config)
}

/// Extracts the module path from the content of a `go.mod` file.
pub fn module_path(go_mod: &str) -> Option<String> {
    go_mod.lines().find_map(|line| {
        let line = line.split("//").next().unwrap_or_default().trim();
        let rest = line.strip_prefix("module")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let module = rest.trim().trim_matches('"');
        (!module.is_empty()).then(|| module.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_path() {
        assert_eq!(
            module_path("// header\nmodule github.com/acme/shop\n\ngo 1.22\n"),
            Some("github.com/acme/shop".to_string())
        );
        assert_eq!(module_path("module \"example.com/quoted\""), Some("example.com/quoted".to_string()));
        assert_eq!(module_path("modules x\ngo 1.22"), None);
        assert_eq!(module_path(""), None);
    }

    #[test]
    fn test_image_name_prefers_image_fields() {
        let image = ImageDefinition {
            name: "api".into(),
            repo: "shop-api".into(),
            tag: "rc1".into(),
            prefix: "registry.local/".into(),
            ..Default::default()
        };
        let env = EnvConfig {
            image_tag: "v1".into(),
            image_prefix: "acme".into(),
            ..Default::default()
        };
        assert_eq!(image.image_name(&env), "registry.local/shop-api:rc1");
    }

    #[test]
    fn test_image_name_defaults() {
        let image = ImageDefinition { name: "api".into(), ..Default::default() };
        assert_eq!(image.image_name(&EnvConfig::default()), "api:latest");
    }
}
