//! Functions callable from templates.
//!
//! Besides lookups into the project descriptor, several functions read files
//! other resources have already rendered into the config target directory.
//! A failed read aborts the whole render; it never yields an empty string.
//!
//! Reading another resource's output makes render order significant. Callers
//! must render a config resource before any resource whose templates read it.

use crate::config::{ConfigModel, EnvConfig};
use crate::constants::SECRET_ENV_FILE;
use crate::error::{Error, Result};
use log::{debug, warn};
use minijinja::{Environment, ErrorKind};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Names of the functions that read another resource's rendered output.
pub const CROSS_RESOURCE_FUNCTIONS: [&str; 3] = ["FromConfigFile", "FromConfigJSON", "FromSecretEnv"];

/// The function registry bound to one project and one resolved environment.
#[derive(Debug, Clone)]
pub struct TemplateFunctions {
    config: ConfigModel,
    env: EnvConfig,
}

impl TemplateFunctions {
    pub fn new(config: ConfigModel, env: EnvConfig) -> Self {
        Self { config, env }
    }

    /// `GetEnvKey(key)`: prefixes `key` with the product's environment prefix.
    pub fn env_key(&self, key: &str) -> String {
        let prefix = env_prefix(&self.config.product);
        if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{prefix}_{key}")
        }
    }

    /// `GetConfigDir(binary)`: configured config directory, empty when unknown.
    pub fn config_dir(&self, binary: &str) -> String {
        self.config.config_dir(binary).to_string()
    }

    /// `GetImageName(image)`: full image reference, empty when unknown.
    pub fn image_name(&self, image: &str) -> String {
        self.config.image_name(image, &self.env).unwrap_or_default()
    }

    /// `FromFile(path)`: full content of a file.
    pub fn from_file(&self, path: &str) -> Result<String> {
        std::fs::read_to_string(path)
            .map_err(|e| Error::FunctionError(format!("failed to render from file {path}: {e}")))
    }

    /// `FromConfigFile(resource, filename)`: a file from a rendered config resource.
    pub fn from_config_file(&self, resource: &str, filename: &str) -> Result<String> {
        let path = self.rendered_path(resource, filename);
        std::fs::read_to_string(&path).map_err(|e| {
            Error::FunctionError(format!(
                "failed to render from {resource} config file {}: {e}",
                path.display()
            ))
        })
    }

    /// `FromConfigJSON(resource, filename, query)`: a single value of a rendered
    /// JSON file. Only the read is fatal; a query that matches nothing yields
    /// an empty string.
    ///
    /// Queries are the dotted-path subset described on [`json_query`]; gjson's
    /// `*`/`?` wildcards, `#(...)` queries, modifiers and multipaths are not
    /// supported and match nothing.
    pub fn from_config_json(&self, resource: &str, filename: &str, query: &str) -> Result<String> {
        let content = self.from_config_file(resource, filename)?;
        let document: serde_json::Value = match serde_json::from_str(&content) {
            Ok(document) => document,
            Err(e) => {
                warn!("{resource}/{filename} is not valid JSON: {e}");
                return Ok(String::new());
            }
        };
        Ok(json_query(&document, query))
    }

    /// `FromSecretEnv(resource, key)`: a value of a rendered `secret.env` file.
    pub fn from_secret_env(&self, resource: &str, key: &str) -> Result<String> {
        let path = self.rendered_path(resource, SECRET_ENV_FILE);
        let content = std::fs::read_to_string(&path).map_err(|e| {
            Error::FunctionError(format!("failed to render from {resource} {SECRET_ENV_FILE}: {e}"))
        })?;
        parse_secret_env(&content).remove(key).ok_or_else(|| {
            Error::FunctionError(format!(
                "failed to render from {resource} {SECRET_ENV_FILE}: key {key} not found"
            ))
        })
    }

    fn rendered_path(&self, resource: &str, filename: &str) -> PathBuf {
        Path::new(&self.env.config_tgt).join(resource).join(filename)
    }

    /// Registers every function on a template environment.
    ///
    /// Failures are turned into `minijinja` errors so they abort template
    /// execution, and the renderer reports them like any other template error.
    pub fn register(self: Arc<Self>, env: &mut Environment<'static>) {
        let f = self.clone();
        env.add_function("GetEnvKey", move |key: String| f.env_key(&key));
        let f = self.clone();
        env.add_function("GetConfigDir", move |binary: String| f.config_dir(&binary));
        let f = self.clone();
        env.add_function("GetImageName", move |image: String| f.image_name(&image));
        let f = self.clone();
        env.add_function("FromFile", move |path: String| f.from_file(&path).map_err(fatal));
        let f = self.clone();
        env.add_function("FromConfigFile", move |resource: String, filename: String| {
            f.from_config_file(&resource, &filename).map_err(fatal)
        });
        let f = self.clone();
        env.add_function(
            "FromConfigJSON",
            move |resource: String, filename: String, query: String| {
                f.from_config_json(&resource, &filename, &query).map_err(fatal)
            },
        );
        let f = self;
        env.add_function("FromSecretEnv", move |resource: String, key: String| {
            f.from_secret_env(&resource, &key).map_err(fatal)
        });
    }
}

fn fatal(err: Error) -> minijinja::Error {
    debug!("Template function failed: {err}");
    minijinja::Error::new(ErrorKind::InvalidOperation, err.to_string()).with_source(err)
}

/// Environment variable prefix derived from a product name.
///
/// `"my shop-api"` becomes `"MY_SHOP_API"`.
pub fn env_prefix(product: &str) -> String {
    product.replace([' ', '-'], "_").to_uppercase()
}

/// Parses `KEY=value` lines. Blank lines, `#` comments and lines without `=`
/// are ignored; keys and values are trimmed and a later key wins.
pub fn parse_secret_env(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect()
}

/// Resolves a dotted path such as `server.ports.0.name` in a JSON document.
///
/// Segments index objects by key and arrays by position, `#` yields an array's
/// length and `\.` escapes a literal dot. Strings come back unquoted, other
/// values as JSON text, and a missing or `null` value as an empty string.
/// Wildcards, `#(...)` queries and `@` modifiers are taken as literal keys.
pub fn json_query(document: &serde_json::Value, query: &str) -> String {
    if query.is_empty() {
        return String::new();
    }
    let mut current = document;
    for segment in split_query(query) {
        let next = match current {
            serde_json::Value::Object(map) => map.get(&segment),
            serde_json::Value::Array(items) if segment == "#" => {
                return items.len().to_string();
            }
            serde_json::Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        match next {
            Some(value) => current = value,
            None => return String::new(),
        }
    }
    match current {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn split_query(query: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut segment = String::new();
    let mut chars = query.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => segment.extend(chars.next()),
            '.' => segments.push(std::mem::take(&mut segment)),
            c => segment.push(c),
        }
    }
    if !segment.is_empty() || !segments.is_empty() {
        segments.push(segment);
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_env_prefix() {
        assert_eq!(env_prefix("my shop-api"), "MY_SHOP_API");
        assert_eq!(env_prefix(""), "");
    }

    #[test]
    fn test_parse_secret_env() {
        let kv = parse_secret_env("# comment\n\n DB_USER = admin \nDB_URL=postgres://h/db?a=b\nnoise\n");
        assert_eq!(kv.get("DB_USER").map(String::as_str), Some("admin"));
        assert_eq!(kv.get("DB_URL").map(String::as_str), Some("postgres://h/db?a=b"));
        assert_eq!(kv.len(), 2);
    }

    #[test]
    fn test_json_query() {
        let doc = json!({
            "server": {"ports": [{"name": "http", "port": 8080}], "debug": false},
            "a.b": "dotted",
            "empty": null
        });
        assert_eq!(json_query(&doc, "server.ports.0.name"), "http");
        assert_eq!(json_query(&doc, "server.ports.0.port"), "8080");
        assert_eq!(json_query(&doc, "server.ports.#"), "1");
        assert_eq!(json_query(&doc, "server.debug"), "false");
        assert_eq!(json_query(&doc, r"a\.b"), "dotted");
        assert_eq!(json_query(&doc, "empty"), "");
        assert_eq!(json_query(&doc, "server.missing"), "");
        assert_eq!(json_query(&doc, "server.ports.7"), "");
        assert_eq!(json_query(&doc, ""), "");
        assert_eq!(json_query(&doc, "server.port*"), "");
        assert_eq!(json_query(&doc, "server.ports.#(name==http).port"), "");
    }
}
