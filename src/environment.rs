//! Environment resolution.
//! Layers a named environment's overrides onto the `default` environment to
//! produce the effective [`EnvConfig`].
//!
//! A field set in the overlay replaces the default's value; a field that is
//! absent, `null`, an empty string, an empty list or an empty mapping keeps the
//! default's value. An overlay therefore cannot clear a list the default sets:
//! `binaries: []` means "inherit", not "none".

use crate::config::{ConfigModel, EnvConfig};
use crate::error::Result;
use log::{debug, warn};
use serde_yaml::Value;

/// Resolves the effective configuration of `env_name`.
///
/// An empty or unknown name yields `default` unchanged. An overlay that cannot
/// be merged (for instance a list-typed field given as a scalar) also degrades
/// to `default`; the failure is only visible in the log. Use
/// [`try_resolve_env`] to observe it.
pub fn resolve_env(model: &ConfigModel, env_name: &str) -> EnvConfig {
    match try_resolve_env(model, env_name) {
        Ok(env) => env,
        Err(e) => {
            warn!("Environment '{env_name}' could not be resolved, using default: {e}");
            model.default.clone()
        }
    }
}

/// Resolves the effective configuration of `env_name`, surfacing merge failures.
pub fn try_resolve_env(model: &ConfigModel, env_name: &str) -> Result<EnvConfig> {
    if env_name.is_empty() {
        return Ok(model.default.clone());
    }
    let Some(overlay) = model.env.get(env_name) else {
        debug!("Environment '{env_name}' is not defined, using default");
        return Ok(model.default.clone());
    };

    let base = serde_yaml::to_value(&model.default)?;
    let merged = layer(base, overlay);
    Ok(serde_yaml::from_value(merged)?)
}

/// Recursively layers `overlay` onto `base`.
fn layer(base: Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(mut base), Value::Mapping(overlay)) => {
            for (key, value) in overlay {
                if is_unset(value) {
                    continue;
                }
                let merged = match base.get(key) {
                    Some(current) => layer(current.clone(), value),
                    None => value.clone(),
                };
                base.insert(key.clone(), merged);
            }
            Value::Mapping(base)
        }
        (base, overlay) if is_unset(overlay) => base,
        (_, overlay) => overlay.clone(),
    }
}

fn is_unset(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Sequence(s) => s.is_empty(),
        Value::Mapping(m) => m.is_empty(),
        _ => false,
    }
}
