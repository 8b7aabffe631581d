//! Render-order checks for config resources.
//! Templates that call `FromConfigFile`, `FromConfigJSON` or `FromSecretEnv`
//! read another resource's rendered output, so that resource has to be
//! rendered first. Cycles between resources can never be satisfied and are
//! rejected before anything is written.

use crate::error::{Error, Result};
use crate::functions::CROSS_RESOURCE_FUNCTIONS;
use crate::renderer::template_name;
use indexmap::{IndexMap, IndexSet};
use log::{debug, warn};
use regex::Regex;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Collects the resources read by the templates under `dirs`.
///
/// Only files carrying the template prefix are scanned, and only calls whose
/// first argument is a string literal are recognised.
pub fn template_references<P: AsRef<Path>>(dirs: &[P], prefix: &str) -> Result<IndexSet<String>> {
    let pattern = Regex::new(&format!(
        r#"(?:{})\s*\(\s*["']([^"']+)["']"#,
        CROSS_RESOURCE_FUNCTIONS.join("|")
    ))?;

    let mut references = IndexSet::new();
    for dir in dirs {
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|e| Error::IoError(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            if template_name(&entry.file_name().to_string_lossy(), prefix).is_none() {
                continue;
            }
            let content = fs::read_to_string(entry.path())?;
            for captures in pattern.captures_iter(&content) {
                references.insert(captures[1].to_string());
            }
        }
    }
    Ok(references)
}

/// Checks that `resources`, in render order, can read each other's output.
///
/// Each entry maps a resource to the resources its templates read. Reading
/// its own output is allowed (an environment layer may read what the default
/// layer just wrote), and references to resources outside the map are left to
/// fail at render time if their output is missing.
///
/// # Errors
/// * `Error::DependencyCycle` naming the resources of the first cycle found
pub fn check_render_order(resources: &IndexMap<String, IndexSet<String>>) -> Result<()> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Visiting,
        Done,
    }

    fn visit(
        name: &str,
        resources: &IndexMap<String, IndexSet<String>>,
        marks: &mut IndexMap<String, Mark>,
        stack: &mut Vec<String>,
    ) -> Result<()> {
        match marks.get(name) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::Visiting) => {
                let start = stack.iter().position(|n| n == name).unwrap_or_default();
                let mut cycle = stack[start..].to_vec();
                cycle.push(name.to_string());
                return Err(Error::DependencyCycle(cycle.join(" -> ")));
            }
            None => {}
        }
        marks.insert(name.to_string(), Mark::Visiting);
        stack.push(name.to_string());
        for dependency in resources.get(name).into_iter().flatten() {
            if dependency != name && resources.contains_key(dependency) {
                visit(dependency, resources, marks, stack)?;
            }
        }
        stack.pop();
        marks.insert(name.to_string(), Mark::Done);
        Ok(())
    }

    let mut marks = IndexMap::new();
    for name in resources.keys() {
        visit(name, resources, &mut marks, &mut Vec::new())?;
    }

    for (position, (name, dependencies)) in resources.iter().enumerate() {
        for dependency in dependencies {
            match resources.get_index_of(dependency) {
                Some(index) if index > position => warn!(
                    "'{name}' reads the output of '{dependency}', which is rendered after it"
                ),
                Some(_) => {}
                None if dependency != name => {
                    debug!("'{name}' reads the output of '{dependency}', which is not rendered in this run")
                }
                None => {}
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(&str, Vec<&str>)]) -> IndexMap<String, IndexSet<String>> {
        edges
            .iter()
            .map(|(name, deps)| (name.to_string(), deps.iter().map(|d| d.to_string()).collect()))
            .collect()
    }

    #[test]
    fn test_acyclic_order_is_accepted() {
        let resources = graph(&[("db", vec![]), ("api", vec!["db", "api"]), ("web", vec!["api", "external"])]);
        assert!(check_render_order(&resources).is_ok());
    }

    #[test]
    fn test_cycle_is_rejected() {
        let resources = graph(&[("a", vec!["b"]), ("b", vec!["c"]), ("c", vec!["a"])]);
        match check_render_order(&resources) {
            Err(Error::DependencyCycle(cycle)) => assert_eq!(cycle, "a -> b -> c -> a"),
            other => panic!("Expected DependencyCycle, got {other:?}"),
        }
    }
}
