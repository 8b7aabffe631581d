//! Name-filtered selection of build and generate definitions.

use crate::config::Named;
use log::debug;
use regex::Regex;

/// Returns the definitions an environment works on.
///
/// The result follows the order of `allow_list`. Names rejected by `filter`
/// are dropped, and names with no matching definition are skipped silently so
/// stale references in an environment do not break a run.
pub fn select<'a, T: Named>(allow_list: &[String], filter: &Regex, definitions: &'a [T]) -> Vec<&'a T> {
    let mut selected = Vec::new();
    for name in allow_list {
        if !filter.is_match(name) {
            debug!("Skipping '{name}', filtered out");
            continue;
        }
        let before = selected.len();
        selected.extend(definitions.iter().filter(|d| d.name() == name));
        if selected.len() == before {
            debug!("Skipping '{name}', no definition found");
        }
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResourceDefinition;

    fn resource(name: &str) -> ResourceDefinition {
        ResourceDefinition { name: name.to_string(), ..Default::default() }
    }

    fn names(selected: &[&ResourceDefinition]) -> Vec<String> {
        selected.iter().map(|r| r.name.clone()).collect()
    }

    #[test]
    fn test_select_keeps_allow_list_order() {
        let defs = vec![resource("a"), resource("b"), resource("c")];
        let allow = vec!["c".to_string(), "a".to_string()];
        let filter = Regex::new(".*").unwrap();
        assert_eq!(names(&select(&allow, &filter, &defs)), vec!["c", "a"]);
    }

    #[test]
    fn test_select_skips_stale_and_filtered_names() {
        let defs = vec![resource("api"), resource("worker")];
        let allow = vec!["api".to_string(), "gone".to_string(), "worker".to_string()];
        let filter = Regex::new("^w").unwrap();
        assert_eq!(names(&select(&allow, &filter, &defs)), vec!["worker"]);
    }
}
