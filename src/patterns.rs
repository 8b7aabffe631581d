//! File inclusion patterns for rendered resources.
//! A resource's `files` list selects which entries of its source tree are
//! materialized, using shell-style globs matched against paths relative to
//! the source root.

use crate::error::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;

/// Compiled `files` patterns of a resource.
///
/// Without patterns every path matches. `*` also crosses directory
/// separators, so `*.yaml` selects `a.yaml` as well as `sub/c.yaml`.
#[derive(Debug, Clone)]
pub struct IncludePatterns {
    set: Option<GlobSet>,
}

impl IncludePatterns {
    /// Compiles the patterns.
    ///
    /// # Errors
    /// * `Error::PatternError` on the first invalid glob
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        if patterns.is_empty() {
            return Ok(Self { set: None });
        }
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            builder.add(Glob::new(pattern.as_ref())?);
        }
        Ok(Self { set: Some(builder.build()?) })
    }

    pub fn is_match<P: AsRef<Path>>(&self, path: P) -> bool {
        self.set.as_ref().map_or(true, |set| set.is_match(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_patterns_match_everything() {
        let patterns = IncludePatterns::new::<&str>(&[]).unwrap();
        assert!(patterns.is_match("anything/at/all.txt"));
    }

    #[test]
    fn test_patterns() {
        let patterns = IncludePatterns::new(&["*.yaml", "certs/**"]).unwrap();
        assert!(patterns.is_match("a.yaml"));
        assert!(patterns.is_match("sub/c.yaml"));
        assert!(patterns.is_match("certs/ca/root.pem"));
        assert!(!patterns.is_match("b.txt"));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(IncludePatterns::new(&["a[.yaml"]).is_err());
    }
}
