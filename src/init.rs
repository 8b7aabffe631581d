//! Project initialisation.
//! Prepares a working tree for the other commands: a git repository, a Go
//! module, every directory the environments lay out and a `.gitignore`
//! covering build output and secrets.

use crate::config::EnvConfig;
use crate::constants::GITIGNORE_ENTRIES;
use crate::environment::resolve_env;
use crate::error::Result;
use crate::logger::title;
use crate::paths::plan_directories;
use crate::runner::{CommandRunner, ToolCommand};
use crate::workspace::Workspace;
use git2::Repository;
use globset::Glob;
use log::{debug, info, warn};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Initialises the project rooted at `ws.root`.
///
/// Directories are created for the default environment plus the selected
/// one, or plus every environment when none is selected.
pub fn init_project(ws: &Workspace, runner: &dyn CommandRunner) -> Result<()> {
    title(&ws.env_name, "Initializing project directories");

    if Repository::discover(&ws.root).is_err() {
        info!("initializing git repository");
        Repository::init(&ws.root)?;
    }

    if !ws.root.join("go.mod").exists() {
        info!("initializing go module");
        let mut command = ToolCommand::new("go").args(["mod", "init"]).dir(&ws.root);
        if !ws.config.project.is_empty() {
            command = command.arg(ws.config.project.as_str());
        }
        runner.run(&command)?;
    }

    create_env_directories(&ws.root, "default", &ws.config.default)?;
    if ws.env_name.is_empty() {
        for env_name in ws.config.env.keys() {
            create_env_directories(&ws.root, env_name, &resolve_env(&ws.config, env_name))?;
        }
    } else {
        create_env_directories(&ws.root, &ws.env_name, &ws.env)?;
    }

    ensure_gitignore(&ws.root.join(".gitignore"))?;
    Ok(())
}

/// Creates the directories `env` implies under `root`, returning the ones
/// that did not exist yet.
pub fn create_env_directories(root: &Path, env_name: &str, env: &EnvConfig) -> Result<Vec<PathBuf>> {
    let mut created = Vec::new();
    for dir in plan_directories(env) {
        let path = root.join(&dir);
        if path.is_dir() {
            continue;
        }
        fs::create_dir_all(&path)?;
        info!("create directories {} for environment {env_name} successfully", dir.display());
        created.push(path);
    }
    Ok(created)
}

/// Appends the required entries missing from the `.gitignore` at `path`,
/// creating the file if needed. Returns the entries that were added.
pub fn ensure_gitignore(path: &Path) -> Result<Vec<String>> {
    info!("managing .gitignore file");
    let existing = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e.into()),
    };
    let patterns: Vec<&str> = existing.lines().collect();

    let missing: Vec<String> = GITIGNORE_ENTRIES
        .iter()
        .filter(|(entry, is_dir)| !is_ignored(&patterns, entry, *is_dir))
        .map(|(entry, _)| entry.to_string())
        .collect();
    if missing.is_empty() {
        debug!("all required entries are already covered by .gitignore");
        if !path.exists() {
            fs::write(path, "")?;
        }
        return Ok(missing);
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    if !existing.is_empty() && !existing.ends_with('\n') {
        writeln!(file)?;
    }
    for entry in &missing {
        writeln!(file, "{entry}")?;
        info!("added to .gitignore: {entry}");
    }
    Ok(missing)
}

/// Whether a top-level `entry` is ignored by gitignore-style `patterns`.
///
/// Covers the common forms: plain names, globs, a leading `/` anchoring the
/// pattern to the root, a trailing `/` restricting it to directories and `!`
/// negation. Later patterns win.
pub fn is_ignored(patterns: &[&str], entry: &str, is_dir: bool) -> bool {
    let name = entry.trim_end_matches('/');
    let mut ignored = false;
    for line in patterns {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (negated, pattern) = match line.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, line),
        };
        let dir_only = pattern.ends_with('/');
        if dir_only && !is_dir {
            continue;
        }
        let pattern = pattern.trim_end_matches('/');
        let glob = match pattern.strip_prefix('/') {
            Some(anchored) => anchored.to_string(),
            None if pattern.contains('/') => pattern.to_string(),
            None => format!("**/{pattern}"),
        };
        let matcher = match Glob::new(&glob).map(|g| g.compile_matcher()) {
            Ok(matcher) => matcher,
            Err(e) => {
                warn!("Ignoring invalid .gitignore pattern '{line}': {e}");
                continue;
            }
        };
        if matcher.is_match(name) {
            ignored = !negated;
        }
    }
    ignored
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_ignored() {
        assert!(is_ignored(&["bin/"], "bin/", true));
        assert!(!is_ignored(&["bin/"], "secret.env", false));
        assert!(is_ignored(&["*.env"], "secret.env", false));
        assert!(is_ignored(&["/dist"], "dist/", true));
        assert!(!is_ignored(&["# bin/"], "bin/", true));
        assert!(!is_ignored(&["*.env", "!secret.env"], "secret.env", false));
        assert!(!is_ignored(&["secret.env/"], "secret.env", false));
    }
}
