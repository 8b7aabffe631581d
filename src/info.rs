//! Build information injected into Go binaries.
//! Values are collected from the descriptor, the git repository and the
//! command line, then passed to `go build` as `-ldflags -X` assignments.

use crate::constants::INFO_PACKAGE;
use crate::workspace::Workspace;
use chrono::{SecondsFormat, Utc};
use git2::{DescribeOptions, Repository};
use log::debug;
use std::collections::BTreeMap;
use std::path::Path;

/// Values passed on the command line that replace collected ones.
#[derive(Debug, Clone, Default)]
pub struct BuildOverrides {
    pub product_model: Option<String>,
    pub product_version: Option<String>,
    pub build_version: Option<String>,
    pub build_type: Option<String>,
    pub build_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildInfo {
    pub product_name: String,
    pub product_model: String,
    pub product_version: String,
    pub project_root: String,
    pub project_name: String,
    pub project_path: String,
    pub git_branch: String,
    pub git_tag: String,
    pub build_version: String,
    pub build_type: String,
    pub build_date: String,
    pub build_time: String,
}

impl BuildInfo {
    /// Collects build information for `ws`.
    ///
    /// The build version falls back to the git tag and the product version to
    /// the build version. Overrides are applied last.
    pub fn collect(ws: &Workspace, overrides: &BuildOverrides) -> Self {
        let (git_branch, git_tag) = git_info(&ws.root);
        let gopath_src = Path::new(&std::env::var("GOPATH").unwrap_or_default()).join("src");
        let project_path = ws.root.strip_prefix(&gopath_src).unwrap_or(ws.root.as_path());

        let mut info = Self {
            product_name: ws.config.product.clone(),
            product_model: ws.config.model.clone(),
            product_version: ws.config.version.clone(),
            project_root: ws.root.display().to_string(),
            project_name: ws.config.project.clone(),
            project_path: project_path.display().to_string().trim_matches('/').to_string(),
            git_branch,
            git_tag,
            build_time: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            ..Default::default()
        };
        if info.build_version.is_empty() {
            info.build_version = info.git_tag.clone();
        }
        if info.product_version.is_empty() {
            info.product_version = info.build_version.clone();
        }
        info.apply(overrides);
        info
    }

    fn apply(&mut self, overrides: &BuildOverrides) {
        let fields = [
            (&mut self.product_model, &overrides.product_model),
            (&mut self.product_version, &overrides.product_version),
            (&mut self.build_version, &overrides.build_version),
            (&mut self.build_type, &overrides.build_type),
            (&mut self.build_date, &overrides.build_date),
        ];
        for (field, value) in fields {
            if let Some(value) = value.as_ref().filter(|v| !v.is_empty()) {
                *field = value.clone();
            }
        }
    }

    /// Variable name to value, in the order they are injected.
    pub fn entries(&self) -> BTreeMap<&'static str, &str> {
        BTreeMap::from([
            ("BuildDate", self.build_date.as_str()),
            ("BuildTime", self.build_time.as_str()),
            ("BuildType", self.build_type.as_str()),
            ("BuildVersion", self.build_version.as_str()),
            ("GitBranch", self.git_branch.as_str()),
            ("GitTag", self.git_tag.as_str()),
            ("ProductModel", self.product_model.as_str()),
            ("ProductName", self.product_name.as_str()),
            ("ProductVersion", self.product_version.as_str()),
            ("ProjectName", self.project_name.as_str()),
            ("ProjectPath", self.project_path.as_str()),
            ("ProjectRoot", self.project_root.as_str()),
        ])
    }

    /// `go build` arguments setting every variable of the info package.
    pub fn ldflags(&self) -> [String; 2] {
        let assignments = self
            .entries()
            .into_iter()
            .map(|(key, value)| format!("-X {INFO_PACKAGE}.{key}={value}"))
            .collect::<Vec<_>>()
            .join(" ");
        ["-ldflags".to_string(), assignments]
    }

    /// Human readable version, e.g. `1.2.0 v1.2.0-3-gabc (release)`.
    pub fn version(&self) -> String {
        let mut parts = vec![self.product_version.as_str()];
        if self.build_version != self.product_version {
            parts.push(&self.build_version);
        }
        parts.retain(|p| !p.is_empty());
        let mut version = parts.join(" ");
        if !self.build_type.is_empty() {
            version = format!("{version} ({})", self.build_type).trim().to_string();
        }
        version
    }
}

/// Current branch and `git describe --tags --always` of the repository at
/// `root`. Both are empty when there is no repository.
fn git_info(root: &Path) -> (String, String) {
    let repo = match Repository::discover(root) {
        Ok(repo) => repo,
        Err(e) => {
            debug!("No git repository at {}: {e}", root.display());
            return (String::new(), String::new());
        }
    };
    let branch = repo
        .head()
        .ok()
        .and_then(|head| head.shorthand().map(str::to_string))
        .unwrap_or_default();
    let tag = repo
        .describe(DescribeOptions::new().describe_tags().show_commit_oid_as_fallback(true))
        .and_then(|d| d.format(None))
        .unwrap_or_else(|e| {
            debug!("git describe failed: {e}");
            String::new()
        });
    (branch, tag)
}
