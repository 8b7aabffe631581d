//! Directory planning for resolved environments.
//! Derives the source and destination directories implied by an
//! [`EnvConfig`], shared by `init` (which creates them) and `generate`
//! (which renders between them).

use crate::config::EnvConfig;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// The kinds of resources an environment lays out on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Binaries,
    Configs,
    Images,
    Kubernetes,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Binaries,
        ResourceKind::Configs,
        ResourceKind::Images,
        ResourceKind::Kubernetes,
    ];

    /// Source root of this kind in `env`.
    pub fn source_root(self, env: &EnvConfig) -> &str {
        match self {
            ResourceKind::Binaries => &env.binary_src,
            ResourceKind::Configs => &env.config_src,
            ResourceKind::Images => &env.image_build_src,
            ResourceKind::Kubernetes => &env.kubernetes_src,
        }
    }

    /// Target root of this kind in `env`. Images are pushed, not written out.
    pub fn target_root(self, env: &EnvConfig) -> &str {
        match self {
            ResourceKind::Binaries => &env.binary_tgt,
            ResourceKind::Configs => &env.config_tgt,
            ResourceKind::Images => "",
            ResourceKind::Kubernetes => &env.kubernetes_tgt,
        }
    }

    /// Names this kind's allow-list in `env`.
    pub fn allow_list(self, env: &EnvConfig) -> &[String] {
        match self {
            ResourceKind::Binaries => &env.binaries,
            ResourceKind::Configs => &env.configs,
            ResourceKind::Images => &env.images,
            ResourceKind::Kubernetes => &env.kubernetes_templates,
        }
    }

    /// Whether each allowed resource gets its own directory under the target root.
    /// Binaries are written flat into their target directory.
    fn has_target_subdirs(self) -> bool {
        !matches!(self, ResourceKind::Binaries)
    }
}

/// Lists every directory `env` implies, deduplicated and sorted.
///
/// Each non-empty root is included along with one sub-directory per name in
/// the kind's allow-list.
pub fn plan_directories(env: &EnvConfig) -> Vec<PathBuf> {
    let mut dirs = BTreeSet::new();
    for kind in ResourceKind::ALL {
        let names = kind.allow_list(env);
        let roots = [(kind.source_root(env), true), (kind.target_root(env), kind.has_target_subdirs())];
        for (root, with_names) in roots {
            if root.is_empty() {
                continue;
            }
            let root = Path::new(root);
            dirs.insert(root.to_path_buf());
            if with_names {
                dirs.extend(names.iter().map(|name| root.join(name)));
            }
        }
    }
    dirs.into_iter().collect()
}

/// Source directories of a resource, default layer first.
///
/// Only existing directories are returned, and a directory shared by both
/// layers is listed once.
pub fn layer_sources(kind: ResourceKind, default: &EnvConfig, env: &EnvConfig, name: &str) -> Vec<PathBuf> {
    let mut sources: Vec<PathBuf> = Vec::new();
    for layer in [default, env] {
        let root = kind.source_root(layer);
        if root.is_empty() {
            continue;
        }
        let dir = Path::new(root).join(name);
        if dir.is_dir() && !sources.contains(&dir) {
            sources.push(dir);
        }
    }
    sources
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_directories() {
        let env = EnvConfig {
            binary_src: "cmd".into(),
            binary_tgt: "bin".into(),
            binaries: vec!["api".into()],
            config_src: "configs".into(),
            config_tgt: "dist/configs".into(),
            configs: vec!["api".into()],
            image_build_src: "build".into(),
            images: vec!["api".into()],
            ..Default::default()
        };
        let expected: Vec<PathBuf> = [
            "bin",
            "build",
            "build/api",
            "cmd",
            "cmd/api",
            "configs",
            "configs/api",
            "dist/configs",
            "dist/configs/api",
        ]
        .iter()
        .map(PathBuf::from)
        .collect();
        assert_eq!(plan_directories(&env), expected);
    }

    #[test]
    fn test_plan_directories_empty_env() {
        assert!(plan_directories(&EnvConfig::default()).is_empty());
    }
}
