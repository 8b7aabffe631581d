//! Config bundle and deployment-template generation.
//! Renders every selected resource of the environment from its layered
//! sources (default environment first, selected environment second) into
//! `<output>/<name>`.

use crate::config::ResourceDefinition;
use crate::dependency::{check_render_order, template_references};
use crate::error::{Error, Result};
use crate::logger::title;
use crate::paths::{layer_sources, ResourceKind};
use crate::renderer::TreeRenderer;
use crate::workspace::Workspace;
use indexmap::IndexMap;
use log::debug;
use std::path::{Path, PathBuf};

/// Renders the environment's config bundles.
///
/// Resources are rendered in allow-list order. Templates may read the
/// rendered output of earlier config resources; a cycle of such reads is
/// rejected before any output is touched.
///
/// # Arguments
/// * `ws` - Loaded workspace
/// * `prefix` - File name prefix marking templates
/// * `output` - Output root, defaults to the environment's `config_tgt`
pub fn generate_configs(ws: &Workspace, prefix: &str, output: Option<&Path>) -> Result<()> {
    let resources = ws.select(&ws.env.configs, &ws.config.generate.configs);
    let plan = plan(ws, ResourceKind::Configs, &resources)?;

    let mut dependencies = IndexMap::new();
    for (resource, sources) in &plan {
        dependencies.insert(resource.name.clone(), template_references(sources, prefix)?);
    }
    check_render_order(&dependencies)?;

    let output = output_root(ResourceKind::Configs, ws, output)?;
    render_all(ws, "config", &plan, &output, prefix)
}

/// Renders the environment's deployment templates.
///
/// Deployment templates may read rendered config bundles, so configs are
/// expected to be generated first.
pub fn generate_kubernetes(ws: &Workspace, prefix: &str, output: Option<&Path>) -> Result<()> {
    let resources = ws.select(&ws.env.kubernetes_templates, &ws.config.generate.kubernetes);
    let plan = plan(ws, ResourceKind::Kubernetes, &resources)?;
    let output = output_root(ResourceKind::Kubernetes, ws, output)?;
    render_all(ws, "kubernetes template", &plan, &output, prefix)
}

type Plan<'a> = Vec<(&'a ResourceDefinition, Vec<PathBuf>)>;

fn plan<'a>(ws: &Workspace, kind: ResourceKind, resources: &[&'a ResourceDefinition]) -> Result<Plan<'a>> {
    Ok(resources
        .iter()
        .map(|resource| (*resource, sources(ws, kind, resource)))
        .collect())
}

/// Layered sources of a resource; an explicit `src` replaces the layering.
fn sources(ws: &Workspace, kind: ResourceKind, resource: &ResourceDefinition) -> Vec<PathBuf> {
    if !resource.src.is_empty() {
        let src = PathBuf::from(&resource.src);
        return if src.is_dir() { vec![src] } else { Vec::new() };
    }
    layer_sources(kind, &ws.config.default, &ws.env, &resource.name)
}

fn output_root(kind: ResourceKind, ws: &Workspace, output: Option<&Path>) -> Result<PathBuf> {
    match output {
        Some(output) => Ok(output.to_path_buf()),
        None if !kind.target_root(&ws.env).is_empty() => Ok(PathBuf::from(kind.target_root(&ws.env))),
        None => Err(Error::ConfigError(format!(
            "No output directory for {kind:?}: pass --output or set a target in the environment"
        ))),
    }
}

fn render_all(ws: &Workspace, label: &str, plan: &Plan, output: &Path, prefix: &str) -> Result<()> {
    let renderer = TreeRenderer::new(&ws.config, &ws.env)?;
    for (resource, sources) in plan {
        if sources.is_empty() {
            debug!("No sources for {label} {}, skipping", resource.name);
            continue;
        }
        let sources_list = sources
            .iter()
            .map(|s| s.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        title(
            &ws.env_name,
            &format!("Generate {label} {} from {sources_list}", resource.name),
        );
        let dst = output.join(&resource.name);
        renderer.render_layers(&resource.name, sources, &dst, prefix, &resource.files)?;
    }
    Ok(())
}
