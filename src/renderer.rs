//! Directory-tree rendering.
//! Walks a resource's source tree and materializes it into the destination
//! tree: entries whose name carries the template prefix are rendered with
//! MiniJinja and written without the prefix, everything else is copied
//! byte for byte.
//!
//! Templates may refer to the context Go-style, with a leading dot
//! (`[[ .Name ]]`, `[% if .Env.image_prefix %]`). Both spellings resolve to the
//! same values. Template files must be UTF-8, in name and content.
use crate::config::{ConfigModel, EnvConfig};
use crate::constants::{BLOCK_DELIMITERS, COMMENT_DELIMITERS, VARIABLE_DELIMITERS};
use crate::error::{Error, Result};
use crate::functions::TemplateFunctions;
use crate::helpers::register_helpers;
use crate::patterns::IncludePatterns;
use log::{debug, info};
use minijinja::syntax::SyntaxConfig;
use minijinja::{AutoEscape, Environment, UndefinedBehavior, Value};
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use walkdir::WalkDir;

/// Trait for template rendering engines.
pub trait TemplateRenderer {
    /// Renders a template string with the given context.
    ///
    /// # Arguments
    /// * `name` - Name reported in error locations
    /// * `template` - Template string to render
    /// * `context` - Context variables for rendering
    fn render(&self, name: &str, template: &str, context: &Value) -> std::result::Result<String, minijinja::Error>;
}

/// MiniJinja-based template rendering engine.
pub struct MiniJinjaRenderer {
    /// MiniJinja environment with the project's syntax and functions
    env: Environment<'static>,
}

impl MiniJinjaRenderer {
    /// Creates an engine using `[[ ]]` delimiters and exposing `functions`.
    pub fn new(functions: TemplateFunctions) -> Result<Self> {
        let syntax = SyntaxConfig::builder()
            .variable_delimiters(VARIABLE_DELIMITERS.0, VARIABLE_DELIMITERS.1)
            .block_delimiters(BLOCK_DELIMITERS.0, BLOCK_DELIMITERS.1)
            .comment_delimiters(COMMENT_DELIMITERS.0, COMMENT_DELIMITERS.1)
            .build()
            .map_err(|e| Error::ConfigError(format!("Invalid template syntax: {e}")))?;

        let mut env = Environment::new();
        env.set_syntax(syntax);
        env.set_keep_trailing_newline(true);
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        register_helpers(&mut env);
        Arc::new(functions).register(&mut env);
        Ok(Self { env })
    }
}

impl TemplateRenderer for MiniJinjaRenderer {
    fn render(&self, name: &str, template: &str, context: &Value) -> std::result::Result<String, minijinja::Error> {
        self.env.render_named_str(name, &normalize_field_refs(template), context)
    }
}

/// Values visible to templates as `Name`, `Config` and `Env`.
#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct RenderContext<'a> {
    name: &'a str,
    config: &'a ConfigModel,
    env: &'a EnvConfig,
}

/// Renders resource trees for one project and one resolved environment.
pub struct TreeRenderer<'a> {
    config: &'a ConfigModel,
    env: &'a EnvConfig,
    engine: Box<dyn TemplateRenderer>,
}

impl<'a> TreeRenderer<'a> {
    pub fn new(config: &'a ConfigModel, env: &'a EnvConfig) -> Result<Self> {
        let functions = TemplateFunctions::new(config.clone(), env.clone());
        let engine = Box::new(MiniJinjaRenderer::new(functions)?);
        Ok(Self { config, env, engine })
    }

    /// Renders one source tree into `dst`.
    ///
    /// `dst` is removed first, so nothing from a previous run survives.
    /// Any failure aborts the walk and leaves `dst` partially written.
    ///
    /// # Arguments
    /// * `name` - Resource name, exposed to templates as `Name`
    /// * `src` - Source tree
    /// * `dst` - Destination tree, owned by the renderer
    /// * `prefix` - File name prefix marking templates
    /// * `patterns` - Globs selecting the entries to materialize
    pub fn render<P: AsRef<Path>>(
        &self,
        name: &str,
        src: P,
        dst: &Path,
        prefix: &str,
        patterns: &[String],
    ) -> Result<()> {
        self.render_layers(name, &[src], dst, prefix, patterns)
    }

    /// Renders several source trees into one destination, in order.
    ///
    /// `dst` is cleaned once before the first layer, so files of a later layer
    /// replace same-named files of an earlier one.
    pub fn render_layers<P: AsRef<Path>>(
        &self,
        name: &str,
        sources: &[P],
        dst: &Path,
        prefix: &str,
        patterns: &[String],
    ) -> Result<()> {
        let includes = IncludePatterns::new(patterns)?;
        for src in sources {
            ensure_outside(src.as_ref(), dst)?;
        }
        clean_dir(dst)?;
        fs::create_dir_all(dst)?;

        let context = Value::from_serialize(RenderContext {
            name,
            config: self.config,
            env: self.env,
        });
        for src in sources {
            self.render_tree(src.as_ref(), dst, prefix, &includes, &context)?;
        }
        Ok(())
    }

    fn render_tree(
        &self,
        src: &Path,
        dst: &Path,
        prefix: &str,
        includes: &IncludePatterns,
        context: &Value,
    ) -> Result<()> {
        debug!("Rendering tree {} into {}", src.display(), dst.display());
        for entry in WalkDir::new(src).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| Error::IoError(e.into()))?;
            let path = entry.path();
            let relative = path
                .strip_prefix(src)
                .map_err(|e| Error::ConfigError(e.to_string()))?;

            let file_name = entry.file_name().to_string_lossy();
            let rendered_name = template_name(&file_name, prefix);
            let logical = match rendered_name {
                Some(stripped) => relative.with_file_name(stripped),
                None => relative.to_path_buf(),
            };

            if !includes.is_match(&logical) {
                debug!("Skipping {}, not included", relative.display());
                continue;
            }

            if entry.file_type().is_dir() {
                fs::create_dir_all(dst.join(relative))?;
                continue;
            }

            match rendered_name {
                Some(stripped) => {
                    if entry.file_name().to_str().is_none() {
                        return Err(Error::EncodingError(path.to_path_buf()));
                    }
                    let target = dst.join(relative.with_file_name(stripped));
                    info!("render {} from {}", logical.display(), path.display());
                    let template = String::from_utf8(fs::read(path)?)
                        .map_err(|_| Error::EncodingError(path.to_path_buf()))?;
                    let content = self
                        .engine
                        .render(&relative.to_string_lossy(), &template, context)
                        .map_err(|source| Error::TemplateError {
                            path: path.to_path_buf(),
                            source,
                        })?;
                    write_file(&target, &content)?;
                }
                None => {
                    info!("copy {} from {}", relative.display(), path.display());
                    copy_file(path, &dst.join(relative))?;
                }
            }
        }
        Ok(())
    }
}

/// Name of the rendered file when `file_name` carries the template prefix.
///
/// An empty prefix marks every file as a template. A name that is nothing
/// but the prefix is copied as is.
pub fn template_name<'n>(file_name: &'n str, prefix: &str) -> Option<&'n str> {
    file_name.strip_prefix(prefix).filter(|s| !s.is_empty())
}

/// Rewrites Go-style field references inside `[[ ]]` and `[% %]` tags into
/// plain lookups: `.Env.image_tag` becomes `Env.image_tag`.
///
/// A dot is dropped only where an expression starts, so attribute access
/// (`Env.image_tag`), numbers (`1.5`) and string literals are left alone.
/// The bare `.` of Go templates has no equivalent.
pub fn normalize_field_refs(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut tag_close: Option<char> = None;
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
    let mut prev = ' ';

    while let Some(c) = chars.next() {
        let Some(close) = tag_close else {
            out.push(c);
            if c == '[' {
                if let Some(&(next @ ('[' | '%'))) = chars.peek() {
                    out.push(next);
                    chars.next();
                    tag_close = Some(if next == '[' { ']' } else { '%' });
                    depth = 0;
                    prev = ' ';
                }
            }
            continue;
        };

        if let Some(q) = quote {
            out.push(c);
            if c == '\\' {
                out.extend(chars.next());
            } else if c == q {
                quote = None;
            }
            prev = c;
            continue;
        }

        match c {
            '[' => depth += 1,
            ']' if depth > 0 => depth -= 1,
            _ if c == close && depth == 0 && chars.peek() == Some(&']') => {
                out.push(c);
                out.extend(chars.next());
                tag_close = None;
                continue;
            }
            '.' if !ends_operand(prev) && chars.peek().is_some_and(|n| n.is_alphabetic() || *n == '_') => {
                continue;
            }
            '"' | '\'' => quote = Some(c),
            _ => {}
        }
        out.push(c);
        prev = c;
    }
    out
}

fn ends_operand(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | ')' | ']' | '"' | '\'')
}

/// Refuses destinations that would swallow a source tree when cleaned.
fn ensure_outside(src: &Path, dst: &Path) -> Result<()> {
    let (Ok(src_abs), Ok(dst_abs)) = (src.canonicalize(), dst.canonicalize()) else {
        return Ok(());
    };
    if src_abs.starts_with(&dst_abs) {
        return Err(Error::ConfigError(format!(
            "Destination {} contains source {}",
            dst.display(),
            src.display()
        )));
    }
    Ok(())
}

fn clean_dir(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => {
            debug!("Removed {}", dir.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content).map_err(Error::IoError)
}

fn copy_file(source: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(source, dest).map(|_| ()).map_err(Error::IoError)
}
