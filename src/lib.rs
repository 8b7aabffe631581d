//! envplate builds Go projects and renders their per-environment files.
//! A single project descriptor declares binaries, images, config bundles and
//! deployment templates; environments (dev, staging, prod, ...) layer their
//! overrides onto a shared default.

/// Binary and image builds
pub mod build;

/// Command-line interface module for the envplate application
pub mod cli;

/// Project descriptor model and loader
pub mod config;

/// Common constants
pub mod constants;

/// Render-order checks between config resources
pub mod dependency;

/// Layering of environment overrides onto the default environment
pub mod environment;

/// Error types and handling for the envplate application
pub mod error;

/// Functions available inside templates
pub mod functions;

/// Config bundle and deployment-template generation
pub mod generate;

/// Text helpers for templates
pub mod helpers;

/// Build information injected into binaries
pub mod info;

/// Project initialisation: repository, module, directories, `.gitignore`
pub mod init;

pub mod logger;

/// Directories implied by an environment
pub mod paths;

/// File inclusion patterns
pub mod patterns;

/// Directory-tree rendering
pub mod renderer;

/// External tool invocation
pub mod runner;

/// Name-filtered selection of definitions
pub mod selection;

/// The loaded project a command works on
pub mod workspace;
