//! Command-line interface implementation for envplate.
//! Provides argument parsing and help text formatting using clap.

use crate::constants::{DEFAULT_CONFIG_FILE, DEFAULT_FILTER, DEFAULT_TEMPLATE_PREFIX};
use crate::info::BuildOverrides;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments structure for envplate.
#[derive(Parser, Debug)]
#[command(author, version, about = "envplate: environment-aware project build and config rendering tool", long_about = None)]
pub struct Args {
    /// Project descriptor path
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Environment to work on, the default layer when empty
    #[arg(short, long, global = true, default_value = "")]
    pub environment: String,

    /// Regular expression selecting resources by name
    #[arg(short, long, global = true, default_value = DEFAULT_FILTER)]
    pub filter: String,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the project's git repository, Go module and directories
    Init,

    /// Build binaries or images
    Build {
        #[command(subcommand)]
        target: BuildTarget,
    },

    /// Render config bundles or deployment templates
    Generate {
        /// File name prefix marking templates
        #[arg(short = 'x', long, global = true, default_value = DEFAULT_TEMPLATE_PREFIX)]
        prefix: String,

        #[command(subcommand)]
        target: GenerateTarget,
    },
}

#[derive(Subcommand, Debug)]
pub enum BuildTarget {
    /// Build the environment's binaries
    Binary(BinaryArgs),

    /// Build the environment's images
    Image {
        /// Push images after building them
        #[arg(short, long)]
        push: bool,
    },
}

#[derive(clap::Args, Debug)]
pub struct BinaryArgs {
    /// Overwrite product model
    #[arg(long)]
    pub product_model: Option<String>,

    /// Overwrite product version
    #[arg(long)]
    pub product_version: Option<String>,

    /// Overwrite build version
    #[arg(long)]
    pub build_version: Option<String>,

    /// Overwrite build type
    #[arg(long)]
    pub build_type: Option<String>,

    /// Overwrite build date
    #[arg(long)]
    pub build_date: Option<String>,

    /// Binary output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl BinaryArgs {
    pub fn overrides(&self) -> BuildOverrides {
        BuildOverrides {
            product_model: self.product_model.clone(),
            product_version: self.product_version.clone(),
            build_version: self.build_version.clone(),
            build_type: self.build_type.clone(),
            build_date: self.build_date.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum GenerateTarget {
    /// Render config bundles
    Config {
        /// Config output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render deployment templates
    Kubernetes {
        /// Deployment template output directory
        #[arg(short = 't', long)]
        output: Option<PathBuf>,
    },
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With clap's default error handling on invalid arguments
pub fn get_args() -> Args {
    Args::parse()
}
