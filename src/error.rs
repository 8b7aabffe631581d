//! Error handling for the envplate application.
//! Defines custom error types and results used throughout the application.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Custom error types for envplate operations.
///
/// This enum represents all possible errors that can occur while loading a
/// project descriptor, rendering trees or running build tools.
/// It implements the standard Error trait through thiserror's derive macro.
#[derive(Error, Debug)]
pub enum Error {
    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),

    /// Represents errors in the project descriptor or command options
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    #[error("YAML error: {0}.")]
    YamlError(#[from] serde_yaml::Error),

    #[error("JSON error: {0}.")]
    JsonError(#[from] serde_json::Error),

    /// Represents invalid glob patterns in a resource's file list
    #[error("Pattern error: {0}.")]
    PatternError(#[from] globset::Error),

    /// Represents an invalid `--filter` expression
    #[error("Filter error: {0}.")]
    FilterError(#[from] regex::Error),

    /// Represents template parse or execution failures, including fatal
    /// template function failures
    #[error("Template error in '{}': {source}.", path.display())]
    TemplateError {
        path: PathBuf,
        #[source]
        source: minijinja::Error,
    },

    /// Represents a template whose file name or content is not valid UTF-8
    #[error("Template '{}' is not valid UTF-8.", .0.display())]
    EncodingError(PathBuf),

    /// Represents a template function that could not produce its value
    #[error("{0}")]
    FunctionError(String),

    /// Represents resources that read each other's rendered output
    #[error("Dependency cycle between resources: {0}.")]
    DependencyCycle(String),

    #[error("Unknown platform '{0}', expected <os>/<arch>.")]
    PlatformError(String),

    /// Represents an external tool exiting unsuccessfully
    #[error("Command '{command}' failed with status: {status}.")]
    CommandError { command: String, status: String },

    #[error("Git error: {0}.")]
    GitError(#[from] git2::Error),
}

/// Convenience type alias for Results with envplate's Error as the error type.
///
/// # Type Parameters
/// * `T` - The type of the success value
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Arguments
/// * `err` - The Error to handle
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{err}");
    std::process::exit(1);
}
