//! Common constants used throughout the envplate application.

/// Descriptor file loaded when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "project.yaml";

/// File name prefix marking files that are rendered instead of copied
pub const DEFAULT_TEMPLATE_PREFIX: &str = "template.";

/// Default value of `--filter`, selects every resource
pub const DEFAULT_FILTER: &str = ".*";

/// Name of the key/value file read by `FromSecretEnv`
pub const SECRET_ENV_FILE: &str = "secret.env";

/// Tag used for images when neither the image nor the environment sets one
pub const DEFAULT_IMAGE_TAG: &str = "latest";

/// Template delimiters. Square brackets keep templates clear of the `{{ }}`
/// and `${ }` sequences common in shell scripts, YAML and Helm charts.
pub const VARIABLE_DELIMITERS: (&str, &str) = ("[[", "]]");
pub const BLOCK_DELIMITERS: (&str, &str) = ("[%", "%]");
pub const COMMENT_DELIMITERS: (&str, &str) = ("[#", "#]");

/// Go package whose variables receive build information through `-ldflags -X`
pub const INFO_PACKAGE: &str = "github.com/xhanio/framingo/pkg/types/info";

/// Entries `init` keeps in `.gitignore`, paired with whether they name a directory
pub const GITIGNORE_ENTRIES: [(&str, bool); 4] = [
    ("bin/", true),
    ("dist/", true),
    ("test/", true),
    ("secret.env", false),
];
