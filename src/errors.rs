use std::io;
use thiserror::Error;

/// Everything that can go wrong while locating, parsing or rendering
/// a template.
///
/// A more derived block definition overriding a base one is never an
/// error; that is what blocks are for.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Template {path:?} not found (searched {})", .searched.join(", "))]
    TemplateNotFound { path: String, searched: Vec<String> },

    #[error("Cyclic template inheritance: {}", .chain.join(" -> "))]
    CyclicInheritance { chain: Vec<String> },

    #[error("Unknown theme {0:?}")]
    UnknownTheme(String),

    #[error("{0:?} names the default templates and can not be a theme")]
    ReservedThemeName(String),

    #[error("Invalid template path {0:?}")]
    InvalidPath(String),

    #[error("Failed to parse template {template:?}:\n{message}")]
    Parse { template: String, message: String },

    #[error("Block {block:?} defined more than once in {template:?}")]
    DuplicateBlock { template: String, block: String },

    #[error("@super() outside of a block in {template:?}")]
    SuperOutsideBlock { template: String },

    #[error("Parameter {parameter:?} given twice to snippet {snippet:?} in {template:?}")]
    DuplicateParameter {
        template: String,
        snippet: String,
        parameter: String,
    },

    #[error("Block {block:?} in {template:?} calls @super() but no ancestor defines it")]
    NoParentBlock { template: String, block: String },

    #[error("Undefined variable {name:?} in {template:?}")]
    UndefinedVariable { template: String, name: String },

    #[error("Cannot loop over {expr:?} in {template:?}, it is not a list")]
    NotIterable { template: String, expr: String },

    #[error("Cannot output {expr:?} in {template:?}, it is a map")]
    NotDisplayable { template: String, expr: String },

    #[error("Helper {helper} called with wrong arguments in {template:?}")]
    HelperArguments {
        template: String,
        helper: &'static str,
    },

    #[error("Snippets nested deeper than {max} levels at {path:?}")]
    IncludeDepth { path: String, max: usize },

    #[error("Failed to read {path:?} from {root}: {source}")]
    Read {
        root: String,
        path: String,
        source: io::Error,
    },

    #[error("Bad configuration: {0}")]
    Config(String),

    #[error("Failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Bad json data: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
