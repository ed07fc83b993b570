use std::path::PathBuf;
use thiserror::Error;

/// Everything that can abort a documentation run
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed pydoc-md.toml: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ConfigValidation(String),

    #[error("Source path does not exist: {0}")]
    PathNotFound(PathBuf),

    /// Python source that tree-sitter could not parse cleanly
    #[error("Cannot parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Rendering failed: {0}")]
    Template(#[from] tera::Error),

    #[error("Malformed YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Manifest that is valid YAML but not a usable site document
    #[error("Bad manifest {path}: {message}")]
    Manifest { path: PathBuf, message: String },

    #[error("Bad exclude pattern: {0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("Cannot walk source tree: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("tree-sitter setup failed: {0}")]
    Parser(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn config_validation(msg: impl Into<String>) -> Self {
        Error::ConfigValidation(msg.into())
    }

    /// Syntax problem in the source file at `path`
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn manifest(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Manifest {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn parser(msg: impl Into<String>) -> Self {
        Error::Parser(msg.into())
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }
}
