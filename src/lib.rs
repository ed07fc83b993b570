//! pydoc-md - Generate Markdown API docs from Python sources
//!
//! Extracts docstrings of classes, methods and functions from Python files,
//! writes one Markdown page per file (plus a page per HTTP endpoint), and
//! rebuilds the `nav` of a YAML site manifest to match.

pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod logging;
pub mod model;
pub mod output;
pub mod parser;

// Re-export main types
pub use config::Config;
pub use error::{Error, Result};
pub use generator::{Generator, RunReport};
pub use model::{ClassDoc, CompiledDoc, Doc, FunctionDoc};
pub use parser::{DocstringStyle, PythonParser};
