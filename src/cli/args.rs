//! CLI argument parsing

use clap::Parser;
use std::path::PathBuf;

/// Banner and synopsis printed on a usage error
pub const USAGE: &str = "
=====================================
Hello this is the documentation tool!
=====================================

Usage:
    pydoc-md <source path> <markdown path> <manifest path>
";

/// Line printed after the usage text when the paths are missing
pub const USAGE_ERROR: &str = "[error] Please provide relevant paths!";

/// Generate Markdown API docs from Python sources
#[derive(Parser, Debug)]
#[command(name = "pydoc-md")]
#[command(about = "Generate Markdown API docs from Python sources")]
#[command(version)]
pub struct Args {
    /// Python file or directory to document
    pub source: PathBuf,

    /// Directory receiving the Markdown pages
    pub markdown: PathBuf,

    /// YAML site manifest whose `nav` is rebuilt
    pub manifest: PathBuf,
}
