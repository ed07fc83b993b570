// Parser module for extracting documentation from Python source files

pub mod decorators;
pub mod docstring;
mod literal;
mod python;

pub use docstring::DocstringStyle;
pub use python::PythonParser;
