// Output generation module

pub mod markdown;
pub mod nav;
pub mod templates;

pub use markdown::*;
pub use nav::*;
pub use templates::*;
