//! Helper functions shared by the loader and the CLI

mod date;
mod url;

pub use date::*;
pub use url::*;
