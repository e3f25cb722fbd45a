//! Work executors: pure derivations from a work key to an outcome
//!
//! - [`files`]: search the root tree for a file and count its palindromes
//! - [`nobel`]: aggregate prize records for a year range from the Data Source

pub mod files;
pub mod nobel;

pub use files::FileAnalyzer;
pub use nobel::{DataSource, NobelApi, Prize};
