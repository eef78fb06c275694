//! CLI library for testing purposes

pub mod config;
pub mod locate;
pub mod sanitize;

pub use config::{ConfigOverrides, resolve_config};
pub use fmtsanitize::SanitizeConfig;
pub use locate::find_values_resources;
pub use sanitize::{FileResult, FileStatus, sanitize_file, sanitize_files};
