#![forbid(unsafe_code)]
//! Placeholder normalization for Android string resources.
//!
//! Content authors write template placeholders in many inconsistent ways:
//! `{str}`, `{ User }`, backslash-escaped unicode braces, numeric character
//! references. This crate rewrites them into positional format specifiers
//! (`%1$s`, `%2$s`, ...) that `String.format` accepts, reusing the index of a
//! placeholder every time the same one appears again.
//!
//! # Quick Start
//!
//! ```rust
//! use fmtsanitize::{SanitizeConfig, normalize};
//!
//! // Plain text
//! assert_eq!(normalize("{user}:{org} {USER}").text, "%1$s:%2$s %1$s");
//!
//! // A values resource document
//! let rewriter = SanitizeConfig::default().rewriter();
//! let xml = r#"<resources><string name="prompt_header">"{str}"</string></resources>"#;
//! let outcome = rewriter.rewrite_str(xml)?;
//! assert_eq!(
//!     outcome.content(),
//!     Some(r#"<resources><string name="prompt_header">"%1$s"</string></resources>"#)
//! );
//! # Ok::<(), fmtsanitize::Error>(())
//! ```
//!
//! # Modules
//!
//! - [`matcher`]: recognizes one placeholder token in any supported encoding
//! - [`normalizer`]: rewrites a text unit, assigning positional indices
//! - [`document`] and [`rewriter`]: apply the normalizer to the target element of a markup document
//! - [`config`]: target name and keyword configuration

pub mod config;
pub mod document;
pub mod error;
pub mod matcher;
pub mod normalizer;
pub mod rewriter;

// Re-export most used types for easy consumption
pub use crate::{
    config::SanitizeConfig,
    document::{Document, Element, Node},
    error::Error,
    matcher::{Match, TokenMatcher, try_match_marker},
    normalizer::{Normalized, Normalizer, normalize},
    rewriter::{RewriteOutcome, RewriteReport, Rewriter},
};
