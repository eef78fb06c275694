//! Configuration for which resource is rewritten and which placeholders are recognized.
//!
//! Loaded from TOML; every field is optional.
//!
//! ```toml
//! target_name = "prompt_header"
//! keywords = ["str", "user", "org"]
//! resource_dir = "res"
//! ```

use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::{
    error::Error,
    matcher::{DEFAULT_KEYWORDS, TokenMatcher},
    normalizer::Normalizer,
    rewriter::Rewriter,
};

pub const DEFAULT_TARGET_NAME: &str = "prompt_header";
pub const DEFAULT_RESOURCE_DIR: &str = "res";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SanitizeConfig {
    /// Value of the `name` attribute identifying the resource to rewrite.
    pub target_name: String,
    /// Placeholder keywords, compared case-insensitively.
    pub keywords: Vec<String>,
    /// Name of the directory holding `values*/` folders.
    pub resource_dir: String,
}

impl Default for SanitizeConfig {
    fn default() -> Self {
        SanitizeConfig {
            target_name: DEFAULT_TARGET_NAME.to_string(),
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            resource_dir: DEFAULT_RESOURCE_DIR.to_string(),
        }
    }
}

impl SanitizeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, Error> {
        let config: SanitizeConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a TOML config file.
    pub fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn with_target_name(mut self, target_name: impl Into<String>) -> Self {
        self.target_name = target_name.into();
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_resource_dir(mut self, resource_dir: impl Into<String>) -> Self {
        self.resource_dir = resource_dir.into();
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.target_name.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "target_name must not be empty".to_string(),
            ));
        }
        if self.keywords.is_empty() {
            return Err(Error::InvalidConfig(
                "keywords must not be empty".to_string(),
            ));
        }
        if let Some(bad) = self
            .keywords
            .iter()
            .find(|k| k.is_empty() || !k.bytes().all(|b| b.is_ascii_alphabetic()))
        {
            return Err(Error::InvalidConfig(format!(
                "keyword `{}` must consist of ASCII letters only",
                bad
            )));
        }
        if self.resource_dir.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "resource_dir must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn matcher(&self) -> TokenMatcher {
        TokenMatcher::new(&self.keywords)
    }

    pub fn normalizer(&self) -> Normalizer {
        Normalizer::new(self.matcher())
    }

    pub fn rewriter(&self) -> Rewriter {
        Rewriter::new(self.target_name.clone(), self.normalizer())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SanitizeConfig::default();
        assert_eq!(config.target_name, "prompt_header");
        assert_eq!(config.keywords, vec!["str", "user", "org"]);
        assert_eq!(config.resource_dir, "res");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SanitizeConfig::from_toml_str("target_name = \"welcome_banner\"").unwrap();
        assert_eq!(config.target_name, "welcome_banner");
        assert_eq!(config.keywords, vec!["str", "user", "org"]);
    }

    #[test]
    fn test_full_toml() {
        let config = SanitizeConfig::from_toml_str(
            r#"
            target_name = "header"
            keywords = ["name"]
            resource_dir = "resources"
            "#,
        )
        .unwrap();
        assert_eq!(config.target_name, "header");
        assert_eq!(config.keywords, vec!["name"]);
        assert_eq!(config.resource_dir, "resources");
        assert_eq!(config.matcher().keywords(), &["name".to_string()]);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = SanitizeConfig::from_toml_str("target = \"x\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_invalid_keyword_is_rejected() {
        let err = SanitizeConfig::from_toml_str("keywords = [\"st r\"]").unwrap_err();
        assert!(err.to_string().contains("ASCII letters"));

        let err = SanitizeConfig::from_toml_str("keywords = []").unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn test_empty_target_name_is_rejected() {
        let config = SanitizeConfig::new().with_target_name("  ");
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_read_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "keywords = [\"str\"]").unwrap();
        let config = SanitizeConfig::read_from(file.path()).unwrap();
        assert_eq!(config.keywords, vec!["str"]);
    }

    #[test]
    fn test_read_from_missing_file() {
        let err = SanitizeConfig::read_from("/nonexistent/fmtsanitize.toml").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
