//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,

    // Directory
    pub content_dir: String,
    /// File extensions treated as articles
    pub extensions: Vec<String>,
    /// Glob patterns (relative to content_dir) that are never loaded
    #[serde(default)]
    pub exclude: Vec<String>,

    // Writing
    pub new_article_name: String,
    pub include_drafts: bool,

    // Attachments referenced from `image:`
    pub attachments_dir: String,
    pub attachments_url: String,

    // Date format (Moment.js tokens)
    pub date_format: String,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Folio".to_string(),

            content_dir: "content".to_string(),
            extensions: vec!["md".to_string(), "markdown".to_string()],
            exclude: Vec::new(),

            new_article_name: ":title.md".to_string(),
            include_drafts: false,

            attachments_dir: "attachments".to_string(),
            attachments_url: "/attachments/".to_string(),

            date_format: "YYYY-MM-DD".to_string(),
            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {:?}", path))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse config {:?}", path))?;
        config.exclude_patterns()?;
        Ok(config)
    }

    /// Compile the `exclude` globs
    pub fn exclude_patterns(&self) -> Result<Vec<Pattern>> {
        self.exclude
            .iter()
            .map(|p| Pattern::new(p).with_context(|| format!("invalid exclude pattern `{}`", p)))
            .collect()
    }

    /// Whether a file extension marks an article
    pub fn is_article_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.content_dir, "content");
        assert!(!config.include_drafts);
        assert!(config.is_article_extension("md"));
        assert!(config.is_article_extension("MARKDOWN"));
        assert!(!config.is_article_extension("txt"));
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: Testing Notes
content_dir: posts
include_drafts: true
exclude:
  - "templates/**"
giscus: enabled
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "Testing Notes");
        assert_eq!(config.content_dir, "posts");
        assert!(config.include_drafts);
        assert_eq!(config.attachments_dir, "attachments");
        assert_eq!(config.exclude_patterns().unwrap().len(), 1);
        assert!(config.extra.contains_key("giscus"));
    }

    #[test]
    fn test_author_is_kept_as_extra() {
        let config: SiteConfig = serde_yaml::from_str("author: Jane\n").unwrap();
        assert_eq!(
            config.extra.get("author"),
            Some(&serde_yaml::Value::String("Jane".to_string()))
        );
    }

    #[test]
    fn test_invalid_exclude_pattern() {
        let config = SiteConfig {
            exclude: vec!["[".to_string()],
            ..Default::default()
        };
        assert!(config.exclude_patterns().is_err());
    }
}
