//! folio-rs: a front-matter article loader for markdown blogs
//!
//! This crate reads a directory of markdown articles, each starting with a
//! `---` delimited YAML front-matter block, into typed `Article` records.
//! A malformed file is reported as a `ParseError` without stopping the rest
//! of the batch.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod helpers;

pub use content::{Article, FrontMatter, LoadReport};
pub use error::{LoadError, ParseError, ParseErrorKind};

use anyhow::Result;
use std::path::{Path, PathBuf};

/// The main Folio application
#[derive(Debug, Clone)]
pub struct Folio {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Content (articles) directory
    pub content_dir: PathBuf,
}

impl Folio {
    /// Create a new Folio instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let config_path = base_dir.as_ref().join("_config.yml");

        let config = if config_path.exists() {
            tracing::debug!("Loading config from {:?}", config_path);
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Create an instance with an explicit configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let content_dir = base_dir.join(&config.content_dir);

        Self {
            config,
            base_dir,
            content_dir,
        }
    }

    /// Load every article in the content directory
    pub fn load(&self) -> Result<LoadReport> {
        content::ContentLoader::new(self)?.load_all()
    }

    /// Create a new article
    pub fn new_article(&self, title: &str, path: Option<&str>) -> Result<PathBuf> {
        commands::new::run(self, title, path)
    }
}
