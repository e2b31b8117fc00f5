//! Content loader - loads articles from the content directory

use anyhow::Result;
use glob::Pattern;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tokio::task::{JoinError, JoinSet};
use walkdir::WalkDir;

use super::Article;
use crate::error::{LoadError, ParseError, ParseErrorKind};
use crate::Folio;

/// Outcome of loading a whole content directory
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Successfully parsed articles
    pub articles: Vec<Article>,
    /// One entry per file that failed to load
    pub errors: Vec<LoadError>,
    /// Drafts left out because `include_drafts` is off
    pub skipped_drafts: usize,
}

impl LoadReport {
    /// Whether every file loaded
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Newest first; undated articles last
    pub fn sort_by_date(&mut self) {
        self.articles.sort_by(|a, b| b.date().cmp(&a.date()));
    }

    /// Order errors by file, relative to `content_dir`
    pub fn sort_errors(&mut self, content_dir: &Path) {
        self.errors.sort_by_key(|e| e.file(content_dir));
    }

    fn record(&mut self, result: Result<Article, LoadError>, include_drafts: bool) {
        match result {
            Ok(article) if article.is_draft() && !include_drafts => {
                tracing::debug!("Skipping draft {}", article.source);
                self.skipped_drafts += 1;
            }
            Ok(article) => self.articles.push(article),
            Err(e) => {
                tracing::warn!("Failed to load {}", e);
                self.errors.push(e);
            }
        }
    }
}

/// Loads articles from the content directory
pub struct ContentLoader<'a> {
    folio: &'a Folio,
    excludes: Vec<Pattern>,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(folio: &'a Folio) -> Result<Self> {
        Ok(Self {
            folio,
            excludes: folio.config.exclude_patterns()?,
        })
    }

    /// Lazily walk the content directory, yielding one result per article file
    pub fn iter(&self) -> impl Iterator<Item = Result<Article, LoadError>> + '_ {
        self.files().map(move |path| path.and_then(|p| self.load_file(&p)))
    }

    /// Load every article, recording per-file failures without stopping
    pub fn load_all(&self) -> Result<LoadReport> {
        let mut report = LoadReport::default();
        if !self.content_exists() {
            return Ok(report);
        }

        for result in self.iter() {
            report.record(result, self.folio.config.include_drafts);
        }

        tracing::info!(
            "Loaded {} articles ({} failed, {} drafts skipped)",
            report.articles.len(),
            report.errors.len(),
            report.skipped_drafts
        );
        Ok(report)
    }

    /// Same contract as `load_all`, parsing files on the blocking pool.
    ///
    /// Results are ordered by source path.
    pub async fn load_all_concurrent(&self) -> Result<LoadReport> {
        let mut report = LoadReport::default();
        if !self.content_exists() {
            return Ok(report);
        }

        let mut tasks = JoinSet::new();
        for path in self.files() {
            match path {
                Ok(path) => {
                    let content_dir = self.folio.content_dir.clone();
                    tasks.spawn_blocking(move || read_article(&content_dir, &path));
                }
                Err(e) => report.record(Err(e), true),
            }
        }

        let content_dir = &self.folio.content_dir;
        while let Some(joined) = tasks.join_next().await {
            report.record(
                flatten_joined(content_dir, joined),
                self.folio.config.include_drafts,
            );
        }

        report.articles.sort_by(|a, b| a.source.cmp(&b.source));
        report.sort_errors(content_dir);

        tracing::info!(
            "Loaded {} articles concurrently ({} failed, {} drafts skipped)",
            report.articles.len(),
            report.errors.len(),
            report.skipped_drafts
        );
        Ok(report)
    }

    /// Load a single article file
    pub fn load_file(&self, path: &Path) -> Result<Article, LoadError> {
        read_article(&self.folio.content_dir, path)
    }

    /// Parse an in-memory article
    pub fn load_str(&self, source: &str, content: &str) -> Result<Article, ParseError> {
        Article::parse(source, content)
    }

    fn content_exists(&self) -> bool {
        let exists = self.folio.content_dir.is_dir();
        if !exists {
            tracing::warn!(
                "Content directory {:?} does not exist",
                self.folio.content_dir
            );
        }
        exists
    }

    /// Article files under the content directory, in file-name order
    fn files(&self) -> impl Iterator<Item = Result<PathBuf, LoadError>> + '_ {
        let root = &self.folio.content_dir;
        WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            // `_drafts`, `.obsidian` and friends are never content
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name().to_str()))
            .filter_map(move |entry| match entry {
                Ok(entry) => {
                    let path = entry.path();
                    (entry.file_type().is_file() && self.is_article(path))
                        .then(|| Ok(path.to_path_buf()))
                }
                Err(e) => Some(Err(walk_error(root, e))),
            })
    }

    fn is_article(&self, path: &Path) -> bool {
        let has_extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| self.folio.config.is_article_extension(e))
            .unwrap_or(false);
        if !has_extension {
            return false;
        }

        let relative = path.strip_prefix(&self.folio.content_dir).unwrap_or(path);
        let excluded = self.excludes.iter().any(|p| p.matches_path(relative));
        if excluded {
            tracing::debug!("Excluded {:?}", relative);
        }
        !excluded
    }
}

/// Read and parse one file; `source` is its path relative to `content_dir`
fn read_article(content_dir: &Path, path: &Path) -> Result<Article, LoadError> {
    let source = path
        .strip_prefix(content_dir)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/");

    let bytes = fs::read(path).map_err(|e| LoadError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let content = String::from_utf8(bytes)
        .map_err(|_| ParseError::new(&source, 1, ParseErrorKind::InvalidUtf8))?;

    tracing::debug!("Parsing {}", source);
    Ok(Article::parse(&source, &content)?)
}

/// A task that did not finish becomes a per-file failure, not a batch failure
fn flatten_joined(
    content_dir: &Path,
    joined: Result<Result<Article, LoadError>, JoinError>,
) -> Result<Article, LoadError> {
    joined.unwrap_or_else(|e| {
        Err(LoadError::Task {
            path: content_dir.to_path_buf(),
            message: e.to_string(),
        })
    })
}

fn is_hidden(name: Option<&str>) -> bool {
    name.map(|n| n.starts_with('_') || n.starts_with('.'))
        .unwrap_or(false)
}

fn walk_error(root: &Path, e: walkdir::Error) -> LoadError {
    let path = e.path().unwrap_or(root).to_path_buf();
    let message = e.to_string();
    let source = e
        .into_io_error()
        .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, message));
    LoadError::Io { path, source }
}
