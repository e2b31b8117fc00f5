//! Article model

use chrono::NaiveDate;
use serde::Serialize;
use std::path::Path;

use super::frontmatter::DELIMITER;
use super::markdown::{self, Heading};
use super::FrontMatter;
use crate::error::ParseError;

/// One published unit of content: front-matter plus markdown body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    /// Source identifier (path relative to the content dir)
    pub source: String,

    /// Parsed front-matter
    #[serde(flatten)]
    pub meta: FrontMatter,

    /// Markdown after the closing delimiter
    pub body: String,
}

impl Article {
    /// Parse an article from its full text
    pub fn parse(source: &str, content: &str) -> Result<Self, ParseError> {
        let (meta, body) = FrontMatter::parse(source, content)?;
        Ok(Self {
            source: source.to_string(),
            meta,
            body: body.to_string(),
        })
    }

    /// Write the article back out as a front-matter file
    pub fn to_markdown(&self) -> String {
        let mut out = format!("{}\n{}{}\n", DELIMITER, self.meta.to_yaml(), DELIMITER);
        if !self.body.is_empty() {
            out.push('\n');
            out.push_str(&self.body);
            out.push('\n');
        }
        out
    }

    pub fn title(&self) -> Option<&str> {
        self.meta.title.as_deref()
    }

    /// Title, falling back to the file stem
    pub fn title_or_source(&self) -> &str {
        self.title().unwrap_or_else(|| self.file_stem())
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.meta.date
    }

    /// Drafts must say so: an absent `draft` key means published
    pub fn is_draft(&self) -> bool {
        self.meta.draft.unwrap_or(false)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.meta.tags.as_ref().is_some_and(|t| t.contains(tag))
    }

    pub fn in_category(&self, category: &str) -> bool {
        self.meta
            .categories
            .as_ref()
            .is_some_and(|c| c.contains(category))
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.meta.tags.iter().flatten().map(String::as_str)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.meta.categories.iter().flatten().map(String::as_str)
    }

    /// URL-friendly name from the title, or the file stem when untitled
    pub fn slug(&self) -> String {
        match self.title().map(slug::slugify) {
            Some(s) if !s.is_empty() => s,
            _ => slug::slugify(self.file_stem()),
        }
    }

    /// Headings for a table of contents; empty when `hideTOC: true`
    pub fn toc(&self) -> Vec<Heading> {
        if self.meta.hide_toc == Some(true) {
            return Vec::new();
        }
        markdown::table_of_contents(&self.body)
    }

    /// Body text before `<!-- more -->`, if the marker is present
    pub fn excerpt(&self) -> Option<&str> {
        markdown::split_excerpt(&self.body)
    }

    pub fn reading_minutes(&self) -> usize {
        markdown::reading_minutes(&self.body)
    }

    fn file_stem(&self) -> &str {
        Path::new(&self.source)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.source)
    }
}
