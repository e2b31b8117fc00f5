//! Show a single parsed article

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

use crate::content::{Article, Attachment, ContentLoader, Heading, MarkdownRenderer};
use crate::Folio;

/// Output format for `show`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// The article re-serialized as front-matter plus body
    Yaml,
    Json,
    /// Rendered body preview
    Html,
}

impl std::str::FromStr for Format {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "yaml" | "md" | "markdown" => Ok(Format::Yaml),
            "json" => Ok(Format::Json),
            "html" => Ok(Format::Html),
            _ => anyhow::bail!("Unknown format: {}. Available: yaml, json, html", s),
        }
    }
}

/// Everything `show --format json` prints about an article
#[derive(Debug, Serialize)]
pub struct ArticleView<'a> {
    #[serde(flatten)]
    pub article: &'a Article,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<Attachment>,
    pub toc: Vec<Heading>,
    pub reading_minutes: usize,
}

impl<'a> ArticleView<'a> {
    pub fn new(folio: &Folio, article: &'a Article) -> Self {
        Self {
            article,
            slug: article.slug(),
            cover: article.meta.image.as_ref().map(|i| i.resolve(&folio.config)),
            toc: article.toc(),
            reading_minutes: article.reading_minutes(),
        }
    }
}

/// Render one article in the requested format
pub fn render(folio: &Folio, file: &Path, format: Format) -> Result<String> {
    // Relative paths are tried against the content dir first
    let path = if file.is_relative() && folio.content_dir.join(file).is_file() {
        folio.content_dir.join(file)
    } else {
        file.to_path_buf()
    };

    let loader = ContentLoader::new(folio)?;
    let article = loader
        .load_file(&path)
        .with_context(|| format!("failed to load {:?}", file))?;

    let output = match format {
        Format::Yaml => article.to_markdown(),
        Format::Json => serde_json::to_string_pretty(&ArticleView::new(folio, &article))?,
        Format::Html => MarkdownRenderer::new().render(&article.body),
    };
    Ok(output)
}

/// Run the show command
pub fn run(folio: &Folio, file: &Path, format: Format) -> Result<()> {
    println!("{}", render(folio, file, format)?);
    Ok(())
}
