//! Create a new article

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::content::{Article, FrontMatter};
use crate::Folio;

/// Create a new draft article and return its path
pub fn run(folio: &Folio, title: &str, path: Option<&str>) -> Result<PathBuf> {
    let today = chrono::Local::now().date_naive();

    let filename = if let Some(p) = path {
        if p.ends_with(".md") {
            p.to_string()
        } else {
            format!("{}.md", p)
        }
    } else {
        let slug = slug::slugify(title);
        if slug.is_empty() {
            anyhow::bail!("Cannot derive a file name from title {:?}", title);
        }

        folio
            .config
            .new_article_name
            .replace(":title", &slug)
            .replace(":year", &today.format("%Y").to_string())
            .replace(":month", &today.format("%m").to_string())
            .replace(":day", &today.format("%d").to_string())
    };

    let file_path = folio.content_dir.join(&filename);
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let article = Article {
        source: filename,
        meta: FrontMatter {
            title: Some(title.to_string()),
            date: Some(today),
            categories: Some(Default::default()),
            tags: Some(Default::default()),
            target_keyword: Some(String::new()),
            draft: Some(true),
            ..Default::default()
        },
        body: String::new(),
    };

    fs::write(&file_path, article.to_markdown())?;
    tracing::info!("Created: {:?}", file_path);

    Ok(file_path)
}
