//! List site content

use anyhow::Result;
use std::fmt::Write;

use crate::content::{LoadReport, Taxonomy};
use crate::helpers::format_date;
use crate::Folio;

/// List site content by type
pub fn run(folio: &Folio, content_type: &str) -> Result<()> {
    print!("{}", render(folio, content_type)?);
    Ok(())
}

/// The listing `run` prints
pub fn render(folio: &Folio, content_type: &str) -> Result<String> {
    let mut out = String::new();

    let report = match content_type {
        "post" | "posts" => {
            let report = load_sorted(folio)?;
            writeln!(out, "Posts ({}):", report.articles.len())?;
            for article in &report.articles {
                writeln!(out, "  {}", describe(folio, article))?;
            }
            report
        }
        "draft" | "drafts" => {
            // Drafts are listed whatever `include_drafts` says
            let mut with_drafts = folio.clone();
            with_drafts.config.include_drafts = true;
            let report = load_sorted(&with_drafts)?;

            let drafts: Vec<_> = report.articles.iter().filter(|a| a.is_draft()).collect();
            writeln!(out, "Drafts ({}):", drafts.len())?;
            for article in drafts {
                writeln!(out, "  {}", describe(folio, article))?;
            }
            report
        }
        "tag" | "tags" => {
            let report = folio.load()?;
            let taxonomy = Taxonomy::from_articles(&report.articles);
            writeln!(out, "Tags ({}):", taxonomy.tags.len())?;
            for tag in taxonomy.tags {
                writeln!(out, "  {} ({})", tag.name, tag.count)?;
            }
            report
        }
        "category" | "categories" => {
            let report = folio.load()?;
            let taxonomy = Taxonomy::from_articles(&report.articles);
            writeln!(out, "Categories ({}):", taxonomy.categories.len())?;
            for category in taxonomy.categories {
                writeln!(out, "  {} ({})", category.name, category.count)?;
            }
            report
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, draft, tag, category",
                content_type
            );
        }
    };

    warn_failures(&report);
    Ok(out)
}

fn load_sorted(folio: &Folio) -> Result<LoadReport> {
    let mut report = folio.load()?;
    report.sort_by_date();
    Ok(report)
}

fn describe(folio: &Folio, article: &crate::Article) -> String {
    let date = article
        .date()
        .map(|d| format_date(&d, &folio.config.date_format))
        .unwrap_or_else(|| "----------".to_string());
    format!("{} - {} [{}]", date, article.title_or_source(), article.source)
}

fn warn_failures(report: &LoadReport) {
    if !report.is_clean() {
        eprintln!(
            "{} file(s) failed to load, run `folio check` for details",
            report.errors.len()
        );
    }
}
