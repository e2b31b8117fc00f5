//! Validate every article's front-matter

use anyhow::Result;

use crate::content::{ContentLoader, LoadReport};
use crate::Folio;

/// Load all articles and report each failure.
///
/// Fails when any file did not load.
pub fn run(folio: &Folio) -> Result<()> {
    tracing::info!("Checking {}", folio.config.title);
    summarize(&folio.load()?)
}

/// Like `run`, parsing files on the blocking pool
pub async fn run_concurrent(folio: &Folio) -> Result<()> {
    tracing::info!("Checking {}", folio.config.title);
    let report = ContentLoader::new(folio)?.load_all_concurrent().await?;
    summarize(&report)
}

fn summarize(report: &LoadReport) -> Result<()> {
    for error in &report.errors {
        println!("error: {}", error);
    }

    let total = report.articles.len() + report.skipped_drafts + report.errors.len();
    if !report.is_clean() {
        anyhow::bail!("{} of {} files failed to load", report.errors.len(), total);
    }

    println!("All {} files OK", total);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use std::fs;
    use tempfile::TempDir;

    fn site(files: &[(&str, &str)]) -> (TempDir, Folio) {
        let tmp = TempDir::new().unwrap();
        let folio = Folio::with_config(tmp.path(), SiteConfig::default());
        fs::create_dir_all(&folio.content_dir).unwrap();
        for (name, content) in files {
            fs::write(folio.content_dir.join(name), content).unwrap();
        }
        (tmp, folio)
    }

    const CLEAN: &[(&str, &str)] = &[
        ("a.md", "---\ntitle: A\n---\nBody"),
        ("b.md", "---\ntitle: B\ndraft: true\n---\n"),
    ];

    #[test]
    fn test_clean_tree_passes() {
        let (_tmp, folio) = site(CLEAN);
        assert!(run(&folio).is_ok());
    }

    #[test]
    fn test_malformed_file_fails_check() {
        let (_tmp, folio) = site(&[
            ("a.md", "---\ntitle: A\n---\n"),
            ("b.md", "---\ntitle: B\n---\n"),
            ("broken.md", "---\nhideTOC: maybe\n---\n"),
        ]);
        let err = run(&folio).unwrap_err();
        assert_eq!(err.to_string(), "1 of 3 files failed to load");
    }

    #[tokio::test]
    async fn test_concurrent_check() {
        let (_tmp, folio) = site(CLEAN);
        assert!(run_concurrent(&folio).await.is_ok());

        fs::write(folio.content_dir.join("c.md"), "no front matter").unwrap();
        let err = run_concurrent(&folio).await.unwrap_err();
        assert_eq!(err.to_string(), "1 of 3 files failed to load");
    }
}
