//! Tag and category counts across articles

use indexmap::IndexMap;
use serde::Serialize;

use super::Article;

/// A tag or category with the number of articles using it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Term {
    pub name: String,
    pub slug: String,
    pub count: usize,
}

/// Shared tag and category vocabulary of a set of articles
#[derive(Debug, Clone, Default, Serialize)]
pub struct Taxonomy {
    pub tags: Vec<Term>,
    pub categories: Vec<Term>,
}

impl Taxonomy {
    pub fn from_articles(articles: &[Article]) -> Self {
        Self {
            tags: count_terms(articles.iter().flat_map(|a| a.tags())),
            categories: count_terms(articles.iter().flat_map(|a| a.categories())),
        }
    }

    pub fn tag(&self, name: &str) -> Option<&Term> {
        self.tags.iter().find(|t| t.name == name)
    }

    pub fn category(&self, name: &str) -> Option<&Term> {
        self.categories.iter().find(|t| t.name == name)
    }
}

/// Most used first, ties broken by name
fn count_terms<'a>(names: impl Iterator<Item = &'a str>) -> Vec<Term> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for name in names {
        *counts.entry(name).or_insert(0) += 1;
    }

    let mut terms: Vec<Term> = counts
        .into_iter()
        .map(|(name, count)| Term {
            name: name.to_string(),
            slug: slug::slugify(name),
            count,
        })
        .collect();
    terms.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(source: &str, front_matter: &str) -> Article {
        Article::parse(source, &format!("---\n{}\n---\n", front_matter)).unwrap()
    }

    #[test]
    fn test_counts_and_order() {
        let articles = vec![
            article("a.md", "tags: [vue, vitest]\ncategories: [Testing]"),
            article("b.md", "tags: [vue]\ncategories: [Testing, Frontend]"),
            article("c.md", "title: untagged"),
        ];
        let taxonomy = Taxonomy::from_articles(&articles);

        assert_eq!(taxonomy.tags.len(), 2);
        assert_eq!(taxonomy.tags[0].name, "vue");
        assert_eq!(taxonomy.tags[0].count, 2);
        assert_eq!(taxonomy.tag("vitest").map(|t| t.count), Some(1));

        assert_eq!(taxonomy.categories[0].name, "Testing");
        assert_eq!(taxonomy.categories[1].slug, "frontend");
        assert!(taxonomy.category("Backend").is_none());
    }

    #[test]
    fn test_ties_sorted_by_name() {
        let articles = vec![article("a.md", "tags: [zod, ava, mocha]")];
        let names: Vec<_> = Taxonomy::from_articles(&articles)
            .tags
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["ava", "mocha", "zod"]);
    }
}
