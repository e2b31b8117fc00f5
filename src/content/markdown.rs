//! Markdown preview rendering with syntax highlighting

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use serde::Serialize;
use std::collections::HashMap;
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

/// Marker separating an article's excerpt from the rest
pub const MORE_MARKER: &str = "<!-- more -->";

/// Average reading speed used for `reading_minutes`
const WORDS_PER_MINUTE: usize = 200;

/// A heading in an article body, for a table of contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    pub level: u8,
    pub text: String,
    /// Unique `id` within the article
    pub anchor: String,
}

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_theme("base16-ocean.dark")
    }

    /// Create with a specific syntect theme
    pub fn with_theme(theme: &str) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.to_string(),
        }
    }

    fn options() -> Options {
        // Front-matter is stripped before rendering, so no metadata blocks
        Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_GFM
    }

    /// Render an article body to HTML.
    ///
    /// Headings get the same anchors `table_of_contents` reports.
    pub fn render(&self, markdown: &str) -> String {
        let mut anchors = table_of_contents(markdown).into_iter().map(|h| h.anchor);

        let mut events: Vec<Event> = Vec::new();
        let mut code_lang: Option<String> = None;
        let mut code = String::new();
        let mut in_code = false;

        for event in Parser::new_ext(markdown, Self::options()) {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    in_code = true;
                    code.clear();
                    code_lang = match kind {
                        CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
                        _ => None,
                    };
                }
                Event::End(TagEnd::CodeBlock) => {
                    in_code = false;
                    let highlighted = self.highlight_code(&code, code_lang.as_deref());
                    events.push(Event::Html(CowStr::from(highlighted)));
                }
                Event::Text(text) if in_code => code.push_str(&text),
                Event::Start(Tag::Heading {
                    level,
                    id,
                    classes,
                    attrs,
                }) => {
                    let anchor = anchors.next();
                    let id = id.or_else(|| anchor.map(CowStr::from));
                    events.push(Event::Start(Tag::Heading {
                        level,
                        id,
                        classes,
                        attrs,
                    }));
                }
                other => events.push(other),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next());

        let highlighted = theme.and_then(|theme| {
            highlighted_html_for_string(code, &self.syntax_set, syntax, theme).ok()
        });

        match highlighted {
            Some(html) => format!(r#"<figure class="highlight {}">{}</figure>"#, lang, html),
            None => format!(
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                lang,
                html_escape(code)
            ),
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Collect headings with unique anchors
pub fn table_of_contents(markdown: &str) -> Vec<Heading> {
    let mut headings = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut current: Option<(u8, Option<String>, String)> = None;

    for event in Parser::new_ext(markdown, MarkdownRenderer::options()) {
        match event {
            Event::Start(Tag::Heading { level, id, .. }) => {
                current = Some((level as u8, id.map(|i| i.to_string()), String::new()));
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, _, buf)) = current.as_mut() {
                    buf.push_str(&text);
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, id, text)) = current.take() {
                    let base = id.unwrap_or_else(|| match slug::slugify(&text) {
                        s if s.is_empty() => "section".to_string(),
                        s => s,
                    });
                    let count = seen.entry(base.clone()).or_insert(0);
                    let anchor = if *count == 0 {
                        base
                    } else {
                        format!("{}-{}", base, count)
                    };
                    *count += 1;
                    headings.push(Heading {
                        level,
                        text: text.trim().to_string(),
                        anchor,
                    });
                }
            }
            _ => {}
        }
    }

    headings
}

/// Split the excerpt (before `<!-- more -->`) from the body
pub fn split_excerpt(body: &str) -> Option<&str> {
    body.find(MORE_MARKER).map(|pos| body[..pos].trim())
}

/// Count words in prose, ignoring code blocks and markup
pub fn word_count(markdown: &str) -> usize {
    let mut in_code = false;
    let mut count = 0;
    for event in Parser::new_ext(markdown, MarkdownRenderer::options()) {
        match event {
            Event::Start(Tag::CodeBlock(_)) => in_code = true,
            Event::End(TagEnd::CodeBlock) => in_code = false,
            Event::Text(text) if !in_code => count += text.split_whitespace().count(),
            _ => {}
        }
    }
    count
}

/// Estimated reading time, at least one minute for any non-empty body
pub fn reading_minutes(markdown: &str) -> usize {
    match word_count(markdown) {
        0 => 0,
        words => words.div_ceil(WORDS_PER_MINUTE),
    }
}

/// Simple HTML escaping
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic_markdown() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("# Hello World\n\nThis is a test.");
        assert!(html.contains(r#"<h1 id="hello-world">Hello World</h1>"#));
        assert!(html.contains("<p>This is a test.</p>"));
    }

    #[test]
    fn test_render_code_block() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```ts\nexpect(wrapper.text()).toBe('hi')\n```");
        assert!(html.contains("highlight"));
        assert!(!html.contains("```"));
    }

    #[test]
    fn test_table_of_contents() {
        let body = "# Setup\n\ntext\n\n## Mounting `App`\n\n## Setup\n";
        let toc = table_of_contents(body);
        assert_eq!(toc.len(), 3);
        assert_eq!(toc[0].anchor, "setup");
        assert_eq!(toc[1].level, 2);
        assert_eq!(toc[1].text, "Mounting App");
        assert_eq!(toc[2].anchor, "setup-1");
    }

    #[test]
    fn test_split_excerpt() {
        assert_eq!(
            split_excerpt("Intro.\n<!-- more -->\nRest."),
            Some("Intro.")
        );
        assert_eq!(split_excerpt("No marker"), None);
    }

    #[test]
    fn test_word_count_skips_code() {
        let body = "Two words\n\n```js\nconst a = 1; const b = 2;\n```\n";
        assert_eq!(word_count(body), 2);
        assert_eq!(reading_minutes(body), 1);
        assert_eq!(reading_minutes(""), 0);
    }
}
