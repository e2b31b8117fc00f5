//! Front-matter parsing

use chrono::NaiveDate;
use indexmap::{IndexMap, IndexSet};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use serde_yaml::{Mapping, Value};

use super::AttachmentRef;
use crate::error::{ParseError, ParseErrorKind};
use crate::helpers::parse_date;

/// Marker line that opens and closes a front-matter block
pub const DELIMITER: &str = "---";

lazy_static! {
    // serde_yaml reports repeated keys without a location
    static ref DUPLICATE_KEY: Regex = Regex::new(r#"duplicate entry with key "([^"]*)""#).unwrap();
}

/// Front-matter data from an article.
///
/// Every field is `None` when its key is absent (or `null`) in the source
/// file, so callers can tell "not written" from "written as false".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrontMatter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// Order-insensitive: two sets with the same members compare equal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<IndexSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<IndexSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<AttachmentRef>,
    #[serde(rename = "imageOG", skip_serializing_if = "Option::is_none")]
    pub image_og: Option<bool>,
    #[serde(rename = "hideCoverImage", skip_serializing_if = "Option::is_none")]
    pub hide_cover_image: Option<bool>,
    #[serde(rename = "hideTOC", skip_serializing_if = "Option::is_none")]
    pub hide_toc: Option<bool>,
    #[serde(rename = "targetKeyword", skip_serializing_if = "Option::is_none")]
    pub target_keyword: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft: Option<bool>,

    /// Additional custom fields, in source order
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// The raw pieces of a file: YAML text, where it starts, and the body
struct Block<'a> {
    yaml: &'a str,
    /// 1-based file line of the first YAML line
    first_line: usize,
    body: &'a str,
}

impl FrontMatter {
    /// Parse front-matter from a file's content.
    ///
    /// `file` names the source in any error. Returns the front-matter and
    /// the body with leading blank lines and trailing whitespace removed.
    pub fn parse<'a>(file: &str, content: &'a str) -> Result<(Self, &'a str), ParseError> {
        let block = split(file, content)?;
        let body = trim_body(block.body);

        if block.yaml.trim().is_empty() {
            return Ok((FrontMatter::default(), body));
        }

        let value: Value =
            serde_yaml::from_str(block.yaml).map_err(|e| syntax_error(file, &block, e))?;

        let mapping = match value {
            Value::Mapping(m) => m,
            // Only comments between the delimiters
            Value::Null => return Ok((FrontMatter::default(), body)),
            _ => {
                return Err(ParseError::new(
                    file,
                    block.first_line,
                    ParseErrorKind::NotAMapping,
                ))
            }
        };

        let fm = FieldReader {
            file,
            yaml: block.yaml,
            first_line: block.first_line,
        }
        .read(mapping)?;

        Ok((fm, body))
    }

    /// Whether no field at all was set
    pub fn is_empty(&self) -> bool {
        *self == FrontMatter::default()
    }

    /// Serialize back to `key: value` lines (without delimiters).
    ///
    /// Known keys come first in a fixed order, then custom keys in source
    /// order. Strings are double-quoted and lists use indented `- "item"`
    /// entries, so parsing the output yields an equal `FrontMatter`.
    pub fn to_yaml(&self) -> String {
        let mut out = String::new();

        if let Some(title) = &self.title {
            push_string(&mut out, "title", title);
        }
        if let Some(date) = &self.date {
            out.push_str(&format!("date: {}\n", date.format("%Y-%m-%d")));
        }
        if let Some(categories) = &self.categories {
            push_list(&mut out, "categories", categories);
        }
        if let Some(tags) = &self.tags {
            push_list(&mut out, "tags", tags);
        }
        if let Some(image) = &self.image {
            push_string(&mut out, "image", image.raw());
        }
        push_bool(&mut out, "imageOG", self.image_og);
        push_bool(&mut out, "hideCoverImage", self.hide_cover_image);
        push_bool(&mut out, "hideTOC", self.hide_toc);
        if let Some(keyword) = &self.target_keyword {
            push_string(&mut out, "targetKeyword", keyword);
        }
        push_bool(&mut out, "draft", self.draft);

        for (key, value) in &self.extra {
            let mut single = Mapping::new();
            single.insert(Value::String(key.clone()), value.clone());
            match serde_yaml::to_string(&single) {
                Ok(yaml) => out.push_str(&yaml),
                Err(e) => tracing::warn!("Skipping unserializable field `{}`: {}", key, e),
            }
        }

        out
    }
}

/// Locate the front-matter block
fn split<'a>(file: &str, content: &'a str) -> Result<Block<'a>, ParseError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut lines = content.split_inclusive('\n');
    let opening = lines.next().unwrap_or("");
    if opening.trim_end() != DELIMITER {
        return Err(ParseError::new(file, 1, ParseErrorKind::MissingFrontMatter));
    }

    let yaml_start = opening.len();
    let mut offset = yaml_start;
    for line in lines {
        if line.trim_end() == DELIMITER {
            return Ok(Block {
                yaml: &content[yaml_start..offset],
                first_line: 2,
                body: &content[offset + line.len()..],
            });
        }
        offset += line.len();
    }

    Err(ParseError::new(file, 1, ParseErrorKind::UnclosedFrontMatter))
}

/// Drop whole leading blank lines and trailing whitespace
fn trim_body(body: &str) -> &str {
    let mut rest = body;
    while let Some(end) = rest.find('\n') {
        if !rest[..end].trim().is_empty() {
            break;
        }
        rest = &rest[end + 1..];
    }
    rest.trim_end()
}

fn syntax_error(file: &str, block: &Block, e: serde_yaml::Error) -> ParseError {
    let message = e.to_string();
    if let Some(key) = DUPLICATE_KEY.captures(&message).map(|c| c[1].to_string()) {
        let line = key_lines(block.yaml, &key)
            .nth(1)
            .map(|i| block.first_line + i)
            .unwrap_or(block.first_line);
        return ParseError::new(file, line, ParseErrorKind::Syntax(message)).with_field(key);
    }

    let line = e.location().map(|l| l.line()).unwrap_or(1);
    ParseError::new(
        file,
        block.first_line + line - 1,
        ParseErrorKind::Syntax(message),
    )
}

/// Converts a YAML mapping into typed fields, locating errors by key
struct FieldReader<'a> {
    file: &'a str,
    yaml: &'a str,
    first_line: usize,
}

impl FieldReader<'_> {
    fn read(&self, mapping: Mapping) -> Result<FrontMatter, ParseError> {
        let mut fm = FrontMatter::default();

        for (key, value) in mapping {
            let key = match key {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                other => {
                    return Err(self.error(
                        "",
                        ParseErrorKind::InvalidType {
                            expected: "a string key",
                            found: describe(&other),
                        },
                    ))
                }
            };

            // `key:` with nothing after it counts as absent
            if value.is_null() {
                continue;
            }

            match key.as_str() {
                "title" => fm.title = Some(self.string(&key, &value)?),
                "date" => fm.date = Some(self.date(&key, &value)?),
                "categories" => fm.categories = Some(self.string_set(&key, &value)?),
                "tags" => fm.tags = Some(self.string_set(&key, &value)?),
                "image" => fm.image = Some(self.image(&key, &value)?),
                "imageOG" => fm.image_og = Some(self.boolean(&key, &value)?),
                "hideCoverImage" => fm.hide_cover_image = Some(self.boolean(&key, &value)?),
                "hideTOC" => fm.hide_toc = Some(self.boolean(&key, &value)?),
                "targetKeyword" => fm.target_keyword = Some(self.string(&key, &value)?),
                "draft" => fm.draft = Some(self.boolean(&key, &value)?),
                _ => {
                    fm.extra.insert(key, value);
                }
            }
        }

        Ok(fm)
    }

    fn string(&self, key: &str, value: &Value) -> Result<String, ParseError> {
        scalar_string(value).ok_or_else(|| self.invalid(key, "a string", value))
    }

    fn boolean(&self, key: &str, value: &Value) -> Result<bool, ParseError> {
        value
            .as_bool()
            .ok_or_else(|| self.invalid(key, "a boolean (`true` or `false`)", value))
    }

    fn date(&self, key: &str, value: &Value) -> Result<NaiveDate, ParseError> {
        let raw = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return Err(self.invalid(key, "a date", value)),
        };
        parse_date(&raw).ok_or_else(|| self.error(key, ParseErrorKind::InvalidDate(raw)))
    }

    /// A list of strings, or a single string as a one-element set
    fn string_set(&self, key: &str, value: &Value) -> Result<IndexSet<String>, ParseError> {
        match value {
            Value::Sequence(items) => items
                .iter()
                .map(|item| scalar_string(item).ok_or_else(|| self.invalid(key, "a string", item)))
                .collect(),
            _ => scalar_string(value)
                .map(|s| IndexSet::from([s]))
                .ok_or_else(|| self.invalid(key, "a list of strings", value)),
        }
    }

    fn image(&self, key: &str, value: &Value) -> Result<AttachmentRef, ParseError> {
        if let Some(s) = scalar_string(value) {
            return Ok(AttachmentRef::parse(&s));
        }
        // Unquoted `[[path]]` reads as a list holding a one-element list
        unwrap_nested_link(value)
            .map(|inner| AttachmentRef::parse(&format!("[[{}]]", inner)))
            .ok_or_else(|| self.invalid(key, "an attachment path", value))
    }

    fn invalid(&self, key: &str, expected: &'static str, value: &Value) -> ParseError {
        self.error(
            key,
            ParseErrorKind::InvalidType {
                expected,
                found: describe(value),
            },
        )
    }

    fn error(&self, key: &str, kind: ParseErrorKind) -> ParseError {
        let err = ParseError::new(self.file, self.key_line(key), kind);
        if key.is_empty() {
            err
        } else {
            err.with_field(key)
        }
    }

    /// File line on which a top-level key is written
    fn key_line(&self, key: &str) -> usize {
        if key.is_empty() {
            return self.first_line;
        }
        key_lines(self.yaml, key)
            .next()
            .map(|i| self.first_line + i)
            .unwrap_or(self.first_line)
    }
}

/// 0-based indices of the YAML lines that write `key`
fn key_lines<'a>(yaml: &'a str, key: &'a str) -> impl Iterator<Item = usize> + 'a {
    yaml.lines()
        .enumerate()
        .filter(move |(_, line)| is_key_line(line, key))
        .map(|(i, _)| i)
}

fn is_key_line(line: &str, key: &str) -> bool {
    [format!("\"{}\"", key), format!("'{}'", key), key.to_string()]
        .iter()
        .any(|k| {
            line.strip_prefix(k.as_str())
                .is_some_and(|rest| rest.trim_start().starts_with(':'))
        })
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn unwrap_nested_link(value: &Value) -> Option<String> {
    match value.as_sequence()?.as_slice() {
        [Value::Sequence(inner)] => match inner.as_slice() {
            [item] => scalar_string(item),
            _ => None,
        },
        _ => None,
    }
}

/// Short description of a YAML value for error messages
fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean `{}`", b),
        Value::Number(n) => format!("number `{}`", n),
        Value::String(s) => format!("string `{}`", s),
        Value::Sequence(_) => "a list".to_string(),
        Value::Mapping(_) => "a mapping".to_string(),
        Value::Tagged(t) => format!("tagged value `{}`", t.tag),
    }
}

fn quote(s: &str) -> String {
    // A JSON string literal is a valid YAML double-quoted scalar
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s))
}

fn push_string(out: &mut String, key: &str, value: &str) {
    out.push_str(&format!("{}: {}\n", key, quote(value)));
}

fn push_bool(out: &mut String, key: &str, value: Option<bool>) {
    if let Some(b) = value {
        out.push_str(&format!("{}: {}\n", key, b));
    }
}

fn push_list(out: &mut String, key: &str, items: &IndexSet<String>) {
    if items.is_empty() {
        out.push_str(&format!("{}: []\n", key));
        return;
    }
    out.push_str(&format!("{}:\n", key));
    for item in items {
        out.push_str(&format!("  - {}\n", quote(item)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"---
title: "Why snapshot tests rot"
date: 2023-03-14
categories:
  - "Testing"
  - "Frontend"
tags:
  - "unit-testing"
  - "components"
image: "[[Pasted image 20230314.png]]"
imageOG: true
hideCoverImage: false
hideTOC: false
targetKeyword: ""
draft: false
---

Snapshot tests are cheap to write.
"#;

    #[test]
    fn test_parse_yaml_frontmatter() {
        let (fm, body) = FrontMatter::parse("sample.md", SAMPLE).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Why snapshot tests rot"));
        assert_eq!(fm.date, NaiveDate::from_ymd_opt(2023, 3, 14));
        assert_eq!(
            fm.categories,
            Some(IndexSet::from(["Testing".to_string(), "Frontend".to_string()]))
        );
        assert_eq!(fm.image.as_ref().unwrap().target(), "Pasted image 20230314.png");
        assert_eq!(fm.image_og, Some(true));
        assert_eq!(fm.hide_cover_image, Some(false));
        assert_eq!(fm.hide_toc, Some(false));
        assert_eq!(fm.target_keyword.as_deref(), Some(""));
        assert_eq!(fm.draft, Some(false));
        assert!(fm.extra.is_empty());
        assert_eq!(body, "Snapshot tests are cheap to write.");
    }

    #[test]
    fn test_round_trip() {
        let (fm, _) = FrontMatter::parse("sample.md", SAMPLE).unwrap();
        let text = format!("---\n{}---\n", fm.to_yaml());
        let (again, body) = FrontMatter::parse("again.md", &text).unwrap();
        assert_eq!(fm, again);
        assert_eq!(body, "");
    }

    #[test]
    fn test_round_trip_keeps_extra_fields() {
        let content = "---\ntitle: x\nseries:\n  name: testing\n  part: 2\naliases: [a, b]\n---\n";
        let (fm, _) = FrontMatter::parse("x.md", content).unwrap();
        assert_eq!(fm.extra.len(), 2);
        let text = format!("---\n{}---\n", fm.to_yaml());
        let (again, _) = FrontMatter::parse("x.md", &text).unwrap();
        assert_eq!(fm, again);
    }

    #[test]
    fn test_to_yaml_shape() {
        let fm = FrontMatter {
            title: Some("Hello".to_string()),
            tags: Some(IndexSet::from(["a".to_string()])),
            draft: Some(false),
            ..Default::default()
        };
        assert_eq!(fm.to_yaml(), "title: \"Hello\"\ntags:\n  - \"a\"\ndraft: false\n");
    }

    #[test]
    fn test_absent_fields_stay_none() {
        let (fm, body) = FrontMatter::parse("a.md", "---\ntitle: Hello\n---\nWorld\n").unwrap();
        assert_eq!(fm.title.as_deref(), Some("Hello"));
        assert_eq!(fm.draft, None);
        assert_eq!(fm.tags, None);
        assert_eq!(fm.hide_toc, None);
        assert_eq!(body, "World");
    }

    #[test]
    fn test_null_value_counts_as_absent() {
        let (fm, _) = FrontMatter::parse("a.md", "---\ntags:\ndraft: ~\n---\n").unwrap();
        assert_eq!(fm.tags, None);
        assert_eq!(fm.draft, None);
        assert!(fm.is_empty());
    }

    #[test]
    fn test_non_boolean_flag_is_an_error() {
        let content = "---\ntitle: x\ndraft: false\nhideTOC: maybe\n---\nbody\n";
        let err = FrontMatter::parse("posts/x.md", content).unwrap_err();
        assert_eq!(err.file, "posts/x.md");
        assert_eq!(err.field.as_deref(), Some("hideTOC"));
        assert_eq!(err.line, 4);
        assert!(matches!(
            err.kind,
            ParseErrorKind::InvalidType { expected, .. } if expected.contains("boolean")
        ));
    }

    #[test]
    fn test_quoted_boolean_is_an_error() {
        let err = FrontMatter::parse("x.md", "---\ndraft: \"false\"\n---\n").unwrap_err();
        assert_eq!(err.field.as_deref(), Some("draft"));
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_sets_are_order_insensitive() {
        let a = "---\ntags:\n  - \"a\"\n  - \"b\"\ncategories: [x, y]\n---\n";
        let b = "---\ntags:\n  - \"b\"\n  - \"a\"\ncategories: [y, x]\n---\n";
        let (fa, _) = FrontMatter::parse("a.md", a).unwrap();
        let (fb, _) = FrontMatter::parse("b.md", b).unwrap();
        assert_eq!(fa.tags, fb.tags);
        assert_eq!(fa.categories, fb.categories);
        assert_eq!(fa, fb);
    }

    #[test]
    fn test_single_string_tags() {
        let (fm, _) = FrontMatter::parse("a.md", "---\ntags: Notes\ncategories: Blog\n---\n").unwrap();
        assert_eq!(fm.tags, Some(IndexSet::from(["Notes".to_string()])));
        assert_eq!(fm.categories, Some(IndexSet::from(["Blog".to_string()])));
    }

    #[test]
    fn test_list_with_mapping_item_is_an_error() {
        let err = FrontMatter::parse("a.md", "---\ntitle: t\ntags:\n  - a\n  - {b: c}\n---\n")
            .unwrap_err();
        assert_eq!(err.field.as_deref(), Some("tags"));
        assert_eq!(err.line, 3);
    }

    #[test]
    fn test_unquoted_wikilink_image() {
        let (fm, _) = FrontMatter::parse("a.md", "---\nimage: [[cover art.png]]\n---\n").unwrap();
        let image = fm.image.unwrap();
        assert!(image.is_wikilink());
        assert_eq!(image.target(), "cover art.png");
    }

    #[test]
    fn test_invalid_date() {
        let err = FrontMatter::parse("a.md", "---\n\ndate: someday\n---\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidDate("someday".to_string()));
        assert_eq!(err.line, 3);
    }

    #[test]
    fn test_missing_opening_delimiter() {
        let err = FrontMatter::parse("a.md", "title: x\n---\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingFrontMatter);
        assert_eq!(err.line, 1);
    }

    #[test]
    fn test_missing_closing_delimiter() {
        let err = FrontMatter::parse("a.md", "---\ntitle: x\nbody without end\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnclosedFrontMatter);
    }

    #[test]
    fn test_yaml_syntax_error_line() {
        let err = FrontMatter::parse("a.md", "---\ntitle: x\ntags: a: b\n---\n").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::Syntax(_)));
        assert_eq!(err.line, 3);
        assert_eq!(err.field, None);
    }

    #[test]
    fn test_duplicate_key_points_at_repeat() {
        let content = "---\ntitle: x\ndraft: false\ntitle: y\n---\n";
        let err = FrontMatter::parse("a.md", content).unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::Syntax(_)));
        assert_eq!(err.field.as_deref(), Some("title"));
        assert_eq!(err.line, 4);
    }

    #[test]
    fn test_not_a_mapping() {
        let err = FrontMatter::parse("a.md", "---\n- a\n- b\n---\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::NotAMapping);
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_crlf_and_bom() {
        let content = "\u{feff}---\r\ntitle: \"Hello\"\r\ndraft: false\r\n---\r\nWorld\r\n";
        let (fm, body) = FrontMatter::parse("a.md", content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Hello"));
        assert_eq!(fm.draft, Some(false));
        assert_eq!(body, "World");
    }

    #[test]
    fn test_empty_block() {
        let (fm, body) = FrontMatter::parse("a.md", "---\n---\nJust text").unwrap();
        assert!(fm.is_empty());
        assert_eq!(body, "Just text");
    }

    #[test]
    fn test_whitespace_only_lines_before_body() {
        let (_, body) = FrontMatter::parse("a.md", "---\ntitle: x\n---\n  \n\nbody").unwrap();
        assert_eq!(body, "body");

        let (_, body) = FrontMatter::parse("a.md", "---\ntitle: x\n---\n\t\r\n    indented\n").unwrap();
        assert_eq!(body, "    indented");
    }

    #[test]
    fn test_body_keeps_horizontal_rules() {
        let content = "---\ntitle: x\n---\n\nIntro\n\n---\n\nOutro\n";
        let (_, body) = FrontMatter::parse("a.md", content).unwrap();
        assert_eq!(body, "Intro\n\n---\n\nOutro");
    }
}
