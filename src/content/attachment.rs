//! Attachment references from the `image` front-matter field

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::SiteConfig;
use crate::helpers::{encode_path, join_url};

lazy_static! {
    /// `[[path]]` or `[[path|alias]]`
    static ref WIKILINK: Regex = Regex::new(r"^\[\[([^\]|]+)(?:\|[^\]]*)?\]\]$").unwrap();
}

/// The raw value of an `image` field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttachmentRef {
    raw: String,
}

/// Where an attachment lives and how a page links to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    /// Location on disk, relative to the base directory; `None` for external URLs
    pub path: Option<PathBuf>,
    pub url: String,
}

impl AttachmentRef {
    pub fn parse(raw: &str) -> Self {
        Self {
            raw: raw.trim().to_string(),
        }
    }

    /// The value as written in the front-matter
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Whether the value uses the `[[path]]` convention
    pub fn is_wikilink(&self) -> bool {
        WIKILINK.is_match(&self.raw)
    }

    /// The referenced path, without brackets or alias
    pub fn target(&self) -> &str {
        WIKILINK
            .captures(&self.raw)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim())
            .unwrap_or(self.raw.as_str())
    }

    /// Resolve against the configured attachments directory
    pub fn resolve(&self, config: &SiteConfig) -> Attachment {
        let target = self.target();
        if is_external(target) {
            return Attachment {
                path: None,
                url: target.to_string(),
            };
        }

        let relative = target.trim_start_matches("./");
        Attachment {
            path: Some(PathBuf::from(&config.attachments_dir).join(relative)),
            url: join_url(&config.attachments_url, &encode_path(relative)),
        }
    }
}

fn is_external(target: &str) -> bool {
    target.starts_with("http://") || target.starts_with("https://") || target.starts_with('/')
}
