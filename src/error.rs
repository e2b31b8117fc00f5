//! Error types for article loading

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// What went wrong while parsing a single file
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The file does not start with a `---` line
    #[error("missing front-matter: file must start with a `---` line")]
    MissingFrontMatter,

    /// The opening `---` has no matching closing line
    #[error("front-matter is never closed: expected a closing `---` line")]
    UnclosedFrontMatter,

    /// The block between the delimiters is not valid YAML
    #[error("invalid YAML: {0}")]
    Syntax(String),

    /// The block is valid YAML but not a `key: value` mapping
    #[error("front-matter must be a list of `key: value` pairs")]
    NotAMapping,

    /// A value has the wrong shape for its field
    #[error("expected {expected}, found {found}")]
    InvalidType {
        expected: &'static str,
        found: String,
    },

    /// A `date` value that no supported format accepts
    #[error("invalid date `{0}`, expected YYYY-MM-DD")]
    InvalidDate(String),

    /// The file is not UTF-8
    #[error("file is not valid UTF-8")]
    InvalidUtf8,
}

/// A malformed front-matter block, located by file, line and field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// File identifier (path relative to the content dir, or a caller-supplied name)
    pub file: String,
    /// 1-based line in the file
    pub line: usize,
    /// Offending front-matter key, when the error is tied to one
    pub field: Option<String>,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(file: impl Into<String>, line: usize, kind: ParseErrorKind) -> Self {
        Self {
            file: file.into(),
            line,
            field: None,
            kind,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{}:{}: `{}`: {}", self.file, self.line, field, self.kind),
            None => write!(f, "{}:{}: {}", self.file, self.line, self.kind),
        }
    }
}

impl std::error::Error for ParseError {}

/// Per-file failure recorded by the content loader
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A concurrent load task panicked or was cancelled
    #[error("load task for {} failed: {message}", .path.display())]
    Task { path: PathBuf, message: String },
}

impl LoadError {
    /// The parse error, if this failure came from a malformed file
    pub fn as_parse(&self) -> Option<&ParseError> {
        match self {
            LoadError::Parse(e) => Some(e),
            LoadError::Io { .. } | LoadError::Task { .. } => None,
        }
    }

    /// The file this failure belongs to, relative to `content_dir` when inside it
    pub fn file(&self, content_dir: &Path) -> String {
        match self {
            LoadError::Parse(e) => e.file.clone(),
            LoadError::Io { path, .. } | LoadError::Task { path, .. } => path
                .strip_prefix(content_dir)
                .unwrap_or(path)
                .to_string_lossy()
                .replace('\\', "/"),
        }
    }
}
