//! Content module - handles articles, front-matter, and content helpers

mod article;
mod attachment;
mod frontmatter;
pub mod loader;
pub mod markdown;
mod taxonomy;

pub use article::Article;
pub use attachment::{Attachment, AttachmentRef};
pub use frontmatter::{FrontMatter, DELIMITER};
pub use loader::{ContentLoader, LoadReport};
pub use markdown::{Heading, MarkdownRenderer};
pub use taxonomy::{Taxonomy, Term};
