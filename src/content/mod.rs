//! Content module - parses and indexes the data directory

mod blog;
mod frontmatter;
pub mod loader;
mod markdown;
mod record;

pub use blog::BlogEntry;
pub use frontmatter::FrontMatter;
pub use loader::{ContentIndex, ContentLoader, SiteContent};
pub use markdown::{excerpt, MarkdownRenderer};
pub use record::{display_index, AssetRef, ContentRecord, ExampleRecord};
