//! Content records produced by the indexer

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::path::PathBuf;

use crate::error::SiteError;

lazy_static! {
    static ref INDEX_SUFFIX: Regex = Regex::new(r"(\d{2})$").unwrap();
}

/// An image referenced from a content file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetRef {
    /// Location on disk
    #[serde(skip)]
    pub file: PathBuf,
    /// Path relative to the data directory, `/`-separated
    pub relative: String,
    /// URL the asset is published under
    pub url: String,
}

/// A parsed markdown file
#[derive(Debug, Clone, Serialize)]
pub struct ContentRecord {
    /// Source file, relative to the data directory
    pub source: String,

    /// Full source file path
    #[serde(skip)]
    pub full_source: PathBuf,

    /// Route key from front-matter
    pub path: String,

    pub title: String,
    pub subtitle: Option<String>,
    pub image: Option<AssetRef>,

    /// Rendered HTML body
    pub html: String,

    /// Plain-text excerpt of the body
    pub excerpt: String,
}

/// A record from the examples flow, with its display index
#[derive(Debug, Clone, Serialize)]
pub struct ExampleRecord {
    pub index: u32,
    #[serde(flatten)]
    pub record: ContentRecord,
}

impl ExampleRecord {
    /// Parse the two-digit suffix of the record's path into its display index
    pub fn from_record(record: ContentRecord) -> Result<Self, SiteError> {
        let index = display_index(&record.path).ok_or_else(|| SiteError::InvalidIndex {
            route: record.path.clone(),
            path: record.full_source.clone(),
        })?;
        Ok(Self { index, record })
    }
}

/// Display index encoded in the last two characters of a route
pub fn display_index(route: &str) -> Option<u32> {
    INDEX_SUFFIX
        .captures(route)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
