//! Content faults that abort a build

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("Invalid front-matter in {path:?}: {message}")]
    InvalidFrontMatter { path: PathBuf, message: String },

    #[error("Missing required field '{field}' in {path:?}")]
    MissingField { field: &'static str, path: PathBuf },

    #[error("Example path '{route}' in {path:?} does not end in a two-digit index")]
    InvalidIndex { route: String, path: PathBuf },

    #[error("Example {path:?} has no image")]
    MissingImage { path: PathBuf },

    #[error("Route '{route}' from {source_file} conflicts with {existing}")]
    DuplicateRoute {
        route: String,
        source_file: String,
        existing: String,
    },

    #[error("Invalid blog list {path:?}: {message}")]
    Blog { path: PathBuf, message: String },
}
