//! Blog entries from the blog YAML list

use serde::{Deserialize, Serialize};

use super::AssetRef;

/// One entry of the blog list, as written in the YAML file
#[derive(Debug, Clone, Deserialize)]
pub struct RawBlogEntry {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub author_profile: String,
    pub date: String,
    #[serde(default)]
    pub excerpt: String,
    pub link: String,
    pub image: Option<String>,
}

/// A blog entry ready for rendering
#[derive(Debug, Clone, Serialize)]
pub struct BlogEntry {
    pub title: String,
    pub author: String,
    pub author_profile: String,
    /// Date as written in the list
    pub date: String,
    /// Date formatted for display
    pub display_date: String,
    pub excerpt: String,
    pub link: String,
    pub image: AssetRef,
}
