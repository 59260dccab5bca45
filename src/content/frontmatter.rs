//! Front-matter parsing

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::SiteError;

/// Front-matter data from a content file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub path: Option<String>,
    /// Image reference, relative to the markdown file
    pub image: Option<String>,

    /// Additional custom fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, remaining_content)
    pub fn parse<'a>(content: &'a str, source: &Path) -> Result<(Self, &'a str)> {
        let content = content.trim_start_matches('\u{feff}').trim_start();

        if !content.starts_with("---") {
            return Ok((FrontMatter::default(), content));
        }

        let rest = content[3..].trim_start_matches(['\n', '\r']);

        let Some(end_pos) = find_closing_fence(rest) else {
            // No closing ---, a horizontal rule rather than a front-matter block
            return Ok((FrontMatter::default(), content));
        };

        let yaml_content = &rest[..end_pos];
        let remaining = rest[end_pos..]
            .trim_start_matches(['\n', '\r'])
            .strip_prefix("---")
            .unwrap_or("")
            .trim_start_matches(['\n', '\r']);

        if yaml_content.trim().is_empty() {
            return Ok((FrontMatter::default(), remaining));
        }

        if !has_yaml_structure(yaml_content) {
            return Ok((FrontMatter::default(), content));
        }

        let fm = serde_yaml::from_str::<FrontMatter>(yaml_content).map_err(|e| {
            SiteError::InvalidFrontMatter {
                path: source.to_path_buf(),
                message: e.to_string(),
            }
        })?;

        Ok((fm, remaining))
    }
}

/// Byte offset of the line holding the closing `---`
fn find_closing_fence(rest: &str) -> Option<usize> {
    if rest.starts_with("---") {
        return Some(0);
    }
    rest.find("\n---").map(|pos| pos + 1)
}

/// Valid front-matter has at least one `key: value` line.
/// Prose and URLs between two horizontal rules do not count.
fn has_yaml_structure(yaml: &str) -> bool {
    yaml.lines().any(|line| {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return false;
        }
        let Some(colon_pos) = trimmed.find(':') else {
            return false;
        };
        let key = &trimmed[..colon_pos];
        let is_valid_key = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            && !matches!(key, "http" | "https" | "ftp");
        let after_colon = &trimmed[colon_pos + 1..];
        is_valid_key && (after_colon.is_empty() || after_colon.starts_with(' '))
    })
}
