//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::helpers::format_date;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub data_dir: String,
    pub public_dir: String,
    pub static_dir: String,
    pub examples_glob: String,
    pub index_file: String,
    pub blog_file: String,

    // Rendering
    pub syntax_highlighter: String,
    #[serde(default)]
    pub highlight: HighlightConfig,
    #[serde(default)]
    pub prism: PrismConfig,
    pub excerpt_length: usize,
    pub blog_date_format: String,

    // Shell
    /// Navigation entries, in display order
    pub menu: IndexMap<String, String>,
    pub header_icon: Option<String>,
    pub sponsors: Vec<SponsorConfig>,
    pub license_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        let mut menu = IndexMap::new();
        menu.insert("Home".to_string(), "/".to_string());
        menu.insert("Tutorials".to_string(), "/tutorial/01".to_string());

        Self {
            title: "OCurrent".to_string(),
            description: String::new(),
            author: "@ocamllabs".to_string(),

            url: "http://localhost:8000".to_string(),
            root: "/".to_string(),

            data_dir: "data".to_string(),
            public_dir: "public".to_string(),
            static_dir: "static".to_string(),
            examples_glob: "examples/**/*.md".to_string(),
            index_file: "index.md".to_string(),
            blog_file: "blog.yaml".to_string(),

            syntax_highlighter: "prism".to_string(),
            highlight: HighlightConfig::default(),
            prism: PrismConfig::default(),
            excerpt_length: 140,
            blog_date_format: "MMM Do, YYYY".to_string(),

            menu,
            header_icon: None,
            sponsors: vec![
                SponsorConfig {
                    name: "OCaml Labs".to_string(),
                    href: "http://ocamllabs.io/".to_string(),
                    image: "images/ocamllabs.svg".to_string(),
                },
                SponsorConfig {
                    name: "Tarides".to_string(),
                    href: "https://tarides.com/".to_string(),
                    image: "images/tarides.svg".to_string(),
                },
            ],
            license_url: "https://github.com/ocurrent/ocurrent/blob/master/LICENSE".to_string(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config {:?}", path))?;
        config.validate().with_context(|| format!("Invalid config {:?}", path))?;
        Ok(config)
    }

    /// Reject settings that would only fail halfway through a build
    pub fn validate(&self) -> Result<()> {
        format_date(&NaiveDate::default(), &self.blog_date_format)
            .context("blog_date_format")?;
        Ok(())
    }

    /// Whether code blocks are highlighted at build time rather than in the browser
    pub fn highlights_at_build(&self) -> bool {
        self.syntax_highlighter.eq_ignore_ascii_case("syntect")
    }
}

/// A sponsor badge shown in the home page footer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SponsorConfig {
    pub name: String,
    pub href: String,
    /// Image path, relative to the data directory
    pub image: String,
}

/// Build-time (syntect) highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
            line_number: false,
        }
    }
}

/// Client-side (Prism) highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrismConfig {
    pub cdn: String,
    pub theme: String,
    #[serde(default)]
    pub languages: Vec<String>,
}

impl Default for PrismConfig {
    fn default() -> Self {
        Self {
            cdn: "https://cdnjs.cloudflare.com/ajax/libs/prism/1.29.0".to_string(),
            theme: "prism".to_string(),
            languages: vec!["ocaml".to_string()],
        }
    }
}
