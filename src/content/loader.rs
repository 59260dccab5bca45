//! Content loader - reads the data directory and indexes it

use anyhow::{bail, Context, Result};
use glob::Pattern;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use super::blog::RawBlogEntry;
use super::markdown::excerpt;
use super::{AssetRef, BlogEntry, ContentRecord, ExampleRecord, FrontMatter, MarkdownRenderer};
use crate::config::SponsorConfig;
use crate::error::SiteError;
use crate::helpers::{asset_url, format_date, parse_date};
use crate::Site;

/// Loads content from the data directory
pub struct ContentLoader<'a> {
    site: &'a Site,
    renderer: MarkdownRenderer,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(site: &'a Site) -> Self {
        let renderer = MarkdownRenderer::from_config(&site.config);
        Self { site, renderer }
    }

    /// Read the whole content store: markdown, blog list and shell images
    pub fn load(&self) -> Result<SiteContent> {
        let index = self.load_index()?;
        let blog = self.load_blog()?;

        let sponsors = self
            .site
            .config
            .sponsors
            .iter()
            .map(|sponsor| Ok((sponsor.clone(), self.resolve_data_asset(&sponsor.image)?)))
            .collect::<Result<Vec<_>>>()?;

        let header_icon = self
            .site
            .config
            .header_icon
            .as_deref()
            .map(|icon| self.resolve_data_asset(icon))
            .transpose()?;

        Ok(SiteContent {
            index,
            blog,
            sponsors,
            header_icon,
        })
    }

    /// Parse every markdown file and build the queryable index
    pub fn load_index(&self) -> Result<ContentIndex> {
        let records = self.load_records()?;
        let examples_pattern = Pattern::new(&self.site.config.examples_glob).with_context(|| {
            format!("Invalid examples_glob {:?}", self.site.config.examples_glob)
        })?;

        tracing::info!("Indexed {} content files", records.len());

        Ok(ContentIndex {
            records,
            examples_pattern,
            index_file: self.site.config.index_file.clone(),
        })
    }

    /// Load all markdown files under the data directory, ordered by source path
    pub fn load_records(&self) -> Result<Vec<ContentRecord>> {
        let data_dir = &self.site.data_dir;
        if !data_dir.exists() {
            tracing::warn!("Data directory {:?} does not exist", data_dir);
            return Ok(Vec::new());
        }

        let mut records = Vec::new();

        for entry in WalkDir::new(data_dir).follow_links(true).sort_by_file_name() {
            let entry = entry.with_context(|| format!("Failed to walk {:?}", data_dir))?;
            let path = entry.path();
            if path.is_file() && is_markdown_file(path) {
                records.push(self.load_record(path)?);
            }
        }

        Ok(records)
    }

    /// Load a single markdown file
    fn load_record(&self, path: &Path) -> Result<ContentRecord> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        let (fm, body) = FrontMatter::parse(&content, path)?;

        let title = fm.title.ok_or_else(|| SiteError::MissingField {
            field: "title",
            path: path.to_path_buf(),
        })?;
        let route = fm.path.ok_or_else(|| SiteError::MissingField {
            field: "path",
            path: path.to_path_buf(),
        })?;

        let image = fm
            .image
            .as_deref()
            .map(|reference| self.resolve_asset(path, reference))
            .transpose()?;

        let html = self
            .renderer
            .render(body)
            .with_context(|| format!("Failed to render {:?}", path))?;
        let excerpt = excerpt(&html, self.site.config.excerpt_length);

        tracing::debug!("Loaded {:?} as {}", path, route);

        Ok(ContentRecord {
            source: logical_path(&self.site.data_dir, path),
            full_source: path.to_path_buf(),
            path: route,
            title,
            subtitle: fm.subtitle,
            image,
            html,
            excerpt,
        })
    }

    /// Load the blog list in file order
    pub fn load_blog(&self) -> Result<Vec<BlogEntry>> {
        let blog_path = self.site.data_dir.join(&self.site.config.blog_file);
        if !blog_path.exists() {
            tracing::warn!("Blog list {:?} not found, blog page will be empty", blog_path);
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&blog_path)
            .with_context(|| format!("Failed to read {:?}", blog_path))?;
        let raw: Option<Vec<RawBlogEntry>> =
            serde_yaml::from_str(&content).map_err(|e| SiteError::Blog {
                path: blog_path.clone(),
                message: e.to_string(),
            })?;

        let entries = raw
            .unwrap_or_default()
            .into_iter()
            .map(|entry| self.blog_entry(&blog_path, entry))
            .collect::<Result<Vec<_>>>()?;

        tracing::info!("Loaded {} blog entries", entries.len());
        Ok(entries)
    }

    fn blog_entry(&self, blog_path: &Path, entry: RawBlogEntry) -> Result<BlogEntry> {
        let image_ref = entry.image.as_deref().ok_or_else(|| SiteError::Blog {
            path: blog_path.to_path_buf(),
            message: format!("entry '{}' has no image", entry.title),
        })?;
        let image = self.resolve_asset(blog_path, image_ref)?;

        let display_date = match parse_date(&entry.date) {
            Some(date) => format_date(&date, &self.site.config.blog_date_format)?,
            None => {
                tracing::warn!(
                    "Unrecognised date {:?} on blog entry '{}'",
                    entry.date,
                    entry.title
                );
                entry.date.clone()
            }
        };

        Ok(BlogEntry {
            title: entry.title,
            author: entry.author,
            author_profile: entry.author_profile,
            date: entry.date,
            display_date,
            excerpt: entry.excerpt,
            link: entry.link,
            image,
        })
    }

    /// Resolve an image reference relative to the data directory
    pub fn resolve_data_asset(&self, reference: &str) -> Result<AssetRef> {
        resolve_asset_in(&self.site.data_dir, &self.site.data_dir, reference, |relative| {
            asset_url(&self.site.config, relative)
        })
    }

    /// Resolve an image reference relative to the file that declares it
    pub fn resolve_asset(&self, declared_in: &Path, reference: &str) -> Result<AssetRef> {
        let base = declared_in.parent().unwrap_or(self.site.data_dir.as_path());
        resolve_asset_in(&self.site.data_dir, base, reference, |relative| {
            asset_url(&self.site.config, relative)
        })
    }
}

/// Everything read from the content store for one build
#[derive(Debug, Clone)]
pub struct SiteContent {
    pub index: ContentIndex,
    pub blog: Vec<BlogEntry>,
    pub sponsors: Vec<(SponsorConfig, AssetRef)>,
    pub header_icon: Option<AssetRef>,
}

impl SiteContent {
    /// Every image referenced by content or by the shell, without duplicates
    pub fn assets(&self) -> Vec<&AssetRef> {
        let mut seen = BTreeMap::new();
        let record_images = self.index.records().iter().filter_map(|r| r.image.as_ref());
        let blog_images = self.blog.iter().map(|b| &b.image);
        let shell_images = self
            .sponsors
            .iter()
            .map(|(_, image)| image)
            .chain(self.header_icon.iter());

        for asset in record_images.chain(blog_images).chain(shell_images) {
            seen.entry(asset.relative.as_str()).or_insert(asset);
        }
        seen.into_values().collect()
    }
}

/// Indexed content records with the two query shapes the pages use
#[derive(Debug, Clone)]
pub struct ContentIndex {
    records: Vec<ContentRecord>,
    examples_pattern: Pattern,
    index_file: String,
}

impl ContentIndex {
    /// All records, ordered by source path
    pub fn records(&self) -> &[ContentRecord] {
        &self.records
    }

    /// All records under the examples pattern, ascending by path
    pub fn examples(&self) -> Result<Vec<ExampleRecord>, SiteError> {
        let mut examples: Vec<ContentRecord> = self
            .records
            .iter()
            .filter(|r| self.examples_pattern.matches(&r.source))
            .cloned()
            .collect();

        if examples.is_empty() {
            tracing::warn!(
                "No content matches {:?}, examples will be empty",
                self.examples_pattern.as_str()
            );
        }

        examples.sort_by(|a, b| a.path.cmp(&b.path));
        examples.into_iter().map(ExampleRecord::from_record).collect()
    }

    /// The record whose source file is the index file
    pub fn index_record(&self) -> Option<&ContentRecord> {
        let record = self.records.iter().find(|r| r.source == self.index_file);
        if record.is_none() {
            tracing::warn!("No {} in the data directory, home page will be empty", self.index_file);
        }
        record
    }
}

/// Resolve `reference` against `base`, keeping it inside `data_dir`
fn resolve_asset_in(
    data_dir: &Path,
    base: &Path,
    reference: &str,
    url: impl Fn(&str) -> String,
) -> Result<AssetRef> {
    let data_dir = normalize(data_dir);
    let file = normalize(&base.join(reference));

    if !file.starts_with(&data_dir) {
        bail!(
            "Image {:?} resolves outside the data directory {:?}",
            reference,
            data_dir
        );
    }
    if !file.is_file() {
        bail!("Image {:?} not found at {:?}", reference, file);
    }

    let relative = logical_path(&data_dir, &file);
    Ok(AssetRef {
        url: url(&relative),
        relative,
        file,
    })
}

/// Path relative to `root`, joined with `/`
fn logical_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .collect::<Vec<_>>()
        .join("/")
}

/// Lexically resolve `.` and `..` components
fn normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                result.pop();
            }
            other => result.push(other.as_os_str()),
        }
    }
    result
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, relative: &str, content: &str) {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn example(n: &str) -> String {
        format!(
            "---\ntitle: Step {n}\nsubtitle: Sub {n}\npath: /tutorial/{n}\nimage: ./img.png\n---\n\nBody of step {n}.\n"
        )
    }

    fn test_site() -> (TempDir, Site) {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("data");
        write(&data, "examples/img.png", "png");
        // Written out of order on purpose
        write(&data, "examples/10-last.md", &example("10"));
        write(&data, "examples/02-second.md", &example("02"));
        write(&data, "examples/01-first.md", &example("01"));
        write(
            &data,
            "index.md",
            "---\ntitle: OCurrent\nsubtitle: x\npath: /\n---\n\nWelcome.\n",
        );
        let site = Site::new(dir.path()).unwrap();
        (dir, site)
    }

    #[test]
    fn test_examples_sorted_by_path() {
        let (_dir, site) = test_site();
        let index = ContentLoader::new(&site).load_index().unwrap();
        let examples = index.examples().unwrap();

        let paths: Vec<_> = examples.iter().map(|e| e.record.path.as_str()).collect();
        assert_eq!(paths, vec!["/tutorial/01", "/tutorial/02", "/tutorial/10"]);

        let indices: Vec<_> = examples.iter().map(|e| e.index).collect();
        let mut numeric = indices.clone();
        numeric.sort();
        assert_eq!(indices, numeric);
    }

    #[test]
    fn test_index_record() {
        let (_dir, site) = test_site();
        let index = ContentLoader::new(&site).load_index().unwrap();
        let home = index.index_record().unwrap();
        assert_eq!(home.title, "OCurrent");
        assert_eq!(home.subtitle.as_deref(), Some("x"));
        assert!(home.html.contains("Welcome."));
        assert_eq!(home.excerpt, "Welcome.");
    }

    #[test]
    fn test_image_resolved_relative_to_file() {
        let (_dir, site) = test_site();
        let index = ContentLoader::new(&site).load_index().unwrap();
        let examples = index.examples().unwrap();
        let image = examples[0].record.image.as_ref().unwrap();
        assert_eq!(image.relative, "examples/img.png");
        assert_eq!(image.url, "/assets/examples/img.png");
    }

    #[test]
    fn test_empty_examples_query() {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join("data"), "index.md", "---\ntitle: T\npath: /\n---\n");
        let site = Site::new(dir.path()).unwrap();
        let index = ContentLoader::new(&site).load_index().unwrap();
        assert!(index.examples().unwrap().is_empty());
    }

    #[test]
    fn test_missing_title_is_fatal() {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join("data"), "examples/01.md", "---\npath: /tutorial/01\n---\n");
        let site = Site::new(dir.path()).unwrap();
        let err = ContentLoader::new(&site).load_index().unwrap_err();
        assert!(err.to_string().contains("'title'"));
    }

    #[test]
    fn test_non_numeric_suffix_is_rejected() {
        let dir = TempDir::new().unwrap();
        write(
            &dir.path().join("data"),
            "examples/intro.md",
            "---\ntitle: Intro\npath: /tutorial/intro\n---\n",
        );
        let site = Site::new(dir.path()).unwrap();
        let index = ContentLoader::new(&site).load_index().unwrap();
        assert!(matches!(
            index.examples(),
            Err(SiteError::InvalidIndex { .. })
        ));
    }

    #[test]
    fn test_missing_image_is_fatal() {
        let dir = TempDir::new().unwrap();
        write(
            &dir.path().join("data"),
            "examples/01.md",
            "---\ntitle: A\npath: /tutorial/01\nimage: ./nope.png\n---\n",
        );
        let site = Site::new(dir.path()).unwrap();
        assert!(ContentLoader::new(&site).load_index().is_err());
    }

    #[test]
    fn test_blog_keeps_file_order() {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("data");
        write(&data, "images/a.jpg", "jpg");
        write(
            &data,
            "blog.yaml",
            r#"- title: Zebra
  author: Alice
  author_profile: https://example.com/alice
  date: 2020-01-22
  excerpt: Newest first in the file.
  link: https://example.com/zebra
  image: ./images/a.jpg
- title: Aardvark
  author: Bob
  author_profile: https://example.com/bob
  date: 2019-10-09
  excerpt: Older.
  link: https://example.com/aardvark
  image: ./images/a.jpg
"#,
        );
        let site = Site::new(dir.path()).unwrap();
        let blog = ContentLoader::new(&site).load_blog().unwrap();

        let titles: Vec<_> = blog.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Zebra", "Aardvark"]);
        assert_eq!(blog[0].display_date, "Jan 22nd, 2020");
        assert_eq!(blog[1].display_date, "Oct 9th, 2019");
        assert_eq!(blog[1].image.url, "/assets/images/a.jpg");
    }

    #[test]
    fn test_blog_entry_without_image_is_fatal() {
        let dir = TempDir::new().unwrap();
        write(
            &dir.path().join("data"),
            "blog.yaml",
            "- title: T\n  author: A\n  date: 2020-01-01\n  link: https://x\n",
        );
        let site = Site::new(dir.path()).unwrap();
        assert!(ContentLoader::new(&site).load_blog().is_err());
    }

    #[test]
    fn test_asset_outside_data_dir_rejected() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "secret.png", "png");
        let data = dir.path().join("data");
        let result = resolve_asset_in(&data, &data, "../secret.png", |r| r.to_string());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_collects_unique_assets() {
        let (dir, _) = test_site();
        let data = dir.path().join("data");
        write(&data, "images/ocamllabs.svg", "png");
        write(&data, "images/tarides.svg", "png");
        let site = Site::new(dir.path()).unwrap();

        let content = ContentLoader::new(&site).load().unwrap();
        assert_eq!(content.sponsors.len(), 2);
        assert!(content.blog.is_empty());

        let relative: Vec<_> = content.assets().iter().map(|a| a.relative.clone()).collect();
        assert_eq!(
            relative,
            vec![
                "examples/img.png",
                "images/ocamllabs.svg",
                "images/tarides.svg"
            ]
        );
    }

    #[test]
    fn test_logical_path() {
        let root = Path::new("/site/data");
        assert_eq!(
            logical_path(root, Path::new("/site/data/examples/01.md")),
            "examples/01.md"
        );
    }
}
