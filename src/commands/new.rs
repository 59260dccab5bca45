//! Create the next example

use anyhow::{bail, Result};
use std::fs;
use std::path::PathBuf;

use super::init::placeholder_svg;
use crate::content::{ContentLoader, FrontMatter};
use crate::Site;

/// Route prefix used when no example exists yet
const DEFAULT_PREFIX: &str = "/tutorial/";

/// Create the next example file, numbered after the highest existing index
pub fn create_example(site: &Site, title: &str) -> Result<PathBuf> {
    let examples = ContentLoader::new(site).load_index()?.examples()?;

    let next = examples.iter().map(|e| e.index).max().map_or(1, |n| n + 1);
    if next > 99 {
        bail!("Example indices are two digits; {} examples already exist", examples.len());
    }

    // Reuse the route prefix of the last example, minus its two-digit suffix
    let prefix = examples
        .last()
        .map(|e| e.record.path[..e.record.path.len() - 2].to_string())
        .unwrap_or_else(|| DEFAULT_PREFIX.to_string());

    let slug = match slug::slugify(title) {
        slug if slug.is_empty() => "example".to_string(),
        slug => slug,
    };
    let stem = format!("{:02}-{}", next, slug);
    let examples_dir = site.data_dir.join("examples");
    fs::create_dir_all(&examples_dir)?;

    let file_path = examples_dir.join(format!("{}.md", stem));
    if file_path.exists() {
        bail!("File already exists: {:?}", file_path);
    }

    let front_matter = FrontMatter {
        title: Some(title.to_string()),
        subtitle: Some(String::new()),
        path: Some(format!("{}{:02}", prefix, next)),
        image: Some(format!("./{}.svg", stem)),
        ..FrontMatter::default()
    };
    let content = format!("---\n{}---\n", serde_yaml::to_string(&front_matter)?);

    fs::write(examples_dir.join(format!("{}.svg", stem)), placeholder_svg(title))?;
    fs::write(&file_path, content)?;

    tracing::info!("Created example {:02}: {:?}", next, file_path);
    Ok(file_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::init::init_site;
    use tempfile::TempDir;

    #[test]
    fn test_new_example_takes_next_index() {
        let dir = TempDir::new().unwrap();
        init_site(dir.path()).unwrap();
        let site = Site::new(dir.path()).unwrap();

        let path = create_example(&site, "Docker builds").unwrap();
        assert!(path.ends_with("examples/02-docker-builds.md"));

        let examples = ContentLoader::new(&site)
            .load_index()
            .unwrap()
            .examples()
            .unwrap();
        assert_eq!(examples.len(), 2);
        assert_eq!(examples[1].index, 2);
        assert_eq!(examples[1].record.path, "/tutorial/02");
        assert_eq!(examples[1].record.title, "Docker builds");
    }

    #[test]
    fn test_first_example_in_empty_site() {
        let dir = TempDir::new().unwrap();
        let site = Site::new(dir.path()).unwrap();
        let path = create_example(&site, "Intro").unwrap();
        assert!(path.ends_with("examples/01-intro.md"));
    }

    #[test]
    fn test_awkward_titles_round_trip() {
        let dir = TempDir::new().unwrap();
        init_site(dir.path()).unwrap();
        let site = Site::new(dir.path()).unwrap();

        let title = "Colours: \"red\" # \u{1b}[31m";
        create_example(&site, title).unwrap();

        let path = create_example(&site, "?!").unwrap();
        assert!(path.ends_with("examples/03-example.md"));

        let examples = ContentLoader::new(&site)
            .load_index()
            .unwrap()
            .examples()
            .unwrap();
        assert_eq!(examples[1].record.title, title);
        assert_eq!(examples[2].record.title, "?!");
        assert_eq!(examples[2].record.path, "/tutorial/03");
    }
}
