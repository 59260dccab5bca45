//! Generator module - materializes routes and writes static HTML files

use anyhow::{anyhow, bail, Context as _, Result};
use indexmap::IndexMap;
use serde::Serialize;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tera::Context;
use walkdir::WalkDir;

use crate::content::{ExampleRecord, SiteContent};
use crate::error::SiteError;
use crate::helpers::ASSET_DIR;
use crate::templates::{
    self, ConfigData, NavItem, PrismData, ShellData, SponsorData, TemplateRenderer,
};
use crate::Site;

/// Route of the examples listing
pub const EXAMPLES_ROUTE: &str = "/examples/";
/// Route of the blog listing
pub const BLOG_ROUTE: &str = "/blog/";

/// An output page bound to a template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    /// Output path, unique across the site
    pub path: String,
    /// Template the page is rendered with
    pub template: &'static str,
    /// Parameters handed to the template's query
    pub params: IndexMap<String, String>,
    /// What produced the route, for diagnostics
    pub source: String,
}

impl Route {
    fn fixed(path: &str, template: &'static str) -> Self {
        Self {
            path: path.to_string(),
            template,
            params: IndexMap::new(),
            source: format!("<{}>", template),
        }
    }

    /// Location of the rendered page under `public_dir`
    pub fn output_path(&self, public_dir: &Path) -> Result<PathBuf> {
        let relative = Path::new(self.path.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            bail!("Route '{}' is not a plain site path", self.path);
        }
        Ok(public_dir.join(relative).join("index.html"))
    }
}

/// Build the route table: the fixed pages plus one page per example
pub fn materialize(examples: &[ExampleRecord]) -> Result<Vec<Route>, SiteError> {
    let mut routes: IndexMap<String, Route> = IndexMap::new();

    let fixed = [
        Route::fixed("/", templates::HOME),
        Route::fixed(EXAMPLES_ROUTE, templates::EXAMPLES),
        Route::fixed(BLOG_ROUTE, templates::BLOG),
    ];

    let example_routes = examples.iter().map(|example| {
        let mut params = IndexMap::new();
        params.insert("path".to_string(), example.record.path.clone());
        Route {
            path: example.record.path.clone(),
            template: templates::EXAMPLE,
            params,
            source: example.record.source.clone(),
        }
    });

    for route in fixed.into_iter().chain(example_routes) {
        let key = normalize_route(&route.path);
        if let Some(existing) = routes.get(&key) {
            return Err(SiteError::DuplicateRoute {
                route: route.path,
                source_file: route.source,
                existing: existing.source.clone(),
            });
        }
        routes.insert(key, route);
    }

    Ok(routes.into_values().collect())
}

/// `/tutorial/01` and `/tutorial/01/` land on the same file
fn normalize_route(path: &str) -> String {
    format!("/{}", path.trim_matches('/'))
}

/// Sibling of the public directory that a build is written into first
fn staging_dir(public_dir: &Path) -> PathBuf {
    let name = public_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "public".to_string());
    public_dir.with_file_name(format!(".{}.staging", name))
}

/// Static site generator using Tera templates
pub struct Generator {
    site: Site,
    renderer: TemplateRenderer,
}

impl Generator {
    /// Create a new generator
    pub fn new(site: &Site) -> Result<Self> {
        let renderer = TemplateRenderer::new(&site.config)?;

        Ok(Self {
            site: site.clone(),
            renderer,
        })
    }

    /// Generate the entire site
    pub fn generate(&self, content: &SiteContent) -> Result<Vec<Route>> {
        let examples = content.index.examples()?;
        let routes = materialize(&examples)?;
        tracing::info!(
            "Materialized {} routes ({} examples)",
            routes.len(),
            examples.len()
        );

        let shell = self.build_shell_data(content);

        // Render everything before touching the output directory
        let pages = routes
            .iter()
            .map(|route| {
                let html = self
                    .render_route(route, content, &examples, &shell)
                    .with_context(|| format!("Failed to render {}", route.path))?;
                Ok((route, html))
            })
            .collect::<Result<Vec<_>>>()?;

        // Write a fresh tree beside the public directory, then swap it in,
        // so pages of removed routes do not linger
        let public_dir = &self.site.public_dir;
        let staging = staging_dir(public_dir);
        if staging.exists() {
            fs::remove_dir_all(&staging)?;
        }

        if let Err(e) = self.write_output(&staging, content, &pages) {
            let _ = fs::remove_dir_all(&staging);
            return Err(e);
        }

        if public_dir.exists() {
            fs::remove_dir_all(public_dir)
                .with_context(|| format!("Failed to remove {:?}", public_dir))?;
        }
        fs::rename(&staging, public_dir)
            .with_context(|| format!("Failed to move {:?} to {:?}", staging, public_dir))?;

        Ok(routes)
    }

    /// Write rendered pages, static files and assets under `out_dir`
    fn write_output(
        &self,
        out_dir: &Path,
        content: &SiteContent,
        pages: &[(&Route, String)],
    ) -> Result<()> {
        fs::create_dir_all(out_dir)?;
        self.copy_static_files(out_dir)?;
        self.copy_content_assets(out_dir, content)?;

        for (route, html) in pages {
            let output_path = route.output_path(out_dir)?;
            if let Some(parent) = output_path.parent() {
                fs::create_dir_all(parent)
                    .map_err(|e| anyhow!("Failed to create dir {:?}: {}", parent, e))?;
            }
            fs::write(&output_path, html)
                .map_err(|e| anyhow!("Failed to write {:?}: {}", output_path, e))?;
            tracing::debug!("Generated page: {}", route.path);
        }

        Ok(())
    }

    /// Render one route with its template
    pub fn render_route(
        &self,
        route: &Route,
        content: &SiteContent,
        examples: &[ExampleRecord],
        shell: &ShellData,
    ) -> Result<String> {
        let mut context = Context::new();
        shell.insert_into(&mut context);
        context.insert("current_path", &route.path);
        context.insert("show_footer", &(route.template == templates::HOME));

        match route.template {
            templates::HOME => {
                context.insert("page", &content.index.index_record());
            }
            templates::EXAMPLES => {
                if let Some(missing) = examples.iter().find(|e| e.record.image.is_none()) {
                    return Err(SiteError::MissingImage {
                        path: missing.record.full_source.clone(),
                    }
                    .into());
                }
                context.insert("examples", examples);
            }
            templates::BLOG => {
                context.insert("posts", &content.blog);
            }
            templates::EXAMPLE => {
                let path = route
                    .params
                    .get("path")
                    .ok_or_else(|| anyhow!("Route {} has no path parameter", route.path))?;
                let example = examples
                    .iter()
                    .find(|e| &e.record.path == path)
                    .ok_or_else(|| anyhow!("No example record has path {}", path))?;
                context.insert("page", &example.record);
            }
            other => bail!("Unknown template {}", other),
        }

        self.renderer.render(route.template, &context)
    }

    /// Build the shell data shared by every page
    pub fn build_shell_data(&self, content: &SiteContent) -> ShellData {
        let config = &self.site.config;

        ShellData {
            config: ConfigData {
                title: config.title.clone(),
                description: config.description.clone(),
                author: config.author.clone(),
                url: config.url.clone(),
                root: config.root.clone(),
            },
            menu: config
                .menu
                .iter()
                .map(|(name, href)| NavItem {
                    name: name.clone(),
                    href: href.clone(),
                })
                .collect(),
            header_icon: content.header_icon.as_ref().map(|icon| icon.url.clone()),
            sponsors: content
                .sponsors
                .iter()
                .map(|(sponsor, image)| SponsorData {
                    name: sponsor.name.clone(),
                    href: sponsor.href.clone(),
                    image: image.url.clone(),
                })
                .collect(),
            license_url: config.license_url.clone(),
            prism: PrismData {
                enabled: !config.highlights_at_build(),
                cdn: config.prism.cdn.trim_end_matches('/').to_string(),
                theme: config.prism.theme.clone(),
                languages: config.prism.languages.clone(),
            },
        }
    }

    /// Copy images referenced by content into the public asset directory
    fn copy_content_assets(&self, out_dir: &Path, content: &SiteContent) -> Result<()> {
        let asset_dir = out_dir.join(ASSET_DIR);

        for asset in content.assets() {
            let dest = asset_dir.join(&asset.relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(&asset.file, &dest)
                .with_context(|| format!("Failed to copy {:?} to {:?}", asset.file, dest))?;
            tracing::debug!("Copied asset: {}", asset.relative);
        }

        Ok(())
    }

    /// Copy the static directory verbatim into the output
    fn copy_static_files(&self, out_dir: &Path) -> Result<()> {
        let static_dir = &self.site.static_dir;
        if !static_dir.exists() {
            return Ok(());
        }

        for entry in WalkDir::new(static_dir).follow_links(true) {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(static_dir)?;

            // Skip hidden files and directories (.DS_Store, .git, ...)
            let hidden = relative.components().any(|c| {
                c.as_os_str()
                    .to_str()
                    .map(|s| s.starts_with('.'))
                    .unwrap_or(false)
            });
            if hidden {
                continue;
            }

            let dest = out_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)?;
        }

        Ok(())
    }
}
