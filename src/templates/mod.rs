//! Built-in site templates using the Tera template engine
//!
//! Every template is embedded in the binary; a site only supplies content.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::helpers::{full_url_for, html_escape, url_for};

/// Template for the home page
pub const HOME: &str = "index.html";
/// Template for the examples listing
pub const EXAMPLES: &str = "examples.html";
/// Template shared by every example page
pub const EXAMPLE: &str = "example.html";
/// Template for the blog listing
pub const BLOG: &str = "blog.html";

/// Template renderer with the embedded site templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new(config: &SiteConfig) -> Result<Self> {
        let mut tera = Tera::default();

        // Bodies are pre-rendered HTML; text fields are escaped in the templates
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("ocurrent/layout.html")),
            (HOME, include_str!("ocurrent/index.html")),
            (EXAMPLES, include_str!("ocurrent/examples.html")),
            (EXAMPLE, include_str!("ocurrent/example.html")),
            (BLOG, include_str!("ocurrent/blog.html")),
            // Partials
            (
                "partials/header.html",
                include_str!("ocurrent/partials/header.html"),
            ),
            (
                "partials/footer.html",
                include_str!("ocurrent/partials/footer.html"),
            ),
        ])?;

        // URLs stay readable: `/` is left alone, unlike Tera's built-in escape
        tera.register_filter("escape", escape_filter);
        tera.register_filter("url_for", url_filter(config.clone(), url_for));
        tera.register_filter("full_url_for", url_filter(config.clone(), full_url_for));

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: escape text or attribute values
fn escape_filter(value: &tera::Value, _args: &HashMap<String, tera::Value>) -> tera::Result<tera::Value> {
    let text = tera::try_get_value!("escape", "value", String, value);
    Ok(tera::Value::String(html_escape(&text)))
}

/// Tera filter wrapping one of the URL helpers
fn url_filter(
    config: SiteConfig,
    helper: fn(&SiteConfig, &str) -> String,
) -> impl Fn(&tera::Value, &HashMap<String, tera::Value>) -> tera::Result<tera::Value> + Send + Sync
{
    move |value, _args| {
        let path = tera::try_get_value!("url", "value", String, value);
        Ok(tera::Value::String(helper(&config, &path)))
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct ConfigData {
    pub title: String,
    pub description: String,
    pub author: String,
    pub url: String,
    pub root: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavItem {
    pub name: String,
    pub href: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SponsorData {
    pub name: String,
    pub href: String,
    /// Public URL of the badge image
    pub image: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrismData {
    pub enabled: bool,
    pub cdn: String,
    pub theme: String,
    pub languages: Vec<String>,
}

/// Everything the shell (layout, header, footer) needs
#[derive(Debug, Clone, Serialize)]
pub struct ShellData {
    pub config: ConfigData,
    pub menu: Vec<NavItem>,
    pub header_icon: Option<String>,
    pub sponsors: Vec<SponsorData>,
    pub license_url: String,
    pub prism: PrismData,
}

impl ShellData {
    /// Insert the shell variables into a context
    pub fn insert_into(&self, context: &mut Context) {
        context.insert("config", &self.config);
        context.insert("menu", &self.menu);
        context.insert("header_icon", &self.header_icon);
        context.insert("sponsors", &self.sponsors);
        context.insert("license_url", &self.license_url);
        context.insert("prism", &self.prism);
        context.insert("version", env!("CARGO_PKG_VERSION"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell() -> ShellData {
        ShellData {
            config: ConfigData {
                title: "OCurrent".to_string(),
                description: String::new(),
                author: "@ocamllabs".to_string(),
                url: "http://localhost".to_string(),
                root: "/".to_string(),
            },
            menu: vec![
                NavItem {
                    name: "Home".to_string(),
                    href: "/".to_string(),
                },
                NavItem {
                    name: "Tutorials".to_string(),
                    href: "/tutorial/01".to_string(),
                },
            ],
            header_icon: None,
            sponsors: vec![SponsorData {
                name: "Tarides".to_string(),
                href: "https://tarides.com/".to_string(),
                image: "/assets/images/tarides.png".to_string(),
            }],
            license_url: "https://example.com/LICENSE".to_string(),
            prism: PrismData {
                enabled: true,
                cdn: "https://cdn.example".to_string(),
                theme: "prism".to_string(),
                languages: vec!["ocaml".to_string()],
            },
        }
    }

    fn context() -> Context {
        let mut context = Context::new();
        shell().insert_into(&mut context);
        context.insert("current_path", "/");
        context
    }

    #[test]
    fn test_example_template() {
        let renderer = TemplateRenderer::new(&SiteConfig::default()).unwrap();
        let mut context = context();
        context.insert("show_footer", &false);
        context.insert(
            "page",
            &serde_json::json!({ "title": "A & B", "html": "<p>body</p>" }),
        );

        let html = renderer.render(EXAMPLE, &context).unwrap();
        assert!(html.contains("<h1>A &amp; B</h1>"));
        assert!(html.contains("<p>body</p>"));
        assert!(html.contains("Tutorials"));
        assert!(html.contains(r#"href="/tutorial/01""#));
        assert!(html.contains("prism-ocaml.min.js"));
        assert!(!html.contains("footer-div"));
    }

    #[test]
    fn test_footer_only_when_requested() {
        let renderer = TemplateRenderer::new(&SiteConfig::default()).unwrap();
        let mut context = context();
        context.insert("show_footer", &true);
        context.insert("page", &serde_json::Value::Null);

        let html = renderer.render(HOME, &context).unwrap();
        assert!(html.contains("footer-div"));
        assert!(html.contains("Apache-2.0 license"));
        assert!(html.contains("/assets/images/tarides.png"));
    }

    #[test]
    fn test_url_for_filter_uses_root() {
        let config = SiteConfig {
            root: "/site/".to_string(),
            ..SiteConfig::default()
        };
        let renderer = TemplateRenderer::new(&config).unwrap();
        let mut context = context();
        context.insert("show_footer", &false);
        context.insert("posts", &Vec::<serde_json::Value>::new());

        let html = renderer.render(BLOG, &context).unwrap();
        assert!(html.contains(r#"href="/site/tutorial/01""#));
        assert!(html.contains("<title>Blog | OCurrent</title>"));
        assert!(html.contains(r#"<link rel="canonical" href="http://localhost:8000/site/">"#));
    }

    #[test]
    fn test_blog_fields_are_escaped() {
        let renderer = TemplateRenderer::new(&SiteConfig::default()).unwrap();
        let mut context = context();
        context.insert("show_footer", &false);
        context.insert(
            "posts",
            &serde_json::json!([{
                "title": "Post",
                "author": "A",
                "author_profile": "https://a.example/?x=1&y=2",
                "display_date": "<b>soon</b>",
                "excerpt": "",
                "link": "https://x.example/?a=1\"onmouseover=\"x",
                "image": { "relative": "images/p.svg", "url": "/assets/images/p.svg" }
            }]),
        );

        let html = renderer.render(BLOG, &context).unwrap();
        assert!(html.contains("on &lt;b&gt;soon&lt;/b&gt;"));
        assert!(!html.contains("<b>soon</b>"));
        assert!(html.contains(r#"href="https://x.example/?a=1&quot;onmouseover=&quot;x""#));
        assert!(html.contains(r#"href="https://a.example/?x=1&amp;y=2""#));
        assert!(html.contains(r#"src="/assets/images/p.svg""#));
    }
}
