//! Markdown rendering with syntax highlighting

use anyhow::{anyhow, Result};
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::config::SiteConfig;
use crate::helpers::{decode_entities, html_escape, strip_html, truncate};

/// Class prefix for fenced code blocks, matching Prism's convention
const CLASS_PREFIX: &str = "language-";

/// How fenced code blocks are highlighted
pub enum Highlighter {
    /// Leave highlighting to Prism in the browser
    Prism,
    /// Highlight at build time
    Syntect {
        syntax_set: SyntaxSet,
        theme_set: ThemeSet,
        theme_name: String,
        line_numbers: bool,
    },
}

/// Markdown renderer
pub struct MarkdownRenderer {
    highlighter: Highlighter,
}

impl MarkdownRenderer {
    /// Create a renderer that defers highlighting to the browser
    pub fn new() -> Self {
        Self {
            highlighter: Highlighter::Prism,
        }
    }

    /// Create a renderer that highlights with syntect
    pub fn with_syntect(theme: &str, line_numbers: bool) -> Self {
        Self {
            highlighter: Highlighter::Syntect {
                syntax_set: SyntaxSet::load_defaults_newlines(),
                theme_set: ThemeSet::load_defaults(),
                theme_name: theme.to_string(),
                line_numbers,
            },
        }
    }

    /// Create a renderer from the site configuration
    pub fn from_config(config: &SiteConfig) -> Self {
        if config.highlights_at_build() {
            Self::with_syntect(&config.highlight.theme, config.highlight.line_number)
        } else {
            Self::new()
        }
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> Result<String> {
        // Front-matter is stripped before rendering, so no metadata block option
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_HEADING_ATTRIBUTES;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        let mut in_code_block = false;
        let mut code_block_lang: Option<String> = None;
        let mut code_block_content = String::new();

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    in_code_block = true;
                    code_block_lang = match kind {
                        CodeBlockKind::Fenced(info) => info
                            .split_whitespace()
                            .next()
                            .map(|lang| lang.to_string()),
                        CodeBlockKind::Indented => None,
                    };
                    code_block_content.clear();
                }
                Event::End(TagEnd::CodeBlock) => {
                    let highlighted =
                        self.highlight_code(&code_block_content, code_block_lang.as_deref())?;
                    events.push(Event::Html(CowStr::from(highlighted)));
                    in_code_block = false;
                    code_block_lang = None;
                }
                Event::Text(text) if in_code_block => {
                    code_block_content.push_str(&text);
                }
                _ => events.push(event),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        Ok(html_output)
    }

    /// Render a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> Result<String> {
        let lang = lang.unwrap_or("text");

        match &self.highlighter {
            Highlighter::Prism => Ok(format!(
                r#"<pre class="{prefix}{lang}"><code class="{prefix}{lang}">{}</code></pre>"#,
                html_escape(code),
                prefix = CLASS_PREFIX,
                lang = lang
            )),
            Highlighter::Syntect {
                syntax_set,
                theme_set,
                theme_name,
                line_numbers,
            } => {
                let syntax = syntax_set
                    .find_syntax_by_token(lang)
                    .or_else(|| syntax_set.find_syntax_by_extension(lang))
                    .unwrap_or_else(|| syntax_set.find_syntax_plain_text());

                let theme = theme_set
                    .themes
                    .get(theme_name)
                    .or_else(|| theme_set.themes.values().next())
                    .ok_or_else(|| anyhow!("No syntect themes available"))?;

                match highlighted_html_for_string(code, syntax_set, syntax, theme) {
                    Ok(highlighted) if *line_numbers => Ok(add_line_numbers(&highlighted, lang)),
                    Ok(highlighted) => Ok(format!(
                        r#"<div class="{}{}">{}</div>"#,
                        CLASS_PREFIX, lang, highlighted
                    )),
                    Err(e) => {
                        tracing::debug!("Highlighting {} failed, emitting plain code: {}", lang, e);
                        Ok(format!(
                            r#"<pre><code class="{}{}">{}</code></pre>"#,
                            CLASS_PREFIX,
                            lang,
                            html_escape(code)
                        ))
                    }
                }
            }
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Add a line-number gutter to highlighted code
fn add_line_numbers(code: &str, lang: &str) -> String {
    let lines: Vec<&str> = code.lines().collect();

    let gutter = (1..=lines.len())
        .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<figure class="highlight {}{}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}</td></tr></table></figure>"#,
        CLASS_PREFIX,
        lang,
        gutter,
        lines.join("\n")
    )
}

/// Plain-text excerpt of rendered HTML, cut at `length` characters
pub fn excerpt(html: &str, length: usize) -> String {
    let text = decode_entities(&strip_html(html));
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate(&collapsed, length, Some("…"))
}
