//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::CONFIG_FILE;

const CONFIG: &str = r#"# Site
title: OCurrent
description: ''
author: '@ocamllabs'

# URL
url: http://localhost:8000
root: /

# Directory
data_dir: data
public_dir: public
static_dir: static
examples_glob: examples/**/*.md
index_file: index.md
blog_file: blog.yaml

# Rendering
syntax_highlighter: prism
prism:
  languages:
    - ocaml
excerpt_length: 140
blog_date_format: MMM Do, YYYY

# Shell
menu:
  Home: /
  Tutorials: /tutorial/01
sponsors:
  - name: OCaml Labs
    href: http://ocamllabs.io/
    image: images/ocamllabs.svg
  - name: Tarides
    href: https://tarides.com/
    image: images/tarides.svg
license_url: https://github.com/ocurrent/ocurrent/blob/master/LICENSE
"#;

const INDEX: &str = r#"---
title: OCurrent
subtitle: Build pipelines in OCaml
path: /
---

OCurrent lets you write pipelines as ordinary OCaml programs.

```ocaml
let pipeline () =
  let src = Git.Local.head_commit repo in
  Docker.build ~pull:false (`Git src)
```
"#;

const FIRST_EXAMPLE: &str = r#"---
title: Hello, pipeline
subtitle: Your first OCurrent pipeline
path: /tutorial/01
image: ./01-hello-pipeline.svg
---

Every tutorial lives in `data/examples/` and ends its `path` with a
two-digit number. Run `ocurrent-site new "Title"` to add the next one.
"#;

const BLOG: &str = r#"- title: Introducing OCurrent
  author: The OCurrent authors
  author_profile: https://github.com/ocurrent
  date: 2019-10-09
  excerpt: OCurrent is an OCaml eDSL for creating processing pipelines.
  link: https://github.com/ocurrent/ocurrent
  image: ./images/blog-intro.svg
"#;

const STYLESHEET: &str = r#".wrapper { max-width: 960px; margin: 0 auto; padding: 0 1rem; }
.navbar-nav { display: flex; list-style: none; gap: 1rem; }
.badge-row { display: flex; gap: 2rem; }
.blog-panel { display: flex; gap: 1rem; margin-bottom: 2rem; }
"#;

/// A labelled placeholder image
pub fn placeholder_svg(label: &str) -> String {
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="160" height="48" viewBox="0 0 160 48"><rect width="160" height="48" fill="#eee"/><text x="80" y="30" font-family="sans-serif" font-size="14" text-anchor="middle">{}</text></svg>
"##,
        crate::helpers::html_escape(label)
    )
}

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join(CONFIG_FILE);
    if config_path.exists() {
        anyhow::bail!("A site already exists in {:?}", target_dir);
    }

    let data_dir = target_dir.join("data");
    fs::create_dir_all(data_dir.join("examples"))?;
    fs::create_dir_all(data_dir.join("images"))?;
    fs::create_dir_all(target_dir.join("static/css"))?;

    fs::write(&config_path, CONFIG)?;
    fs::write(data_dir.join("index.md"), INDEX)?;
    fs::write(data_dir.join("examples/01-hello-pipeline.md"), FIRST_EXAMPLE)?;
    fs::write(
        data_dir.join("examples/01-hello-pipeline.svg"),
        placeholder_svg("Hello, pipeline"),
    )?;
    fs::write(data_dir.join("blog.yaml"), BLOG)?;
    fs::write(
        data_dir.join("images/blog-intro.svg"),
        placeholder_svg("Introducing OCurrent"),
    )?;
    fs::write(
        data_dir.join("images/ocamllabs.svg"),
        placeholder_svg("OCaml Labs"),
    )?;
    fs::write(data_dir.join("images/tarides.svg"), placeholder_svg("Tarides"))?;
    fs::write(target_dir.join("static/css/site.css"), STYLESHEET)?;

    tracing::info!("Scaffolded site in {:?}", target_dir);
    Ok(())
}
