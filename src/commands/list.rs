//! List site content

use anyhow::Result;

use crate::content::ContentLoader;
use crate::generator::materialize;
use crate::Site;

/// List site content by type
pub fn run(site: &Site, content_type: &str, json: bool) -> Result<()> {
    let loader = ContentLoader::new(site);

    match content_type {
        "example" | "examples" => {
            let examples = loader.load_index()?.examples()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&examples)?);
                return Ok(());
            }
            println!("Examples ({}):", examples.len());
            for example in examples {
                println!(
                    "  {:>2}. {} - {} [{}]",
                    example.index, example.record.path, example.record.title, example.record.source
                );
            }
        }
        "blog" | "posts" => {
            let blog = loader.load_blog()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&blog)?);
                return Ok(());
            }
            println!("Blog entries ({}):", blog.len());
            for entry in blog {
                println!("  {} - {} by {}", entry.display_date, entry.title, entry.author);
            }
        }
        "route" | "routes" => {
            let examples = loader.load_index()?.examples()?;
            let routes = materialize(&examples)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&routes)?);
                return Ok(());
            }
            println!("Routes ({}):", routes.len());
            for route in routes {
                println!("  {} -> {} [{}]", route.path, route.template, route.source);
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: examples, blog, routes",
                content_type
            );
        }
    }

    Ok(())
}
