//! Generate static files

use anyhow::Result;
use notify::Watcher;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use crate::content::ContentLoader;
use crate::generator::{Generator, Route};
use crate::{Site, CONFIG_FILE};

/// Generate the static site
pub fn run(site: &Site) -> Result<()> {
    build(site).map(|_| ())
}

/// Generate the static site, returning the routes that were written
pub fn build(site: &Site) -> Result<Vec<Route>> {
    let start = Instant::now();

    let content = ContentLoader::new(site).load()?;
    tracing::info!(
        "Loaded {} content files and {} blog entries",
        content.index.records().len(),
        content.blog.len()
    );

    let generator = Generator::new(site)?;
    let routes = generator.generate(&content)?;

    let duration = start.elapsed();
    tracing::info!(
        "Generated {} pages in {:.2}s",
        routes.len(),
        duration.as_secs_f64()
    );

    Ok(routes)
}

/// Paths whose changes trigger a rebuild
pub fn watched_paths(site: &Site) -> Vec<PathBuf> {
    [
        site.data_dir.clone(),
        site.static_dir.clone(),
        site.base_dir.join(CONFIG_FILE),
    ]
    .into_iter()
    .filter(|p| p.exists())
    .collect()
}

/// Quiet period before a burst of file events triggers one rebuild
const DEBOUNCE: Duration = Duration::from_millis(500);

/// Watch for file changes and regenerate
pub async fn watch(site: &Site) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();

    let mut watcher = notify::recommended_watcher(move |res| {
        if let Ok(event) = res {
            let _ = tx.send(event);
        }
    })?;

    for path in watched_paths(site) {
        watcher.watch(&path, notify::RecursiveMode::Recursive)?;
        tracing::debug!("Watching: {:?}", path);
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    while rx.recv().await.is_some() {
        tokio::time::sleep(DEBOUNCE).await;
        while rx.try_recv().is_ok() {}

        tracing::info!("File changed, regenerating...");
        // Config may have changed too
        let base_dir = site.base_dir.clone();
        let result =
            tokio::task::spawn_blocking(move || Site::new(&base_dir).and_then(|site| run(&site)))
                .await?;
        if let Err(e) = result {
            tracing::error!("Generation failed: {:#}", e);
        }
    }

    Ok(())
}
