//! Full build: manifest, post pages and sitemap

use anyhow::Result;
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebouncedEvent};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::Site;

/// Run every build step in order
pub fn run(site: &Site) -> Result<()> {
    let start = Instant::now();

    super::index::run(site)?;
    let report = super::posts::run(site)?;
    super::sitemap::run(site)?;

    if report.failed > 0 {
        tracing::warn!("{} post pages failed to generate", report.failed);
    }
    tracing::info!("Built in {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}

/// Inputs whose changes trigger a rebuild
fn watch_targets(site: &Site) -> Vec<(PathBuf, RecursiveMode)> {
    vec![
        (site.posts_dir.clone(), RecursiveMode::Recursive),
        (site.template_path.clone(), RecursiveMode::NonRecursive),
        (site.i18n_dir.clone(), RecursiveMode::Recursive),
        (site.config_path(), RecursiveMode::NonRecursive),
    ]
}

/// Whether a change is a real input change rather than build output or noise
fn is_relevant(site: &Site, path: &Path) -> bool {
    let path_str = path.to_string_lossy();
    path != site.manifest_path
        && path != site.sitemap_path
        && !path_str.contains(".git")
        && !path_str.contains(".DS_Store")
        && !path_str.ends_with('~')
}

/// Watch the site inputs and rebuild on change; blocks until the watcher stops
///
/// The site is reopened before each rebuild so configuration edits apply.
/// `on_rebuilt` runs after every successful rebuild.
pub fn watch_blocking<F>(base_dir: &Path, mut on_rebuilt: F) -> Result<()>
where
    F: FnMut(&Site),
{
    let (tx, rx) = std::sync::mpsc::channel();
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    let mut site = Site::new(base_dir)?;
    for (path, mode) in watch_targets(&site) {
        if path.exists() {
            debouncer.watcher().watch(&path, mode)?;
            tracing::debug!("Watching: {:?}", path);
        }
    }
    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let changed: Vec<&DebouncedEvent> = events
                    .iter()
                    .filter(|e| is_relevant(&site, &e.path))
                    .collect();
                if changed.is_empty() {
                    continue;
                }
                for event in &changed {
                    tracing::info!("File changed: {}", event.path.display());
                }

                site = match Site::new(base_dir) {
                    Ok(reopened) => reopened,
                    Err(e) => {
                        tracing::error!("Failed to reload configuration: {:#}", e);
                        continue;
                    }
                };
                match run(&site) {
                    Ok(()) => on_rebuilt(&site),
                    Err(e) => tracing::error!("Build failed: {:#}", e),
                }
            }
            Ok(Err(e)) => tracing::error!("Watch error: {:?}", e),
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Build once, then keep rebuilding on change
pub async fn watch(site: &Site) -> Result<()> {
    run(site)?;
    let base_dir = site.base_dir.clone();
    tokio::task::spawn_blocking(move || watch_blocking(&base_dir, |_| {})).await?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const TEMPLATE: &str = "<html><head><title>Blog</title></head><body></body></html>";

    #[test]
    fn test_build_all_outputs() {
        let dir = TempDir::new().unwrap();
        let site = Site::new(dir.path()).unwrap();
        fs::create_dir_all(&site.posts_dir).unwrap();
        fs::write(&site.template_path, TEMPLATE).unwrap();
        fs::write(
            site.posts_dir.join("2025-05-01-hello.md"),
            "---\ntitle: Hello\n---\nHi",
        )
        .unwrap();

        site.build().unwrap();

        assert!(site.manifest_path.exists());
        assert!(site.blog_dir.join("hello/index.html").exists());
        let xml = fs::read_to_string(&site.sitemap_path).unwrap();
        assert!(xml.contains("/blogs/hello/"));
    }

    #[test]
    fn test_build_without_template_fails() {
        let dir = TempDir::new().unwrap();
        let site = Site::new(dir.path()).unwrap();
        fs::create_dir_all(&site.posts_dir).unwrap();

        assert!(run(&site).is_err());
        // The manifest step already ran
        assert!(site.manifest_path.exists());
    }

    #[test]
    fn test_build_outputs_are_not_watch_triggers() {
        let dir = TempDir::new().unwrap();
        let site = Site::new(dir.path()).unwrap();

        assert!(!is_relevant(&site, &site.manifest_path));
        assert!(!is_relevant(&site, &site.sitemap_path));
        assert!(!is_relevant(&site, &site.posts_dir.join(".DS_Store")));
        assert!(is_relevant(&site, &site.posts_dir.join("2025-05-01-a.md")));
    }
}
