//! Build the post manifest

use anyhow::Result;

use crate::manifest::Manifest;
use crate::Site;

/// Scan the posts directory and write `index.json`
pub fn run(site: &Site) -> Result<Manifest> {
    let manifest = Manifest::scan(&site.posts_dir)?;

    for file in manifest.files() {
        tracing::info!("  - {}", file);
    }
    manifest.write(&site.manifest_path)?;

    tracing::info!(
        "Generated {:?} with {} posts",
        site.manifest_path,
        manifest.len()
    );
    Ok(manifest)
}
