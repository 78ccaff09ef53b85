//! Generate sitemap.xml

use anyhow::{Context, Result};
use std::fs;

use crate::manifest::Manifest;
use crate::sitemap::Sitemap;
use crate::Site;

/// Write the sitemap from the configured pages and the current manifest
pub fn run(site: &Site) -> Result<Sitemap> {
    let manifest = Manifest::load(&site.manifest_path);
    let sitemap = Sitemap::build(&site.config, &manifest);

    fs::write(&site.sitemap_path, sitemap.to_xml())
        .with_context(|| format!("Failed to write sitemap {:?}", site.sitemap_path))?;

    tracing::info!(
        "Generated {:?} with {} URLs ({} posts)",
        site.sitemap_path,
        sitemap.len(),
        manifest.len()
    );
    Ok(sitemap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sitemap_without_manifest() {
        let dir = TempDir::new().unwrap();
        let site = Site::new(dir.path()).unwrap();

        let sitemap = run(&site).unwrap();
        assert_eq!(sitemap.len(), site.config.sitemap.pages.len());
        assert!(site.sitemap_path.exists());
    }

    #[test]
    fn test_sitemap_includes_posts() {
        let dir = TempDir::new().unwrap();
        let site = Site::new(dir.path()).unwrap();
        fs::create_dir_all(&site.posts_dir).unwrap();
        Manifest::from_filenames(["2025-05-01-my-post.md"])
            .write(&site.manifest_path)
            .unwrap();

        run(&site).unwrap();
        let xml = fs::read_to_string(&site.sitemap_path).unwrap();
        assert!(xml.contains("<loc>https://www.brandiblemg.com/blogs/my-post/</loc>"));
        assert!(xml.contains("<lastmod>2025-05-01</lastmod>"));
    }
}
