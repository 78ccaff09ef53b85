//! brandible-blog: blog content pipeline for the Brandible marketing site
//!
//! Turns date-prefixed markdown posts into a JSON manifest, static per-post
//! pages and a sitemap, and renders the blog grid and single posts from the
//! same sources for the development server.

pub mod client;
pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod i18n;
pub mod manifest;
pub mod server;
pub mod sitemap;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// A site checkout and its resolved paths
#[derive(Debug, Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory (site root)
    pub base_dir: PathBuf,
    /// Markdown sources
    pub posts_dir: PathBuf,
    /// Output root for generated post pages
    pub blog_dir: PathBuf,
    /// Shared post page template
    pub template_path: PathBuf,
    /// `index.json` inside the posts directory
    pub manifest_path: PathBuf,
    pub sitemap_path: PathBuf,
    /// Language files
    pub i18n_dir: PathBuf,
}

impl Site {
    /// Open a site, reading `_config.yml` when present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let posts_dir = base_dir.join(&config.posts_dir);

        Self {
            blog_dir: base_dir.join(&config.blog_dir),
            template_path: base_dir.join(&config.template),
            manifest_path: posts_dir.join("index.json"),
            sitemap_path: base_dir.join(&config.sitemap_path),
            i18n_dir: base_dir.join(&config.i18n_dir),
            posts_dir,
            base_dir,
            config,
        }
    }

    /// Path of the configuration file
    pub fn config_path(&self) -> PathBuf {
        self.base_dir.join("_config.yml")
    }

    /// Rebuild the manifest, post pages and sitemap
    pub fn build(&self) -> Result<()> {
        commands::build::run(self)
    }
}
