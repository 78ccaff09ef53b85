//! Generator module - writes one static HTML page per post
//!
//! Each page is the shared post template with its metadata slots filled in,
//! written to `<blog_dir>/<slug>/index.html`. The article body itself is
//! rendered by the reader at view time.

mod template;

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::content::slug::is_url_safe;
use crate::content::Post;
use crate::manifest::Manifest;
use crate::Site;

pub use template::{PostMeta, PostTemplate, Slot};

/// Counts from one generation run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GenerateReport {
    pub generated: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// What happened to a single post
enum Outcome {
    Generated(PathBuf),
    Skipped,
}

/// Static post page generator
pub struct Generator<'a> {
    site: &'a Site,
    template: PostTemplate,
}

impl<'a> Generator<'a> {
    /// Load and parse the post template; a missing template is fatal
    pub fn new(site: &'a Site) -> Result<Self> {
        let html = fs::read_to_string(&site.template_path)
            .with_context(|| format!("Failed to read post template {:?}", site.template_path))?;

        let template = PostTemplate::parse(&html);
        tracing::debug!("Post template slots: {:?}", template.slots());

        Ok(Self { site, template })
    }

    /// Generate a page for every post in the posts directory
    ///
    /// Failures on individual posts are logged and counted; only an
    /// unreadable posts directory or a slug collision stops the run.
    pub fn generate(&self) -> Result<GenerateReport> {
        let manifest = Manifest::scan(&self.site.posts_dir)?;
        let mut report = GenerateReport::default();
        if manifest.is_empty() {
            tracing::warn!("No posts found in {:?}", self.site.posts_dir);
            return Ok(report);
        }

        for filename in manifest.files() {
            match self.generate_post(filename) {
                Ok(Outcome::Generated(path)) => {
                    tracing::debug!("Generated post: {:?}", path);
                    report.generated += 1;
                }
                Ok(Outcome::Skipped) => report.skipped += 1,
                Err(e) => {
                    tracing::error!("Failed to generate {}: {:#}", filename, e);
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            "Generated {} post pages ({} skipped, {} failed)",
            report.generated,
            report.skipped,
            report.failed
        );
        Ok(report)
    }

    fn generate_post(&self, filename: &str) -> Result<Outcome> {
        let source = self.site.posts_dir.join(filename);
        let raw = fs::read_to_string(&source)
            .with_context(|| format!("Failed to read {:?}", source))?;
        let post = Post::parse(filename, &raw);

        let Some(html) = self.render(&post) else {
            tracing::warn!("Skipping {}: no title in front-matter", filename);
            return Ok(Outcome::Skipped);
        };
        if !is_url_safe(&post.slug) {
            tracing::warn!("Skipping {}: slug `{}` is not URL-safe", filename, post.slug);
            return Ok(Outcome::Skipped);
        }

        let out_dir = self.site.blog_dir.join(&post.slug);
        fs::create_dir_all(&out_dir)
            .with_context(|| format!("Failed to create {:?}", out_dir))?;
        let out_path = out_dir.join("index.html");
        fs::write(&out_path, html).with_context(|| format!("Failed to write {:?}", out_path))?;

        Ok(Outcome::Generated(out_path))
    }

    /// Render a post page, `None` for untitled posts
    pub fn render(&self, post: &Post) -> Option<String> {
        PostMeta::from_post(&self.site.config, post).map(|meta| self.template.render(&meta))
    }
}
