//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::sitemap::{ChangeFreq, SitemapEntry};

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub language: String,
    pub default_author: String,

    // URL
    pub url: String,

    // Directory
    pub posts_dir: String,
    pub blog_dir: String,
    pub template: String,
    pub i18n_dir: String,
    pub sitemap_path: String,

    // Images
    pub default_image: String,

    // Blog listing
    pub per_page: usize,
    pub related_posts: usize,
    #[serde(default)]
    pub category_colors: IndexMap<String, String>,

    // Rendering
    #[serde(default)]
    pub highlight: HighlightConfig,

    #[serde(default)]
    pub sitemap: SitemapConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Brandible Marketing Group".to_string(),
            description: String::new(),
            language: "en".to_string(),
            default_author: "Brandible Team".to_string(),

            url: "https://www.brandiblemg.com".to_string(),

            posts_dir: "blogs/posts".to_string(),
            blog_dir: "blogs".to_string(),
            template: "blogs/post.html".to_string(),
            i18n_dir: "languages".to_string(),
            sitemap_path: "sitemap.xml".to_string(),

            default_image: "/assets/Brandible.png".to_string(),

            per_page: 9,
            related_posts: 2,
            category_colors: default_category_colors(),

            highlight: HighlightConfig::default(),
            sitemap: SitemapConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {:?}", path))?;
        Ok(config)
    }

    /// Site URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    /// Blog directory without surrounding slashes
    pub fn blog_segment(&self) -> &str {
        self.blog_dir.trim_matches('/')
    }

    /// Colour classes for a category badge
    pub fn category_color(&self, category: &str) -> &str {
        self.category_colors
            .get(category)
            .map(String::as_str)
            .unwrap_or("bg-gray-100 text-gray-700")
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "InspiredGitHub".to_string(),
            line_number: false,
        }
    }
}

/// Sitemap configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SitemapConfig {
    /// lastmod used for posts without a date prefix
    pub fallback_lastmod: NaiveDate,
    /// Fixed top-level pages, paths relative to `url`
    #[serde(default)]
    pub pages: Vec<SitemapEntry>,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        let lastmod = default_lastmod();
        let page = |loc: &str, priority: f32, changefreq: ChangeFreq| SitemapEntry {
            loc: loc.to_string(),
            lastmod,
            changefreq,
            priority,
        };

        Self {
            fallback_lastmod: lastmod,
            pages: vec![
                page("/", 1.0, ChangeFreq::Weekly),
                page("/about/", 0.8, ChangeFreq::Monthly),
                page("/careers/", 0.7, ChangeFreq::Monthly),
                page("/services/", 0.9, ChangeFreq::Weekly),
                page("/services/web-design/", 0.8, ChangeFreq::Monthly),
                page("/services/digital-marketing/", 0.8, ChangeFreq::Monthly),
                page("/services/branding/", 0.8, ChangeFreq::Monthly),
                page("/services/media-management/", 0.8, ChangeFreq::Monthly),
                page("/portfolio/", 0.8, ChangeFreq::Weekly),
                page("/contact/", 0.9, ChangeFreq::Monthly),
                page("/faqs/", 0.7, ChangeFreq::Monthly),
                page("/blogs/", 0.8, ChangeFreq::Weekly),
                page("/privacy", 0.3, ChangeFreq::Yearly),
                page("/terms", 0.3, ChangeFreq::Yearly),
            ],
        }
    }
}

fn default_lastmod() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, 4).unwrap_or_default()
}

fn default_category_colors() -> IndexMap<String, String> {
    [
        ("Marketing", "bg-blue-100 text-blue-700"),
        ("Web Design", "bg-purple-100 text-purple-700"),
        ("SEO", "bg-yellow-100 text-yellow-700"),
        ("Social Media", "bg-green-100 text-green-700"),
        ("Business Tips", "bg-red-100 text-red-700"),
        ("Case Studies", "bg-indigo-100 text-indigo-700"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.title, "Brandible Marketing Group");
        assert_eq!(config.posts_dir, "blogs/posts");
        assert_eq!(config.sitemap.pages.len(), 14);
        assert_eq!(config.sitemap.fallback_lastmod.to_string(), "2025-12-04");
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: Example Co
url: https://example.com/
per_page: 3
category_colors:
  News: bg-pink-100 text-pink-700
sitemap:
  fallback_lastmod: 2024-02-01
  pages:
    - loc: /
      lastmod: 2024-02-01
      changefreq: daily
      priority: 1.0
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "Example Co");
        assert_eq!(config.base_url(), "https://example.com");
        assert_eq!(config.per_page, 3);
        assert_eq!(config.blog_dir, "blogs");
        assert_eq!(config.category_color("News"), "bg-pink-100 text-pink-700");
        assert_eq!(config.category_color("Other"), "bg-gray-100 text-gray-700");
        assert_eq!(config.sitemap.pages.len(), 1);
        assert_eq!(config.sitemap.pages[0].changefreq, ChangeFreq::Daily);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let config: SiteConfig =
            serde_yaml::from_str("title: Example Co
theme: landscape
deploy:
  type: git
")
                .unwrap();
        assert_eq!(config.title, "Example Co");
        assert_eq!(config.per_page, 9);
    }
}
