//! Sitemap generation.
//!
//! Merges the fixed top-level pages from the configuration with one entry per
//! post in the manifest:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://www.brandiblemg.com/blogs/my-post/</loc>
//!     <lastmod>2025-05-01</lastmod>
//!     <changefreq>monthly</changefreq>
//!     <priority>0.7</priority>
//!   </url>
//! </urlset>
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::SiteConfig;
use crate::content::slug::{date_prefix, slug_from_filename};
use crate::helpers::{escape_xml, full_url_for, post_path};
use crate::manifest::Manifest;

/// XML namespace for sitemap
const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Priority of generated post entries
const POST_PRIORITY: f32 = 0.7;

/// How often a page is expected to change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFreq {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl fmt::Display for ChangeFreq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeFreq::Always => "always",
            ChangeFreq::Hourly => "hourly",
            ChangeFreq::Daily => "daily",
            ChangeFreq::Weekly => "weekly",
            ChangeFreq::Monthly => "monthly",
            ChangeFreq::Yearly => "yearly",
            ChangeFreq::Never => "never",
        };
        f.write_str(s)
    }
}

/// Single URL entry in the sitemap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SitemapEntry {
    /// Site-relative path or absolute URL
    pub loc: String,
    pub lastmod: NaiveDate,
    pub changefreq: ChangeFreq,
    pub priority: f32,
}

/// Sitemap data structure
#[derive(Debug, Default)]
pub struct Sitemap {
    entries: Vec<SitemapEntry>,
}

impl Sitemap {
    /// Fixed pages followed by one entry per manifest post
    pub fn build(config: &SiteConfig, manifest: &Manifest) -> Self {
        let fallback = config.sitemap.fallback_lastmod;

        let static_pages = config.sitemap.pages.iter().map(|page| SitemapEntry {
            loc: absolute(config, &page.loc),
            ..page.clone()
        });

        let posts = manifest.files().iter().map(|file| SitemapEntry {
            loc: full_url_for(config, &post_path(config, &slug_from_filename(file))),
            lastmod: date_prefix(file).unwrap_or(fallback),
            changefreq: ChangeFreq::Monthly,
            priority: POST_PRIORITY,
        });

        Self {
            entries: static_pages.chain(posts).collect(),
        }
    }

    pub fn entries(&self) -> &[SitemapEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Generate sitemap XML string.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(256 * (self.entries.len() + 1));

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<urlset xmlns="{SITEMAP_NS}">"#));
        xml.push('\n');

        for entry in &self.entries {
            xml.push_str("  <url>\n");
            xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&entry.loc)));
            xml.push_str(&format!(
                "    <lastmod>{}</lastmod>\n",
                entry.lastmod.format("%Y-%m-%d")
            ));
            xml.push_str(&format!("    <changefreq>{}</changefreq>\n", entry.changefreq));
            xml.push_str(&format!("    <priority>{}</priority>\n", format_priority(entry.priority)));
            xml.push_str("  </url>\n");
        }

        xml.push_str("</urlset>\n");
        xml
    }
}

/// Shortest form of the configured value, with at least one decimal
fn format_priority(priority: f32) -> String {
    let text = priority.to_string();
    if text.contains('.') {
        text
    } else {
        format!("{:.1}", priority)
    }
}

fn absolute(config: &SiteConfig, loc: &str) -> String {
    if loc.starts_with("http://") || loc.starts_with("https://") {
        loc.to_string()
    } else {
        full_url_for(config, loc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_one_page() -> SiteConfig {
        let mut config = SiteConfig::default();
        config.url = "https://example.com".to_string();
        config.sitemap.pages = vec![SitemapEntry {
            loc: "/".to_string(),
            lastmod: NaiveDate::from_ymd_opt(2025, 12, 4).unwrap(),
            changefreq: ChangeFreq::Weekly,
            priority: 1.0,
        }];
        config
    }

    #[test]
    fn test_sitemap_empty_manifest() {
        let sitemap = Sitemap::build(&config_with_one_page(), &Manifest::default());
        let xml = sitemap.to_xml();

        assert_eq!(sitemap.len(), 1);
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains(&format!(r#"<urlset xmlns="{SITEMAP_NS}">"#)));
        assert!(xml.contains("<loc>https://example.com/</loc>"));
        assert!(xml.contains("<priority>1.0</priority>"));
        assert!(xml.contains("<changefreq>weekly</changefreq>"));
        assert!(xml.ends_with("</urlset>\n"));
    }

    #[test]
    fn test_post_entries() {
        let manifest = Manifest::from_filenames(["2025-05-01-my-post.md", "undated.md"]);
        let sitemap = Sitemap::build(&config_with_one_page(), &manifest);

        let entries = sitemap.entries();
        assert_eq!(entries.len(), 3);
        // Static pages come first
        assert_eq!(entries[0].loc, "https://example.com/");

        let undated = &entries[1];
        assert_eq!(undated.loc, "https://example.com/blogs/undated/");
        assert_eq!(undated.lastmod.to_string(), "2025-12-04");

        let dated = &entries[2];
        assert_eq!(dated.loc, "https://example.com/blogs/my-post/");
        assert_eq!(dated.lastmod.to_string(), "2025-05-01");
        assert_eq!(dated.changefreq, ChangeFreq::Monthly);

        let xml = sitemap.to_xml();
        assert!(xml.contains("<lastmod>2025-05-01</lastmod>"));
        assert!(xml.contains("<priority>0.7</priority>"));
    }

    #[test]
    fn test_default_pages_are_absolute() {
        let sitemap = Sitemap::build(&SiteConfig::default(), &Manifest::default());
        assert_eq!(sitemap.len(), 14);
        assert!(sitemap
            .entries()
            .iter()
            .all(|e| e.loc.starts_with("https://www.brandiblemg.com/")));
        assert!(sitemap.to_xml().contains("<loc>https://www.brandiblemg.com/privacy</loc>"));
    }

    #[test]
    fn test_loc_is_escaped() {
        let mut config = config_with_one_page();
        config.sitemap.pages[0].loc = "/search?a=1&b=2".to_string();
        let xml = Sitemap::build(&config, &Manifest::default()).to_xml();
        assert!(xml.contains("<loc>https://example.com/search?a=1&amp;b=2</loc>"));
    }

    #[test]
    fn test_priority_keeps_configured_precision() {
        let mut config = config_with_one_page();
        config.sitemap.pages[0].priority = 0.85;
        let xml = Sitemap::build(&config, &Manifest::default()).to_xml();
        assert!(xml.contains("<priority>0.85</priority>"));

        assert_eq!(format_priority(1.0), "1.0");
        assert_eq!(format_priority(0.7), "0.7");
    }
}
