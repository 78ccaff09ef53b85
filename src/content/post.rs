//! Post model

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::cmp::Ordering;

use super::slug::{date_prefix, slug_from_filename};
use super::FrontMatter;

/// A blog post read from `YYYY-MM-DD-slug.md`
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    /// Source filename, e.g. `2025-05-01-my-post.md`
    pub filename: String,

    /// URL slug (filename without date prefix and extension)
    pub slug: String,

    /// Post title
    pub title: Option<String>,

    /// Publication date as written in the front-matter
    pub date: Option<String>,

    pub author: Option<String>,
    pub category: Option<String>,
    pub excerpt: Option<String>,

    /// Site-relative or absolute image path
    pub featured_image: Option<String>,

    pub tags: Vec<String>,

    /// Raw markdown after the front-matter
    pub body: String,
}

impl Post {
    /// Build a post from its filename and raw file contents
    pub fn parse(filename: &str, raw: &str) -> Self {
        let (fm, body) = FrontMatter::parse(raw);
        let field = |key: &str| fm.text(key).map(str::to_string);

        Self {
            filename: filename.to_string(),
            slug: slug_from_filename(filename),
            title: field("title"),
            date: field("date"),
            author: field("author"),
            category: field("category"),
            excerpt: field("excerpt"),
            featured_image: field("featured_image"),
            tags: fm.list("tags"),
            body: body.to_string(),
        }
    }

    /// Title, or `Untitled`
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled")
    }

    /// Publication date: front-matter `date`, else the filename prefix
    pub fn published(&self) -> Option<NaiveDate> {
        self.date
            .as_deref()
            .and_then(parse_date_string)
            .or_else(|| date_prefix(&self.filename))
    }

    /// Long-form date such as `May 1, 2025`; unparseable dates are shown as written
    pub fn display_date(&self) -> String {
        match self.published() {
            Some(date) => date.format("%B %-d, %Y").to_string(),
            None => self.date.clone().unwrap_or_default(),
        }
    }
}

/// Newest first; undated posts last, ties broken by filename (newest first)
pub fn cmp_newest_first(a: &Post, b: &Post) -> Ordering {
    match (a.published(), b.published()) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| b.filename.cmp(&a.filename))
}

/// Parse a date string in various formats
pub fn parse_date_string(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    let date_formats = ["%Y-%m-%d", "%Y/%m/%d", "%B %d, %Y", "%b %d, %Y"];
    for fmt in date_formats {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    // RFC 3339 / ISO 8601 with offset
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"---
title: "Ten SEO Tips"
date: 2025-05-01
author: Jane
category: SEO
excerpt: Rank better.
featured_image: /assets/blog/seo.png
tags: [seo, marketing]
---
Body text.
"#;

    #[test]
    fn test_parse_post() {
        let post = Post::parse("2025-05-01-ten-seo-tips.md", SAMPLE);
        assert_eq!(post.slug, "ten-seo-tips");
        assert_eq!(post.title.as_deref(), Some("Ten SEO Tips"));
        assert_eq!(post.category.as_deref(), Some("SEO"));
        assert_eq!(post.featured_image.as_deref(), Some("/assets/blog/seo.png"));
        assert_eq!(post.tags, vec!["seo", "marketing"]);
        assert_eq!(post.body, "Body text.\n");
        assert_eq!(post.display_date(), "May 1, 2025");
    }

    #[test]
    fn test_post_without_frontmatter() {
        let post = Post::parse("2024-02-03-plain.md", "Just text");
        assert_eq!(post.display_title(), "Untitled");
        assert_eq!(post.body, "Just text");
        assert!(post.tags.is_empty());
        // Falls back to the filename prefix
        assert_eq!(post.published(), NaiveDate::from_ymd_opt(2024, 2, 3));
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15);
        assert_eq!(parse_date_string("2024-01-15"), expected);
        assert_eq!(parse_date_string("2024/01/15"), expected);
        assert_eq!(parse_date_string("2024-01-15 10:30:00"), expected);
        assert_eq!(parse_date_string("2024-01-15T10:30:00Z"), expected);
        assert_eq!(parse_date_string("January 15, 2024"), expected);
        assert_eq!(parse_date_string("soon"), None);
    }

    #[test]
    fn test_sort_newest_first() {
        let mut posts = vec![
            Post::parse("a.md", "---\ndate: someday\n---\n"),
            Post::parse("2024-01-01-old.md", "---\ndate: 2024-01-01\n---\n"),
            Post::parse("2024-06-01-new.md", "---\ndate: 2024-06-01\n---\n"),
        ];
        posts.sort_by(cmp_newest_first);
        let order: Vec<_> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(order, vec!["new", "old", "a"]);
    }
}
