//! Filename conventions: `YYYY-MM-DD-slug.md`

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

lazy_static! {
    static ref DATE_PREFIX_RE: Regex =
        Regex::new(r"^(\d{4}-\d{2}-\d{2})-").expect("date prefix regex is valid");
}

/// Strip the date prefix and `.md` extension from a post filename
pub fn slug_from_filename(filename: &str) -> String {
    let name = DATE_PREFIX_RE.replace(filename, "");
    name.strip_suffix(".md").unwrap_or(&name).to_string()
}

/// The `YYYY-MM-DD` prefix of a filename, if present and a real date
pub fn date_prefix(filename: &str) -> Option<NaiveDate> {
    let caps = DATE_PREFIX_RE.captures(filename)?;
    NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d").ok()
}

/// Whether a slug can be used as a URL path segment unchanged
pub fn is_url_safe(slug: &str) -> bool {
    !slug.is_empty() && slug::slugify(slug) == slug
}

/// Check if a path is a markdown post file
pub fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md")
        .unwrap_or(false)
}

/// Filename for a new post written on `date`
pub fn post_filename(date: NaiveDate, title: &str) -> String {
    format!("{}-{}.md", date.format("%Y-%m-%d"), slug::slugify(title))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_from_filename() {
        assert_eq!(slug_from_filename("2025-05-01-my-post.md"), "my-post");
        assert_eq!(slug_from_filename("undated.md"), "undated");
        assert_eq!(slug_from_filename("2025-05-01.md"), "2025-05-01");
    }

    #[test]
    fn test_date_prefix() {
        assert_eq!(
            date_prefix("2024-03-01-b.md"),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        assert_eq!(date_prefix("b.md"), None);
        assert_eq!(date_prefix("2024-13-45-bad.md"), None);
    }

    #[test]
    fn test_is_url_safe() {
        assert!(is_url_safe("my-post"));
        assert!(is_url_safe("seo-tips-2025"));
        assert!(!is_url_safe("My Post"));
        assert!(!is_url_safe("caf\u{e9}"));
        assert!(!is_url_safe(""));
    }

    #[test]
    fn test_post_filename() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 9).unwrap();
        assert_eq!(
            post_filename(date, "Ten SEO Tips!"),
            "2025-06-09-ten-seo-tips.md"
        );
    }
}
