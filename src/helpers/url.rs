//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::SiteConfig;

/// Characters escaped by `encodeURIComponent`
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Generate a full URL including the domain
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/about/") // -> "https://www.brandiblemg.com/about/"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    format!("{}/{}", config.base_url(), path.trim_start_matches('/'))
}

/// Site-relative path of a post page, e.g. `/blogs/my-post/`
pub fn post_path(config: &SiteConfig, slug: &str) -> String {
    format!("/{}/{}/", config.blog_segment(), slug)
}

/// Absolute URL of a post page
pub fn post_url(config: &SiteConfig, slug: &str) -> String {
    full_url_for(config, &post_path(config, slug))
}

/// Absolute URL for a featured image, falling back to the site default
pub fn image_url(config: &SiteConfig, featured_image: Option<&str>) -> String {
    match featured_image {
        Some(img) if img.starts_with("http") => img.to_string(),
        Some(img) if !img.is_empty() => full_url_for(config, img),
        _ => full_url_for(config, &config.default_image),
    }
}

/// Percent-encode a string the way `encodeURIComponent` does
pub fn encode_component(s: &str) -> String {
    utf8_percent_encode(s, COMPONENT).to_string()
}

/// Decode a percent-encoded query value (`+` counts as a space)
pub fn decode_component(s: &str) -> String {
    let s = s.replace('+', " ");
    percent_encoding::percent_decode_str(&s)
        .decode_utf8_lossy()
        .into_owned()
}
