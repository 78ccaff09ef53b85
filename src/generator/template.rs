//! Post page template
//!
//! The shared `post.html` is parsed once into literal segments and named
//! slots. Rendering a post fills each slot from a typed [`PostMeta`], so
//! interpolated text is always escaped and never re-scanned.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::json;

use crate::config::SiteConfig;
use crate::content::Post;
use crate::helpers::{full_url_for, html_escape, image_url, post_url, script_safe_json};

/// A replaceable region of the template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Title,
    Description,
    OgTitle,
    OgDescription,
    OgImage,
    OgUrl,
    TwitterTitle,
    TwitterDescription,
    TwitterImage,
    Canonical,
    Breadcrumb,
}

impl Slot {
    pub const ALL: [Slot; 11] = [
        Slot::Title,
        Slot::Description,
        Slot::OgTitle,
        Slot::OgDescription,
        Slot::OgImage,
        Slot::OgUrl,
        Slot::TwitterTitle,
        Slot::TwitterDescription,
        Slot::TwitterImage,
        Slot::Canonical,
        Slot::Breadcrumb,
    ];

    /// Pattern with an opening group and a closing group around the value
    fn pattern(self) -> &'static Regex {
        match self {
            Slot::Title => &TITLE_RE,
            Slot::Description => &DESCRIPTION_RE,
            Slot::OgTitle => &OG_TITLE_RE,
            Slot::OgDescription => &OG_DESCRIPTION_RE,
            Slot::OgImage => &OG_IMAGE_RE,
            Slot::OgUrl => &OG_URL_RE,
            Slot::TwitterTitle => &TWITTER_TITLE_RE,
            Slot::TwitterDescription => &TWITTER_DESCRIPTION_RE,
            Slot::TwitterImage => &TWITTER_IMAGE_RE,
            Slot::Canonical => &CANONICAL_RE,
            Slot::Breadcrumb => &BREADCRUMB_RE,
        }
    }
}

fn meta_re(attr: &str, name: &str) -> Regex {
    Regex::new(&format!(
        r#"(<meta\s+{}="{}"\s+content=")[^"]*("[^>]*>)"#,
        attr,
        regex::escape(name)
    ))
    .expect("meta regex is valid")
}

lazy_static! {
    static ref TITLE_RE: Regex =
        Regex::new(r"(<title[^>]*>)(?s:.*?)(</title>)").expect("title regex is valid");
    static ref DESCRIPTION_RE: Regex = meta_re("name", "description");
    static ref OG_TITLE_RE: Regex = meta_re("property", "og:title");
    static ref OG_DESCRIPTION_RE: Regex = meta_re("property", "og:description");
    static ref OG_IMAGE_RE: Regex = meta_re("property", "og:image");
    static ref OG_URL_RE: Regex = meta_re("property", "og:url");
    static ref TWITTER_TITLE_RE: Regex = meta_re("name", "twitter:title");
    static ref TWITTER_DESCRIPTION_RE: Regex = meta_re("name", "twitter:description");
    static ref TWITTER_IMAGE_RE: Regex = meta_re("name", "twitter:image");
    static ref CANONICAL_RE: Regex = Regex::new(r#"(<link\s+rel="canonical"\s+href=")[^"]*("[^>]*>)"#)
        .expect("canonical regex is valid");
    static ref BREADCRUMB_RE: Regex = Regex::new(
        r#"(<script\s+type="application/ld\+json"[^>]*>)[^<]*?BreadcrumbList[^<]*?(</script>)"#
    )
    .expect("breadcrumb regex is valid");
}

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Slot {
        slot: Slot,
        open: String,
        close: String,
    },
}

/// Per-post values for every slot
#[derive(Debug, Clone)]
pub struct PostMeta {
    /// Post title without branding
    pub title: String,
    /// `"{title} | {brand}"`
    pub page_title: String,
    pub description: String,
    pub image_url: String,
    pub post_url: String,
    /// BreadcrumbList JSON-LD
    pub breadcrumb: serde_json::Value,
}

impl PostMeta {
    /// Metadata for a post; `None` when the post has no title
    pub fn from_post(config: &SiteConfig, post: &Post) -> Option<Self> {
        let title = post.title.clone()?;
        let url = post_url(config, &post.slug);

        let breadcrumb = json!({
            "@context": "https://schema.org",
            "@type": "BreadcrumbList",
            "itemListElement": [
                {
                    "@type": "ListItem",
                    "position": 1,
                    "name": "Home",
                    "item": full_url_for(config, "/")
                },
                {
                    "@type": "ListItem",
                    "position": 2,
                    "name": "Blog",
                    "item": full_url_for(config, &format!("/{}/", config.blog_segment()))
                },
                {
                    "@type": "ListItem",
                    "position": 3,
                    "name": title,
                    "item": url
                }
            ]
        });

        Some(Self {
            page_title: format!("{} | {}", title, config.title),
            description: post
                .excerpt
                .clone()
                .unwrap_or_else(|| format!("Read our latest blog post: {}", title)),
            image_url: image_url(config, post.featured_image.as_deref()),
            post_url: url,
            breadcrumb,
            title,
        })
    }

    /// Escaped slot contents
    fn value(&self, slot: Slot) -> String {
        match slot {
            Slot::Title | Slot::OgTitle | Slot::TwitterTitle => html_escape(&self.page_title),
            Slot::Description | Slot::OgDescription | Slot::TwitterDescription => {
                html_escape(&self.description)
            }
            Slot::OgImage | Slot::TwitterImage => html_escape(&self.image_url),
            Slot::OgUrl | Slot::Canonical => html_escape(&self.post_url),
            Slot::Breadcrumb => {
                let json = serde_json::to_string_pretty(&self.breadcrumb).unwrap_or_default();
                format!("\n  {}\n  ", script_safe_json(&json))
            }
        }
    }
}

/// Parsed post template
#[derive(Debug, Clone)]
pub struct PostTemplate {
    segments: Vec<Segment>,
}

impl PostTemplate {
    /// Parse a template, locating the first occurrence of each slot
    ///
    /// Relative asset paths in the literal text are rebased one directory
    /// deeper, since pages are written to `<blog_dir>/<slug>/index.html`.
    pub fn parse(html: &str) -> Self {
        let mut found: Vec<(usize, usize, Slot, String, String)> = Vec::new();
        for slot in Slot::ALL {
            match slot.pattern().captures(html) {
                Some(caps) => {
                    let whole = caps.get(0).expect("group 0 always matches");
                    found.push((
                        whole.start(),
                        whole.end(),
                        slot,
                        caps[1].to_string(),
                        caps[2].to_string(),
                    ));
                }
                None => tracing::debug!("Template has no {:?} slot", slot),
            }
        }
        found.sort_by_key(|(start, ..)| *start);

        let mut segments = Vec::new();
        let mut cursor = 0;
        for (start, end, slot, open, close) in found {
            if start < cursor {
                tracing::debug!("Ignoring overlapping {:?} slot", slot);
                continue;
            }
            segments.push(Segment::Literal(rebase_assets(&html[cursor..start])));
            segments.push(Segment::Slot { slot, open, close });
            cursor = end;
        }
        segments.push(Segment::Literal(rebase_assets(&html[cursor..])));

        Self { segments }
    }

    /// Slots found in the template, in document order
    pub fn slots(&self) -> Vec<Slot> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Slot { slot, .. } => Some(*slot),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    pub fn render(&self, meta: &PostMeta) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Slot { slot, open, close } => {
                    out.push_str(open);
                    out.push_str(&meta.value(*slot));
                    out.push_str(close);
                }
            }
        }
        out
    }
}

/// `../assets/` -> `../../assets/` in href/src attributes
fn rebase_assets(html: &str) -> String {
    html.replace(r#"href="../assets/"#, r#"href="../../assets/"#)
        .replace(r#"src="../assets/"#, r#"src="../../assets/"#)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <title>Blog | Brandible Marketing Group</title>
  <meta name="description" content="Our blog" />
  <meta property="og:title" content="Blog" />
  <meta property="og:description" content="Our blog" />
  <meta property="og:image" content="https://www.brandiblemg.com/assets/Brandible.png" />
  <meta property="og:url" content="https://www.brandiblemg.com/blogs/post.html" />
  <meta name="twitter:title" content="Blog" />
  <meta name="twitter:description" content="Our blog" />
  <meta name="twitter:image" content="https://www.brandiblemg.com/assets/Brandible.png" />
  <link rel="canonical" href="https://www.brandiblemg.com/blogs/post.html" id="canonical-url" />
  <link rel="stylesheet" href="../assets/css/output.css" />
  <script type="application/ld+json">
  {"@context": "https://schema.org", "@type": "Organization", "name": "Brandible"}
  </script>
  <script type="application/ld+json">
  {"@context": "https://schema.org", "@type": "BreadcrumbList", "itemListElement": []}
  </script>
</head>
<body>
  <img src="../assets/logo.png" alt="logo" />
  <div id="blog-post-content"></div>
</body>
</html>
"#;

    fn post(raw: &str) -> Post {
        Post::parse("2025-05-01-my-post.md", raw)
    }

    #[test]
    fn test_parse_finds_all_slots() {
        let template = PostTemplate::parse(TEMPLATE);
        assert_eq!(template.slots().len(), Slot::ALL.len());
        assert_eq!(template.slots()[0], Slot::Title);
        assert_eq!(*template.slots().last().unwrap(), Slot::Breadcrumb);
    }

    #[test]
    fn test_render_defaults() {
        let config = SiteConfig::default();
        let meta = PostMeta::from_post(&config, &post("---\ntitle: \"Hello\"\n---\nHi")).unwrap();
        let html = PostTemplate::parse(TEMPLATE).render(&meta);

        assert!(html.contains("<title>Hello | Brandible Marketing Group</title>"));
        assert!(html.contains(
            r#"<meta property="og:image" content="https://www.brandiblemg.com/assets/Brandible.png" />"#
        ));
        assert!(html.contains(
            r#"<meta name="description" content="Read our latest blog post: Hello" />"#
        ));
        assert!(html.contains(
            r#"<link rel="canonical" href="https://www.brandiblemg.com/blogs/my-post/" id="canonical-url" />"#
        ));
        assert!(html.contains(
            r#"<meta property="og:url" content="https://www.brandiblemg.com/blogs/my-post/" />"#
        ));
    }

    #[test]
    fn test_render_escapes_text() {
        let config = SiteConfig::default();
        let meta = PostMeta::from_post(
            &config,
            &post("---\ntitle: Tips & <Tricks>\nexcerpt: Say \"hi\"\n---\n"),
        )
        .unwrap();
        let html = PostTemplate::parse(TEMPLATE).render(&meta);

        assert!(html.contains("<title>Tips &amp; &lt;Tricks&gt; | Brandible Marketing Group</title>"));
        assert!(html.contains(r#"<meta name="twitter:description" content="Say &quot;hi&quot;" />"#));
        assert!(!html.contains("<Tricks>"));
        assert!(html.contains(r#""name": "Tips \u0026 \u003cTricks\u003e""#));

        let breadcrumb: serde_json::Value =
            serde_json::from_str(meta.value(Slot::Breadcrumb).trim()).unwrap();
        assert_eq!(breadcrumb["itemListElement"][2]["name"], "Tips & <Tricks>");
    }

    #[test]
    fn test_breadcrumb_replaced_and_organization_kept() {
        let config = SiteConfig::default();
        let meta = PostMeta::from_post(&config, &post("---\ntitle: Hello\n---\n")).unwrap();
        let html = PostTemplate::parse(TEMPLATE).render(&meta);

        assert!(html.contains(r#""@type": "Organization""#));
        assert!(html.contains(r#""item": "https://www.brandiblemg.com/blogs/my-post/""#));
        assert!(html.contains(r#""item": "https://www.brandiblemg.com/blogs/""#));
        assert!(!html.contains(r#""itemListElement": []"#));
    }

    #[test]
    fn test_assets_rebased_outside_slots() {
        let config = SiteConfig::default();
        let mut p = post("---\ntitle: Hello\n---\n");
        p.featured_image = Some("../assets/raw.png".to_string());
        let meta = PostMeta::from_post(&config, &p).unwrap();
        let html = PostTemplate::parse(TEMPLATE).render(&meta);

        assert!(html.contains(r#"href="../../assets/css/output.css""#));
        assert!(html.contains(r#"src="../../assets/logo.png""#));
        assert!(!html.contains(r#"href="../assets/"#));
    }

    #[test]
    fn test_untitled_post_has_no_meta() {
        let config = SiteConfig::default();
        assert!(PostMeta::from_post(&config, &post("no front matter")).is_none());
    }

    #[test]
    fn test_missing_slots_are_skipped() {
        let template = PostTemplate::parse("<html><head></head><body>x</body></html>");
        assert!(template.slots().is_empty());

        let config = SiteConfig::default();
        let meta = PostMeta::from_post(&config, &post("---\ntitle: A\n---\n")).unwrap();
        assert_eq!(
            template.render(&meta),
            "<html><head></head><body>x</body></html>"
        );
    }
}
