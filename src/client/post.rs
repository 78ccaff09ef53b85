//! Single post renderer
//!
//! Resolves a post from the request URL, renders its markdown through the
//! lazily loaded markdown module and derives page metadata, Article JSON-LD,
//! share links, related services and related posts.

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tera::Context;

use super::{fetch_manifest, fetch_posts, ClientContext, Fetcher};
use crate::config::SiteConfig;
use crate::content::{cmp_newest_first, LazyModule, MarkdownRenderer, Post};
use crate::error::PostError;
use crate::helpers::{
    decode_component, encode_component, full_url_for, image_url, post_path, post_url,
    script_safe_json,
};

/// Requested slug: the `slug` query parameter, else the last path segment
///
/// Accepts `/blogs/post.html?slug=my-post`, `/blogs/my-post/` and absolute
/// URLs of either form.
pub fn slug_from_url(config: &SiteConfig, url: &str) -> Option<String> {
    let url = match url.find("://") {
        Some(i) => {
            let rest = &url[i + 3..];
            rest.find('/').map_or("/", |j| &rest[j..])
        }
        None => url,
    };
    let url = url.split('#').next().unwrap_or("");
    let (path, query) = url.split_once('?').unwrap_or((url, ""));

    let from_query = query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "slug")
        .map(|(_, value)| decode_component(value));
    if let Some(slug) = from_query.filter(|s| !s.trim().is_empty()) {
        return Some(slug.trim().to_string());
    }

    let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    // Generated pages are served as `/blogs/<slug>/index.html`
    if segments.last() == Some(&"index.html") {
        segments.pop();
    }
    let segment = decode_component(segments.last()?);
    if segment == config.blog_segment() || segment == "post.html" {
        return None;
    }
    Some(segment)
}

/// Metadata written into the page head
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub og_title: String,
    pub og_description: String,
    pub og_image: String,
    pub og_url: String,
    pub twitter_title: String,
    pub twitter_description: String,
    pub twitter_image: String,
    pub canonical: String,
}

impl PageMeta {
    pub fn for_post(config: &SiteConfig, post: &Post) -> Self {
        let title = format!("{} | {}", post.display_title(), config.title);
        let description = post
            .excerpt
            .clone()
            .unwrap_or_else(|| format!("Read our latest blog post: {}", post.display_title()));
        let image = image_url(config, post.featured_image.as_deref());
        let url = post_url(config, &post.slug);

        Self {
            og_title: title.clone(),
            twitter_title: title.clone(),
            og_description: description.clone(),
            twitter_description: description.clone(),
            og_image: image.clone(),
            twitter_image: image,
            og_url: url.clone(),
            canonical: url,
            title,
            description,
        }
    }

    /// Metadata for the blog index page
    pub fn for_blog(config: &SiteConfig) -> Self {
        let title = format!("Blog | {}", config.title);
        let image = image_url(config, None);
        let url = full_url_for(config, &format!("/{}/", config.blog_segment()));

        Self {
            og_title: title.clone(),
            twitter_title: title.clone(),
            og_description: config.description.clone(),
            twitter_description: config.description.clone(),
            og_image: image.clone(),
            twitter_image: image,
            og_url: url.clone(),
            canonical: url,
            title,
            description: config.description.clone(),
        }
    }
}

/// Social share URLs
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ShareLinks {
    pub twitter: String,
    pub facebook: String,
    pub linkedin: String,
    pub email: String,
}

impl ShareLinks {
    pub fn new(config: &SiteConfig, title: &str, url: &str) -> Self {
        let text = encode_component(&format!("{} - {}", title, config.title));
        let title = encode_component(title);
        let url = encode_component(url);

        Self {
            twitter: format!("https://twitter.com/intent/tweet?text={}&url={}", text, url),
            facebook: format!("https://www.facebook.com/sharer/sharer.php?u={}", url),
            linkedin: format!("https://www.linkedin.com/sharing/share-offsite/?url={}", url),
            email: format!("mailto:?subject={}&body={}%20{}", title, text, url),
        }
    }
}

/// A service page suggested alongside a post
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ServiceLink {
    pub name: &'static str,
    pub url: &'static str,
    pub description: &'static str,
}

const fn service(name: &'static str, url: &'static str, description: &'static str) -> ServiceLink {
    ServiceLink {
        name,
        url,
        description,
    }
}

const WEB_DESIGN: ServiceLink = service(
    "Web Design & Development",
    "/services/web-design/",
    "Custom websites built to convert",
);
const DIGITAL_MARKETING: ServiceLink = service(
    "Digital Marketing",
    "/services/digital-marketing/",
    "Data-driven marketing strategies",
);
const MEDIA_MANAGEMENT: ServiceLink = service(
    "Media Management",
    "/services/media-management/",
    "Social media management & content",
);
const BRANDING: ServiceLink = service(
    "Branding & Identity",
    "/services/branding/",
    "Complete brand identity design",
);

/// Category -> service
const CATEGORY_SERVICES: &[(&str, ServiceLink)] = &[
    ("Marketing", DIGITAL_MARKETING),
    ("Web Design", WEB_DESIGN),
    ("SEO", service("SEO", "/services/digital-marketing/", GENERIC)),
    ("Social Media", MEDIA_MANAGEMENT),
    ("Business Tips", service("Business Tips", "/services/", GENERIC)),
    ("Case Studies", service("Case Studies", "/portfolio/", GENERIC)),
];

/// Description for services without a dedicated blurb
const GENERIC: &str = "Professional services";

/// Tag keyword -> service, matched as a substring of the lower-cased tag
const TAG_SERVICES: &[(&str, ServiceLink)] = &[
    ("website", WEB_DESIGN),
    ("web design", WEB_DESIGN),
    ("development", service(WEB_DESIGN.name, WEB_DESIGN.url, GENERIC)),
    ("seo", DIGITAL_MARKETING),
    ("marketing", DIGITAL_MARKETING),
    ("advertising", service(DIGITAL_MARKETING.name, DIGITAL_MARKETING.url, GENERIC)),
    ("social media", MEDIA_MANAGEMENT),
    ("branding", BRANDING),
    ("brand", service(BRANDING.name, BRANDING.url, GENERIC)),
];

const MAX_SERVICES: usize = 2;

/// Up to two services matching the post's category and tags, unique by URL
pub fn related_services(category: Option<&str>, tags: &[String]) -> Vec<ServiceLink> {
    let mut services: Vec<ServiceLink> = Vec::new();

    if let Some((_, s)) = category.and_then(|c| CATEGORY_SERVICES.iter().find(|(k, _)| *k == c)) {
        services.push(s.clone());
    }

    for tag in tags {
        let tag = tag.to_lowercase();
        for (keyword, s) in TAG_SERVICES {
            if tag.contains(keyword) && !services.iter().any(|known| known.url == s.url) {
                services.push(s.clone());
            }
        }
    }

    if services.is_empty() {
        services = vec![WEB_DESIGN, DIGITAL_MARKETING];
    }
    services.truncate(MAX_SERVICES);
    services
}

/// Summary of another post shown below the article
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RelatedPost {
    pub slug: String,
    pub title: String,
    pub url: String,
    pub excerpt: String,
}

/// Display fields of the post itself
#[derive(Debug, Clone, Serialize)]
struct ArticleView<'a> {
    title: &'a str,
    date: String,
    author: Option<&'a str>,
    category: Option<&'a str>,
    category_color: &'a str,
    excerpt: Option<&'a str>,
    featured_image: Option<&'a str>,
    tags: &'a [String],
}

/// A fully rendered post
#[derive(Debug, Clone)]
pub struct RenderedPost {
    pub post: Post,
    /// Markdown body converted to HTML
    pub body_html: String,
    pub meta: PageMeta,
    pub article_schema: serde_json::Value,
    pub share: ShareLinks,
    pub services: Vec<ServiceLink>,
}

impl RenderedPost {
    /// Article markup with the given related posts section
    pub fn to_html(&self, ctx: &ClientContext, related: &[RelatedPost]) -> Result<String> {
        let post = &self.post;
        let view = ArticleView {
            title: post.display_title(),
            date: post.display_date(),
            author: post.author.as_deref(),
            category: post.category.as_deref(),
            category_color: ctx.config.category_color(post.category.as_deref().unwrap_or("")),
            excerpt: post.excerpt.as_deref(),
            featured_image: post.featured_image.as_deref(),
            tags: &post.tags,
        };

        let mut context = Context::new();
        context.insert("post", &view);
        context.insert("body", &self.body_html);
        context.insert("share", &self.share);
        context.insert("services", &self.services);
        context.insert("blog_url", &format!("/{}/", ctx.config.blog_segment()));
        context.insert("t", &translations(ctx));
        context.insert("related", &related_html(ctx, related)?);

        ctx.templates.render("blog/article.html", &context)
    }

    /// Article JSON-LD as a string safe to embed in a script tag
    pub fn schema_json(&self) -> String {
        script_safe_json(&self.article_schema.to_string())
    }
}

const ARTICLE_KEYS: &[&str] = &[
    "home",
    "blog",
    "by",
    "share",
    "tags",
    "related_services",
    "learn_more",
    "featured_image_for",
];

fn translations(ctx: &ClientContext) -> serde_json::Map<String, serde_json::Value> {
    ARTICLE_KEYS
        .iter()
        .map(|key| (key.to_string(), json!(ctx.i18n.get(key))))
        .collect()
}

/// Related posts section, empty when there are none
pub fn related_html(ctx: &ClientContext, related: &[RelatedPost]) -> Result<String> {
    if related.is_empty() {
        return Ok(String::new());
    }

    let mut context = Context::new();
    context.insert("posts", related);
    context.insert("heading", &ctx.i18n.get("related_posts"));
    context.insert("read_more", &ctx.i18n.get("read_more"));
    context.insert("view_all", &ctx.i18n.get("view_all"));
    context.insert("blog_url", &format!("/{}/", ctx.config.blog_segment()));
    ctx.templates.render("blog/related.html", &context)
}

/// Article structured data for a post
pub fn article_schema(config: &SiteConfig, post: &Post) -> serde_json::Value {
    let url = post_url(config, &post.slug);
    let published = post
        .published()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .or_else(|| post.date.clone())
        .unwrap_or_else(|| Utc::now().to_rfc3339());

    let mut schema = json!({
        "@context": "https://schema.org",
        "@type": "Article",
        "headline": post.title.as_deref().unwrap_or("Blog Post"),
        "description": post.excerpt.as_deref().or(post.title.as_deref()).unwrap_or(""),
        "image": image_url(config, post.featured_image.as_deref()),
        "datePublished": published,
        "dateModified": published,
        "author": {
            "@type": "Organization",
            "name": post.author.as_deref().unwrap_or(&config.title),
            "url": config.base_url()
        },
        "publisher": {
            "@type": "Organization",
            "name": config.title,
            "logo": {
                "@type": "ImageObject",
                "url": image_url(config, None)
            }
        },
        "mainEntityOfPage": {
            "@type": "WebPage",
            "@id": url
        },
        "url": url
    });

    if let Some(category) = &post.category {
        schema["articleSection"] = json!(category);
    }
    if !post.tags.is_empty() {
        schema["keywords"] = json!(post.tags.join(", "));
    }
    schema
}

/// Renders single posts
pub struct PostRenderer<'a, F: ?Sized> {
    ctx: &'a ClientContext,
    fetcher: &'a F,
    markdown: &'a LazyModule<MarkdownRenderer>,
}

impl<'a, F: Fetcher + ?Sized> PostRenderer<'a, F> {
    pub fn new(
        ctx: &'a ClientContext,
        fetcher: &'a F,
        markdown: &'a LazyModule<MarkdownRenderer>,
    ) -> Self {
        Self {
            ctx,
            fetcher,
            markdown,
        }
    }

    /// Resolve, fetch and render the post addressed by `url`
    pub async fn render(&self, url: &str) -> Result<RenderedPost, PostError> {
        let config = &self.ctx.config;
        let slug = slug_from_url(config, url).ok_or(PostError::MissingSlug)?;
        let post = self.resolve(&slug).await?;

        let markdown = self.markdown.ensure_loaded().await?;
        let body_html = markdown.render(&post.body);

        Ok(RenderedPost {
            meta: PageMeta::for_post(config, &post),
            article_schema: article_schema(config, &post),
            share: ShareLinks::new(
                config,
                post.title.as_deref().unwrap_or("Blog Post"),
                &post_url(config, &post.slug),
            ),
            services: related_services(post.category.as_deref(), &post.tags),
            body_html,
            post,
        })
    }

    /// Find and fetch the post for `slug`
    ///
    /// The manifest is consulted first; without a match a single
    /// `{slug}.md` file is tried.
    pub async fn resolve(&self, slug: &str) -> Result<Post, PostError> {
        let config = &self.ctx.config;
        let manifest = fetch_manifest(config, self.fetcher)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("No posts index available: {}", e);
                Default::default()
            });

        let filename = match manifest.find_by_slug(slug) {
            Some(filename) => filename.to_string(),
            None if slug.contains('/') || slug.contains("..") => {
                return Err(PostError::NotFound(slug.to_string()))
            }
            None => format!("{}.md", slug),
        };

        match super::fetch_post(config, self.fetcher, &filename).await {
            Ok(Some(post)) => Ok(post),
            Ok(None) => Err(PostError::NotFound(slug.to_string())),
            Err(source) => Err(PostError::Fetch {
                path: filename,
                source,
            }),
        }
    }

    /// Up to `related_posts` other posts, newest first
    pub async fn related_posts(&self, current: &Post) -> Vec<RelatedPost> {
        let config = &self.ctx.config;
        let manifest = match fetch_manifest(config, self.fetcher).await {
            Ok(manifest) => manifest,
            Err(e) => {
                tracing::warn!("Skipping related posts: {}", e);
                return Vec::new();
            }
        };

        let others = manifest
            .files()
            .iter()
            .filter(|f| f.as_str() != current.filename);
        let mut posts = fetch_posts(config, self.fetcher, others).await;
        posts.sort_by(cmp_newest_first);

        posts
            .into_iter()
            .take(config.related_posts)
            .map(|post| RelatedPost {
                url: post_path(config, &post.slug),
                title: post.display_title().to_string(),
                excerpt: post.excerpt.clone().unwrap_or_default(),
                slug: post.slug,
            })
            .collect()
    }

    /// Localized message for a failed render
    pub fn error_html(&self, err: &PostError) -> String {
        if err.is_not_found() {
            self.ctx.message("", "not_found", None, true)
        } else {
            self.ctx.message("", "load_error", Some("error_hint"), true)
        }
    }
}
