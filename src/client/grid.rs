//! Blog grid renderer
//!
//! Loads every post listed in the manifest once, then filters and pages the
//! loaded set in memory as the category or search text changes.

use anyhow::Result;
use serde::Serialize;
use tera::Context;

use super::{fetch_manifest, fetch_posts, ClientContext, Fetcher};
use crate::content::{cmp_newest_first, Post};
use crate::error::FetchError;
use crate::helpers::post_path;

/// Category value that matches every post
pub const ALL_CATEGORIES: &str = "all";

/// Result of loading the grid
#[derive(Debug)]
pub enum GridOutcome {
    /// No manifest, an empty manifest, or no post could be loaded
    Empty,
    Loaded(BlogGrid),
    /// The manifest could not be fetched
    Error(FetchError),
}

impl GridOutcome {
    /// Fetch the manifest and every post it lists
    pub async fn load<F>(ctx: &ClientContext, fetcher: &F) -> Self
    where
        F: Fetcher + ?Sized,
    {
        let manifest = match fetch_manifest(&ctx.config, fetcher).await {
            Ok(manifest) => manifest,
            Err(e) => {
                tracing::error!("Error loading blog posts: {}", e);
                return GridOutcome::Error(e);
            }
        };
        if manifest.is_empty() {
            return GridOutcome::Empty;
        }

        let mut posts = fetch_posts(&ctx.config, fetcher, manifest.files()).await;
        if posts.is_empty() {
            return GridOutcome::Empty;
        }
        posts.sort_by(cmp_newest_first);
        tracing::debug!("Loaded {} of {} posts", posts.len(), manifest.len());

        GridOutcome::Loaded(BlogGrid::new(posts, ctx.config.per_page))
    }

    /// HTML for page `page` of the grid, or the matching message
    pub fn render_html(&self, ctx: &ClientContext, page: usize) -> Result<String> {
        match self {
            GridOutcome::Empty => Ok(ctx.message("", "empty", Some("empty_hint"), false)),
            GridOutcome::Error(_) => Ok(ctx.message("", "grid_error", Some("error_hint"), true)),
            GridOutcome::Loaded(grid) => grid.render_html(ctx, page),
        }
    }
}

/// Summary card for one post
#[derive(Debug, Clone, Serialize)]
pub struct Card {
    pub slug: String,
    pub url: String,
    pub title: String,
    pub date: String,
    pub category: String,
    pub category_color: String,
    pub excerpt: String,
    pub featured_image: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Pagination {
    pub per_page: usize,
    /// Number of pages (at least 1)
    pub total: usize,
    pub current: usize,
    pub prev: Option<usize>,
    pub next: Option<usize>,
    /// Number of visible posts across all pages
    pub items: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct GridPage {
    pub cards: Vec<Card>,
    pub pagination: Pagination,
}

/// Loaded posts with the active filter
#[derive(Debug, Clone)]
pub struct BlogGrid {
    posts: Vec<Post>,
    category: String,
    search: String,
    per_page: usize,
}

impl BlogGrid {
    /// Posts must already be sorted
    pub fn new(posts: Vec<Post>, per_page: usize) -> Self {
        Self {
            posts,
            category: ALL_CATEGORIES.to_string(),
            search: String::new(),
            per_page: per_page.max(1),
        }
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_category(&mut self, category: &str) {
        self.category = category.to_string();
    }

    /// Search text is matched lower-cased and trimmed
    pub fn set_search(&mut self, search: &str) {
        self.search = search.trim().to_lowercase();
    }

    fn matches(&self, post: &Post) -> bool {
        let category = post.category.as_deref().unwrap_or("");
        let matches_category = self.category == ALL_CATEGORIES || category == self.category;

        let matches_search = self.search.is_empty() || {
            let text = format!(
                "{} {}",
                post.display_title(),
                post.excerpt.as_deref().unwrap_or("")
            );
            text.to_lowercase().contains(&self.search)
        };

        matches_category && matches_search
    }

    /// Posts passing the current filter, in display order
    pub fn visible(&self) -> Vec<&Post> {
        self.posts.iter().filter(|p| self.matches(p)).collect()
    }

    /// Cards for 1-based page `page`, clamped to the available pages
    pub fn page(&self, ctx: &ClientContext, page: usize) -> GridPage {
        let visible = self.visible();
        let total = visible.len().div_ceil(self.per_page).max(1);
        let current = page.clamp(1, total);

        let cards = visible
            .iter()
            .skip((current - 1) * self.per_page)
            .take(self.per_page)
            .map(|post| card(ctx, post))
            .collect();

        GridPage {
            cards,
            pagination: Pagination {
                per_page: self.per_page,
                total,
                current,
                prev: (current > 1).then(|| current - 1),
                next: (current < total).then(|| current + 1),
                items: visible.len(),
            },
        }
    }

    pub fn render_html(&self, ctx: &ClientContext, page: usize) -> Result<String> {
        let page = self.page(ctx, page);

        let mut context = Context::new();
        context.insert("cards", &page.cards);
        context.insert("pagination", &page.pagination);
        context.insert("read_more", &ctx.i18n.get("read_more"));
        context.insert("featured_image_for", &ctx.i18n.get("featured_image_for"));
        let no_results = if page.cards.is_empty() {
            ctx.message(
                "no-results-message",
                "no_results",
                Some("no_results_hint"),
                false,
            )
        } else {
            String::new()
        };
        context.insert("no_results", &no_results);

        ctx.templates.render("blog/grid.html", &context)
    }
}

fn card(ctx: &ClientContext, post: &Post) -> Card {
    let category = post.category.clone().unwrap_or_default();
    Card {
        slug: post.slug.clone(),
        url: post_path(&ctx.config, &post.slug),
        title: post.display_title().to_string(),
        date: post.display_date(),
        category_color: ctx.config.category_color(&category).to_string(),
        category,
        excerpt: post.excerpt.clone().unwrap_or_default(),
        featured_image: post.featured_image.clone().unwrap_or_default(),
    }
}
