//! Reader-side renderers
//!
//! The blog grid and single-post renderers fetch the manifest and markdown
//! sources through a [`Fetcher`], the same files a browser would request.
//! The development server uses [`FsFetcher`] over the site root.

pub mod grid;
pub mod post;

use anyhow::Result;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use crate::config::SiteConfig;
use crate::content::Post;
use crate::error::FetchError;
use crate::i18n::I18n;
use crate::manifest::Manifest;
use crate::templates::{Message, TemplateRenderer};

pub use grid::{BlogGrid, Card, GridOutcome, GridPage, Pagination};
pub use post::{
    related_services, slug_from_url, PageMeta, PostRenderer, RelatedPost, RenderedPost,
    ServiceLink, ShareLinks,
};

/// Source of site files, addressed by site-relative path
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a file; `Ok(None)` when it does not exist
    async fn fetch(&self, path: &str) -> Result<Option<String>, FetchError>;
}

/// Fetches files from a directory on disk
#[derive(Debug, Clone)]
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl Fetcher for FsFetcher {
    async fn fetch(&self, path: &str) -> Result<Option<String>, FetchError> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Ok(None);
        }

        match tokio::fs::read_to_string(self.root.join(relative)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Everything the renderers need besides a fetcher
pub struct ClientContext {
    pub config: SiteConfig,
    pub i18n: I18n,
    pub templates: TemplateRenderer,
}

impl ClientContext {
    pub fn new(config: SiteConfig, i18n: I18n) -> Result<Self> {
        Ok(Self {
            config,
            i18n,
            templates: TemplateRenderer::new()?,
        })
    }

    /// Render a localized message block
    pub fn message(&self, class: &str, title_key: &str, hint_key: Option<&str>, error: bool) -> String {
        let message = Message {
            class: class.to_string(),
            title: self.i18n.get(title_key),
            hint: hint_key.map(|key| self.i18n.get(key)),
            error,
        };
        self.templates.message(&message).unwrap_or_else(|e| {
            tracing::error!("Failed to render message `{}`: {}", title_key, e);
            message.title
        })
    }
}

/// Site-relative path of the manifest
pub fn manifest_path(config: &SiteConfig) -> String {
    format!("/{}/index.json", config.posts_dir.trim_matches('/'))
}

/// Site-relative path of a post source file
pub fn post_source_path(config: &SiteConfig, filename: &str) -> String {
    format!("/{}/{}", config.posts_dir.trim_matches('/'), filename)
}

/// Fetch the manifest; a missing or malformed manifest means no posts
pub async fn fetch_manifest<F>(config: &SiteConfig, fetcher: &F) -> Result<Manifest, FetchError>
where
    F: Fetcher + ?Sized,
{
    let path = manifest_path(config);
    let Some(json) = fetcher.fetch(&path).await? else {
        tracing::info!("No posts index found at {}", path);
        return Ok(Manifest::default());
    };

    Ok(Manifest::from_json(&json).unwrap_or_else(|e| {
        tracing::warn!("Ignoring malformed posts index {}: {}", path, e);
        Manifest::default()
    }))
}

/// Fetch and parse a post source file
pub async fn fetch_post<F>(
    config: &SiteConfig,
    fetcher: &F,
    filename: &str,
) -> Result<Option<Post>, FetchError>
where
    F: Fetcher + ?Sized,
{
    let raw = fetcher.fetch(&post_source_path(config, filename)).await?;
    Ok(raw.map(|raw| Post::parse(filename, &raw)))
}

/// Fetch several posts concurrently, dropping failures
pub async fn fetch_posts<F, I>(config: &SiteConfig, fetcher: &F, filenames: I) -> Vec<Post>
where
    F: Fetcher + ?Sized,
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let names: Vec<String> = filenames
        .into_iter()
        .map(|name| name.as_ref().to_string())
        .collect();

    let results = futures::future::join_all(
        names
            .iter()
            .map(|name| fetch_post(config, fetcher, name)),
    )
    .await;

    names
        .iter()
        .zip(results)
        .filter_map(|(name, result)| match result {
            Ok(Some(post)) => Some(post),
            Ok(None) => {
                tracing::warn!("Post {} listed in the index was not found", name);
                None
            }
            Err(e) => {
                tracing::error!("Error loading post {}: {}", name, e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    /// In-memory fetcher that records every request
    #[derive(Default)]
    pub struct MemoryFetcher {
        files: HashMap<String, String>,
        broken: HashSet<String>,
        requests: Mutex<Vec<String>>,
    }

    impl MemoryFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_file(mut self, path: &str, content: &str) -> Self {
            self.files.insert(path.to_string(), content.to_string());
            self
        }

        /// Requests for `path` fail with a transport error
        pub fn with_broken(mut self, path: &str) -> Self {
            self.broken.insert(path.to_string());
            self
        }

        pub fn with_manifest(self, files: &[&str]) -> Self {
            let json = serde_json::to_string(files).unwrap();
            self.with_file("/blogs/posts/index.json", &json)
        }

        pub fn with_post(self, filename: &str, content: &str) -> Self {
            self.with_file(&format!("/blogs/posts/{}", filename), content)
        }

        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetcher for MemoryFetcher {
        async fn fetch(&self, path: &str) -> Result<Option<String>, FetchError> {
            self.requests.lock().unwrap().push(path.to_string());
            if self.broken.contains(path) {
                return Err(FetchError::Transport(format!("connection reset: {}", path)));
            }
            Ok(self.files.get(path).cloned())
        }
    }

    pub fn context() -> ClientContext {
        ClientContext::new(SiteConfig::default(), I18n::default()).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::testing::MemoryFetcher;
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_fs_fetcher() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("blogs/posts")).unwrap();
        std::fs::write(dir.path().join("blogs/posts/index.json"), "[]").unwrap();

        let fetcher = FsFetcher::new(dir.path());
        assert_eq!(
            fetcher.fetch("/blogs/posts/index.json").await.unwrap().as_deref(),
            Some("[]")
        );
        assert!(fetcher.fetch("/blogs/posts/missing.md").await.unwrap().is_none());
        assert!(fetcher.fetch("/blogs/../../etc/passwd").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fetch_manifest_lenient() {
        let config = SiteConfig::default();

        let missing = MemoryFetcher::new();
        assert!(fetch_manifest(&config, &missing).await.unwrap().is_empty());

        let malformed = MemoryFetcher::new().with_file("/blogs/posts/index.json", "{oops");
        assert!(fetch_manifest(&config, &malformed).await.unwrap().is_empty());

        let broken = MemoryFetcher::new().with_broken("/blogs/posts/index.json");
        assert!(fetch_manifest(&config, &broken).await.is_err());
    }

    #[tokio::test]
    async fn test_fetch_posts_drops_failures() {
        let config = SiteConfig::default();
        let fetcher = MemoryFetcher::new()
            .with_post("2025-01-01-a.md", "---\ntitle: A\n---\n")
            .with_broken("/blogs/posts/2025-01-02-b.md");

        let posts = fetch_posts(
            &config,
            &fetcher,
            ["2025-01-01-a.md", "2025-01-02-b.md", "2025-01-03-c.md"],
        )
        .await;

        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].slug, "a");
        assert_eq!(fetcher.requests().len(), 3);
    }
}
