//! Lazily loaded modules
//!
//! Expensive optional capabilities (the markdown renderer loads syntax and
//! theme sets) are built on first use. Callers await `ensure_loaded` and
//! concurrent callers share a single load.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;

use super::MarkdownRenderer;
use crate::config::HighlightConfig;

/// Error raised when a module loader panics or is cancelled
#[derive(Debug, thiserror::Error)]
#[error("failed to load module `{name}`: {source}")]
pub struct LoadError {
    pub name: &'static str,
    #[source]
    pub source: tokio::task::JoinError,
}

type Loader<T> = Arc<dyn Fn() -> T + Send + Sync>;

/// A capability that is constructed on a blocking task the first time it is needed
pub struct LazyModule<T> {
    name: &'static str,
    cell: OnceCell<T>,
    loader: Loader<T>,
    loads: AtomicUsize,
}

impl<T: Send + Sync + 'static> LazyModule<T> {
    pub fn new<F>(name: &'static str, loader: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            name,
            cell: OnceCell::new(),
            loader: Arc::new(loader),
            loads: AtomicUsize::new(0),
        }
    }

    /// Build the module if it is not loaded yet and return it
    pub async fn ensure_loaded(&self) -> Result<&T, LoadError> {
        self.cell
            .get_or_try_init(|| async {
                let loader = Arc::clone(&self.loader);
                self.loads.fetch_add(1, Ordering::SeqCst);
                tracing::debug!("Loading module `{}`", self.name);
                tokio::task::spawn_blocking(move || loader())
                    .await
                    .map_err(|source| LoadError {
                        name: self.name,
                        source,
                    })
            })
            .await
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }

    /// How many times the loader has been started
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

/// The markdown-to-HTML converter, loaded on demand
pub fn markdown_module(highlight: HighlightConfig) -> LazyModule<MarkdownRenderer> {
    LazyModule::new("markdown", move || MarkdownRenderer::with_options(&highlight))
}
