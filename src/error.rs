//! Error types

use std::path::PathBuf;

use crate::content::LoadError;

/// Build-time failures that halt the build
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("cannot read posts directory {path:?}: {source}")]
    ReadPosts {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("duplicate slug `{slug}` in {first} and {second}")]
    DuplicateSlug {
        slug: String,
        first: String,
        second: String,
    },
}

/// Failures while fetching a resource from the site
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("transport error: {0}")]
    Transport(String),
}

/// Failures while rendering a single post
#[derive(Debug, thiserror::Error)]
pub enum PostError {
    #[error("no slug in request")]
    MissingSlug,

    #[error("post `{0}` not found")]
    NotFound(String),

    #[error("failed to fetch `{path}`: {source}")]
    Fetch {
        path: String,
        #[source]
        source: FetchError,
    },

    #[error(transparent)]
    Module(#[from] LoadError),
}

impl PostError {
    /// Whether the reader should see "not found" rather than a generic error
    pub fn is_not_found(&self) -> bool {
        matches!(self, PostError::MissingSlug | PostError::NotFound(_))
    }
}
