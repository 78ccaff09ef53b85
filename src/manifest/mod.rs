//! Post manifest (`index.json`)
//!
//! The manifest lists post filenames newest first, so readers never need a
//! directory listing. Filenames carry a `YYYY-MM-DD-` prefix, which makes a
//! reversed lexicographic sort a date sort.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::content::slug::{is_markdown_file, is_url_safe, slug_from_filename};
use crate::error::BuildError;

/// Ordered list of post filenames, newest first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    files: Vec<String>,
}

impl Manifest {
    /// Order filenames newest first
    pub fn from_filenames<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut files: Vec<String> = names.into_iter().map(Into::into).collect();
        files.sort();
        files.reverse();
        Self { files }
    }

    /// List `.md` files in `dir`
    pub fn scan<P: AsRef<Path>>(dir: P) -> Result<Self, BuildError> {
        let dir = dir.as_ref();
        let mut names = Vec::new();
        // Top level only; subdirectories are not posts
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
            let entry = entry.map_err(|e| BuildError::ReadPosts {
                path: dir.to_path_buf(),
                source: e.into(),
            })?;
            let path = entry.path();
            if !path.is_file() || !is_markdown_file(path) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }

        let manifest = Self::from_filenames(names);
        manifest.check_slugs()?;
        Ok(manifest)
    }

    /// Slugs must be unique; unsafe slugs are reported but kept
    fn check_slugs(&self) -> Result<(), BuildError> {
        let mut seen: HashMap<String, &str> = HashMap::new();
        for file in &self.files {
            let slug = slug_from_filename(file);
            if !is_url_safe(&slug) {
                tracing::warn!("Slug `{}` from {} is not URL-safe", slug, file);
            }
            if let Some(first) = seen.insert(slug.clone(), file) {
                return Err(BuildError::DuplicateSlug {
                    slug,
                    first: first.to_string(),
                    second: file.clone(),
                });
            }
        }
        Ok(())
    }

    /// Read a manifest; missing or malformed files count as "no posts"
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(content) => Self::from_json(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed manifest {:?}: {}", path, e);
                Self::default()
            }),
            Err(e) => {
                tracing::warn!("Could not read manifest {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Pretty JSON with a trailing newline
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)? + "\n")
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)
            .with_context(|| format!("Failed to write manifest {:?}", path))
    }

    /// Filename whose slug is exactly `slug`
    pub fn find_by_slug(&self, slug: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|f| slug_from_filename(f) == slug)
            .map(String::as_str)
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_newest_first() {
        let manifest = Manifest::from_filenames(["2024-01-01-a.md", "2024-03-01-b.md"]);
        assert_eq!(manifest.files(), ["2024-03-01-b.md", "2024-01-01-a.md"]);
    }

    #[test]
    fn test_scan_filters_markdown() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("2024-01-01-a.md"), "a").unwrap();
        fs::write(dir.path().join("2024-03-01-b.md"), "b").unwrap();
        fs::write(dir.path().join("index.json"), "[]").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::create_dir(dir.path().join("drafts.md")).unwrap();

        let manifest = Manifest::scan(dir.path()).unwrap();
        assert_eq!(manifest.files(), ["2024-03-01-b.md", "2024-01-01-a.md"]);
    }

    #[test]
    fn test_scan_missing_dir_fails() {
        let dir = TempDir::new().unwrap();
        let err = Manifest::scan(dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, BuildError::ReadPosts { .. }));
    }

    #[test]
    fn test_duplicate_slug_fails() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("2024-01-01-same.md"), "").unwrap();
        fs::write(dir.path().join("2024-02-01-same.md"), "").unwrap();

        let err = Manifest::scan(dir.path()).unwrap_err();
        match err {
            BuildError::DuplicateSlug { slug, .. } => assert_eq!(slug, "same"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_write_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.json");
        let manifest = Manifest::from_filenames(["2024-01-01-a.md"]);
        manifest.write(&path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "[\n  \"2024-01-01-a.md\"\n]\n");
        assert_eq!(Manifest::load(&path), manifest);
    }

    #[test]
    fn test_load_lenient() {
        let dir = TempDir::new().unwrap();
        assert!(Manifest::load(dir.path().join("missing.json")).is_empty());

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{not json").unwrap();
        assert!(Manifest::load(&bad).is_empty());
    }

    #[test]
    fn test_find_by_slug_is_exact() {
        let manifest = Manifest::from_filenames(["2025-05-01-my-post.md", "2025-04-01-my-post-2.md"]);
        assert_eq!(manifest.find_by_slug("my-post"), Some("2025-05-01-my-post.md"));
        assert_eq!(manifest.find_by_slug("post"), None);
    }
}
