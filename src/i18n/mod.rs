//! Internationalization (i18n) support
//!
//! Reader-facing strings come from `languages/<lang>.yml`. Keys missing from
//! the active language fall back to that language's English file, then to
//! the built-in English strings.

use anyhow::Result;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Built-in English strings
const DEFAULTS: &[(&str, &str)] = &[
    ("empty", "No blog posts yet"),
    ("empty_hint", "Check back soon for updates!"),
    ("no_results", "No blog posts found"),
    ("no_results_hint", "Try adjusting your filters or search terms"),
    ("grid_error", "Error loading blog posts"),
    ("load_error", "Error loading blog post"),
    ("error_hint", "Please try again later"),
    ("not_found", "Post not found"),
    ("read_more", "Read More"),
    ("learn_more", "Learn More"),
    ("share", "Share:"),
    ("tags", "Tags:"),
    ("by", "By"),
    ("home", "Home"),
    ("blog", "Blog"),
    ("related_services", "Related Services"),
    ("related_posts", "More from Our Blog"),
    ("view_all", "View All Blog Posts"),
    ("featured_image_for", "Featured image for"),
];

/// Internationalization handler
#[derive(Debug, Clone)]
pub struct I18n {
    /// Current language
    language: String,
    /// Language data: lang -> key -> translation
    translations: HashMap<String, HashMap<String, serde_yaml::Value>>,
}

impl I18n {
    /// Create a new i18n handler
    pub fn new(language: &str) -> Self {
        Self {
            language: language.to_string(),
            translations: HashMap::new(),
        }
    }

    /// Handler for `language` with every file in `dir` loaded; a missing
    /// directory leaves only the built-in strings
    pub fn load<P: AsRef<Path>>(language: &str, dir: P) -> Result<Self> {
        let mut i18n = Self::new(language);
        i18n.load_languages(dir)?;
        Ok(i18n)
    }

    /// Load language files from a directory
    pub fn load_languages<P: AsRef<Path>>(&mut self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        if !dir.exists() {
            return Ok(());
        }

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let ext = path.extension().and_then(|e| e.to_str());
            if !path.is_file() || !matches!(ext, Some("yml") | Some("yaml")) {
                continue;
            }

            let Some(lang) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let content = fs::read_to_string(&path)?;

            match serde_yaml::from_str::<HashMap<String, serde_yaml::Value>>(&content) {
                Ok(data) => {
                    self.translations.insert(lang.to_string(), data);
                    tracing::debug!("Loaded language file: {:?}", path);
                }
                Err(e) => tracing::warn!("Failed to parse language file {:?}: {}", path, e),
            }
        }

        Ok(())
    }

    /// Get the current language
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Get a translation by key; nested keys use dots (`grid.empty`)
    pub fn get(&self, key: &str) -> String {
        self.get_for_lang(&self.language, key)
    }

    /// Get a translation for a specific language
    pub fn get_for_lang(&self, lang: &str, key: &str) -> String {
        for candidate in [lang, "en"] {
            if let Some(value) = self
                .translations
                .get(candidate)
                .and_then(|data| get_nested_value(data, key))
            {
                return yaml_value_to_string(value);
            }
        }

        DEFAULTS
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
            .unwrap_or_else(|| key.to_string())
    }
}

/// Get a nested value from a YAML map using dot notation
fn get_nested_value<'a>(
    data: &'a HashMap<String, serde_yaml::Value>,
    key: &str,
) -> Option<&'a serde_yaml::Value> {
    let mut parts = key.split('.');
    let mut current = data.get(parts.next()?);

    for part in parts {
        match current {
            Some(serde_yaml::Value::Mapping(map)) => {
                current = map.get(serde_yaml::Value::String(part.to_string()));
            }
            _ => return None,
        }
    }

    current
}

/// Convert a YAML value to a string
fn yaml_value_to_string(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Null => String::new(),
        _ => format!("{:?}", value),
    }
}

impl Default for I18n {
    fn default() -> Self {
        Self::new("en")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_defaults() {
        let i18n = I18n::default();
        assert_eq!(i18n.get("not_found"), "Post not found");
        assert_eq!(i18n.get("empty"), "No blog posts yet");
        assert_eq!(i18n.get("unknown"), "unknown");
    }

    #[test]
    fn test_language_file_overrides() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("es.yml"),
            "not_found: Artículo no encontrado\ngrid:\n  title: Blog\n",
        )
        .unwrap();
        fs::write(dir.path().join("en.yml"), "share: \"Share this:\"\n").unwrap();
        fs::write(dir.path().join("broken.yml"), "a: [unclosed").unwrap();

        let i18n = I18n::load("es", dir.path()).unwrap();
        assert_eq!(i18n.language(), "es");
        assert_eq!(i18n.get("not_found"), "Artículo no encontrado");
        assert_eq!(i18n.get("grid.title"), "Blog");
        // Falls back to English file, then built-in strings
        assert_eq!(i18n.get("share"), "Share this:");
        assert_eq!(i18n.get("load_error"), "Error loading blog post");
    }

    #[test]
    fn test_missing_dir_is_ok() {
        let dir = TempDir::new().unwrap();
        let i18n = I18n::load("en", dir.path().join("languages")).unwrap();
        assert_eq!(i18n.get("no_results"), "No blog posts found");
    }
}
