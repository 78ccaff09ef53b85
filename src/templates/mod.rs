//! Built-in blog templates using Tera template engine
//!
//! Card, grid, article and message fragments are embedded directly in the
//! binary. Autoescaping is off; templates escape text with the `esc` filter
//! so URLs and pre-rendered HTML pass through untouched.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::helpers::{html_escape, truncate};

/// Template renderer with the embedded blog templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all blog templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("blog/layout.html", include_str!("blog/layout.html")),
            ("blog/card.html", include_str!("blog/card.html")),
            ("blog/grid.html", include_str!("blog/grid.html")),
            ("blog/article.html", include_str!("blog/article.html")),
            ("blog/related.html", include_str!("blog/related.html")),
            ("blog/message.html", include_str!("blog/message.html")),
        ])?;

        tera.register_filter("esc", esc_filter);
        tera.register_filter("truncate_chars", truncate_chars_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }

    /// Render a user-facing message block
    pub fn message(&self, message: &Message) -> Result<String> {
        self.render("blog/message.html", &Context::from_serialize(message)?)
    }
}

/// A message shown in place of content (empty state, errors)
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    /// Extra CSS class on the wrapper
    pub class: String,
    pub title: String,
    pub hint: Option<String>,
    pub error: bool,
}

/// Tera filter: HTML-escape a value
fn esc_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = match value {
        tera::Value::String(s) => s.clone(),
        tera::Value::Null => String::new(),
        other => other.to_string(),
    };
    Ok(tera::Value::String(html_escape(&s)))
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "...".to_string(),
    };

    Ok(tera::Value::String(truncate(&s, length, Some(&omission))))
}
