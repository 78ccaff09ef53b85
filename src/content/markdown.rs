//! Markdown to HTML for post bodies
//!
//! GitHub-flavoured markdown with anchor ids on headings and syntect
//! highlighting for code blocks. Ids are slugified heading text, with `-1`,
//! `-2`, ... appended to repeats so in-page links stay stable.

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use std::collections::HashMap;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::config::HighlightConfig;
use crate::helpers::html_escape;

fn markdown_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES
        | Options::ENABLE_GFM
}

/// Code block highlighter
struct Highlighter {
    syntaxes: SyntaxSet,
    theme: Option<Theme>,
    line_numbers: bool,
}

impl Highlighter {
    fn new(config: &HighlightConfig) -> Self {
        let mut themes = ThemeSet::load_defaults().themes;
        let theme = match themes.remove(&config.theme) {
            Some(theme) => Some(theme),
            None => {
                tracing::warn!("Unknown highlight theme `{}`, using a default", config.theme);
                themes.into_values().next()
            }
        };

        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            theme,
            line_numbers: config.line_number,
        }
    }

    fn highlight(&self, code: &str, lang: &str) -> String {
        let syntax = self
            .syntaxes
            .find_syntax_by_token(lang)
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text());

        let Some(html) = self
            .theme
            .as_ref()
            .and_then(|theme| highlighted_html_for_string(code, &self.syntaxes, syntax, theme).ok())
        else {
            return format!(
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                html_escape(lang),
                html_escape(code)
            );
        };

        if !self.line_numbers {
            return format!(r#"<div class="code-block language-{}">{}</div>"#, html_escape(lang), html);
        }

        let count = code.lines().count().max(1);
        let gutter = (1..=count).map(|n| n.to_string()).collect::<Vec<_>>().join("\n");
        format!(
            r#"<div class="code-block language-{}"><pre class="line-numbers">{}</pre>{}</div>"#,
            html_escape(lang),
            gutter,
            html
        )
    }
}

/// Unique heading ids within one document
#[derive(Default)]
struct HeadingIds {
    seen: HashMap<String, usize>,
}

impl HeadingIds {
    fn next(&mut self, text: &str) -> String {
        let base = slug::slugify(text);
        let base = if base.is_empty() { "section".to_string() } else { base };
        let count = self.seen.entry(base.clone()).or_insert(0);
        let id = if *count == 0 {
            base
        } else {
            format!("{}-{}", base, count)
        };
        *count += 1;
        id
    }
}

/// Renders post bodies
pub struct MarkdownRenderer {
    highlighter: Highlighter,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self::with_options(&HighlightConfig::default())
    }

    pub fn with_options(highlight: &HighlightConfig) -> Self {
        Self {
            highlighter: Highlighter::new(highlight),
        }
    }

    /// Render a markdown body to HTML
    pub fn render(&self, markdown: &str) -> String {
        let mut events: Vec<Event> = Vec::new();
        let mut ids = HeadingIds::default();

        // Open code block: language and collected text
        let mut code: Option<(String, String)> = None;
        // Open heading: start tag, inner events and plain text
        let mut heading: Option<(Tag, Vec<Event>, String)> = None;

        for event in Parser::new_ext(markdown, markdown_options()) {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => {
                            info.split_whitespace().next().unwrap_or("").to_string()
                        }
                        CodeBlockKind::Indented => String::new(),
                    };
                    code = Some((lang, String::new()));
                }
                Event::Text(text) if code.is_some() => {
                    if let Some((_, buf)) = code.as_mut() {
                        buf.push_str(&text);
                    }
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, buf)) = code.take() {
                        let lang = if lang.is_empty() { "text" } else { lang.as_str() };
                        let block = self.highlighter.highlight(&buf, lang);
                        events.push(Event::Html(CowStr::from(block)));
                    }
                }
                Event::Start(tag @ Tag::Heading { .. }) => {
                    heading = Some((tag, Vec::new(), String::new()));
                }
                Event::End(TagEnd::Heading(level)) => {
                    if let Some((tag, inner, text)) = heading.take() {
                        let tag = match tag {
                            Tag::Heading { level, id: None, classes, attrs } => Tag::Heading {
                                level,
                                id: Some(CowStr::from(ids.next(&text))),
                                classes,
                                attrs,
                            },
                            other => other,
                        };
                        events.push(Event::Start(tag));
                        events.extend(inner);
                    }
                    events.push(Event::End(TagEnd::Heading(level)));
                }
                event => match heading.as_mut() {
                    Some((_, inner, text)) => {
                        if let Event::Text(t) | Event::Code(t) = &event {
                            text.push_str(t);
                        }
                        inner.push(event);
                    }
                    None if code.is_none() => events.push(event),
                    None => {}
                },
            }
        }

        let mut output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut output, events.into_iter());
        output
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraphs_and_emphasis() {
        let html = MarkdownRenderer::new().render("Some **bold** and ~~old~~ text.");
        assert!(html.contains("<p>Some <strong>bold</strong> and <del>old</del> text.</p>"));
    }

    #[test]
    fn test_heading_ids() {
        let html = MarkdownRenderer::new().render("## Why SEO Matters\n\n## Why SEO Matters\n\n# `Code` title");
        assert!(html.contains(r#"<h2 id="why-seo-matters">Why SEO Matters</h2>"#));
        assert!(html.contains(r#"<h2 id="why-seo-matters-1">Why SEO Matters</h2>"#));
        assert!(html.contains(r#"<h1 id="code-title"><code>Code</code> title</h1>"#));
    }

    #[test]
    fn test_explicit_heading_id_is_kept() {
        let html = MarkdownRenderer::new().render("## Pricing {#plans}");
        assert!(html.contains(r#"<h2 id="plans">Pricing</h2>"#));
    }

    #[test]
    fn test_fenced_code_is_highlighted() {
        let html = MarkdownRenderer::new().render("```rust\nfn main() {}\n```");
        assert!(html.contains(r#"class="code-block language-rust""#));
        assert!(!html.contains("```"));
    }

    #[test]
    fn test_indented_code_is_not_leaked_as_text() {
        let html = MarkdownRenderer::new().render("Intro\n\n    let x = 1;\n");
        assert!(html.contains("language-text"));
        assert!(html.contains("<p>Intro</p>"));
        assert!(!html.contains("<p>let x"));
    }

    #[test]
    fn test_line_numbers() {
        let config = HighlightConfig {
            line_number: true,
            ..Default::default()
        };
        let html = MarkdownRenderer::with_options(&config).render("```\na\nb\n```");
        assert!(html.contains("<pre class=\"line-numbers\">1\n2</pre>"));
    }

    #[test]
    fn test_tables_and_task_lists() {
        let html = MarkdownRenderer::new().render("| a | b |\n|---|---|\n| 1 | 2 |\n\n- [x] done\n");
        assert!(html.contains("<table>"));
        assert!(html.contains(r#"type="checkbox""#));
    }
}
