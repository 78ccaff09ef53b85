//! Content module - front-matter, posts, slugs and markdown rendering

mod frontmatter;
pub mod lazy;
mod markdown;
mod post;
pub mod slug;

pub use frontmatter::{FrontMatter, FrontValue};
pub use lazy::{markdown_module, LazyModule, LoadError};
pub use markdown::MarkdownRenderer;
pub use post::{cmp_newest_first, parse_date_string, Post};
