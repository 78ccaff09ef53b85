//! List site content

use anyhow::Result;
use indexmap::IndexMap;
use std::fs;

use crate::content::{cmp_newest_first, Post};
use crate::manifest::Manifest;
use crate::Site;

/// Read and parse every post in the posts directory, newest first
pub fn load_posts(site: &Site) -> Result<Vec<Post>> {
    let manifest = Manifest::scan(&site.posts_dir)?;
    let mut posts = Vec::with_capacity(manifest.len());

    for filename in manifest.files() {
        let path = site.posts_dir.join(filename);
        match fs::read_to_string(&path) {
            Ok(raw) => posts.push(Post::parse(filename, &raw)),
            Err(e) => tracing::warn!("Failed to read {:?}: {}", path, e),
        }
    }

    posts.sort_by(cmp_newest_first);
    Ok(posts)
}

/// Count occurrences, most frequent first
fn tally<'a>(names: impl Iterator<Item = &'a str>) -> Vec<(&'a str, usize)> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for name in names {
        *counts.entry(name).or_insert(0) += 1;
    }
    let mut counts: Vec<_> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// List site content by type
pub fn run(site: &Site, content_type: &str) -> Result<()> {
    let posts = load_posts(site)?;

    match content_type {
        "post" | "posts" => {
            println!("Posts ({}):", posts.len());
            for post in &posts {
                println!(
                    "  {} - {} [{}]",
                    post.published()
                        .map(|d| d.format("%Y-%m-%d").to_string())
                        .unwrap_or_else(|| "----------".to_string()),
                    post.display_title(),
                    post.filename
                );
            }
        }
        "tag" | "tags" => {
            let tags = tally(posts.iter().flat_map(|p| p.tags.iter().map(String::as_str)));
            println!("Tags ({}):", tags.len());
            for (tag, count) in tags {
                println!("  {} ({})", tag, count);
            }
        }
        "category" | "categories" => {
            let categories = tally(posts.iter().filter_map(|p| p.category.as_deref()));
            println!("Categories ({}):", categories.len());
            for (category, count) in categories {
                println!("  {} ({})", category, count);
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, tag, category",
                content_type
            );
        }
    }

    Ok(())
}
