//! Create a new post

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::content::slug::post_filename;
use crate::Site;

/// Write a dated post scaffold and return its path
pub fn run(site: &Site, title: &str, category: Option<&str>) -> Result<PathBuf> {
    let today = chrono::Local::now().date_naive();
    let filename = post_filename(today, title);
    if filename.ends_with("-.md") {
        anyhow::bail!("Title {:?} does not produce a usable slug", title);
    }

    fs::create_dir_all(&site.posts_dir)
        .with_context(|| format!("Failed to create {:?}", site.posts_dir))?;
    let file_path = site.posts_dir.join(&filename);
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let content = format!(
        r#"---
title: "{title}"
date: {date}
author: {author}
category: {category}
excerpt: ""
featured_image: ""
tags: []
---

"#,
        title = title.replace('"', "'"),
        date = today.format("%Y-%m-%d"),
        author = site.config.default_author,
        category = category.unwrap_or(""),
    );

    fs::write(&file_path, content).with_context(|| format!("Failed to write {:?}", file_path))?;
    println!("Created: {:?}", file_path);

    Ok(file_path)
}
