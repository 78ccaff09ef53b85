//! CLI commands

pub mod build;
pub mod index;
pub mod list;
pub mod new;
pub mod posts;
pub mod sitemap;
