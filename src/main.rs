//! CLI entry point for brandible-blog

use anyhow::{Context, Result};
use brandible_blog::{commands, server, Site};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "brandible-blog")]
#[command(version)]
#[command(about = "Blog content pipeline for the Brandible marketing site", long_about = None)]
struct Cli {
    /// Set the site root (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild blogs/posts/index.json from the markdown sources
    Index,

    /// Generate a static page per post from the post template
    Posts,

    /// Regenerate sitemap.xml
    Sitemap,

    /// Run index, posts and sitemap in order
    #[command(alias = "b")]
    Build {
        /// Rebuild on file changes
        #[arg(short, long)]
        watch: bool,
    },

    /// List posts, tags or categories
    List {
        /// What to list (post, tag, category)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Create a new dated post
    New {
        /// Title of the new post
        title: String,

        /// Category written into the frontmatter
        #[arg(short = 'C', long)]
        category: Option<String>,
    },

    /// Start a local server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,

        /// Enable static mode (no file watching)
        #[arg(long)]
        r#static: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        "brandible_blog=debug,info"
    } else {
        "brandible_blog=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to read current directory")?,
    };
    // Watch events carry absolute paths
    let base_dir = base_dir
        .canonicalize()
        .with_context(|| format!("Site root not found: {}", base_dir.display()))?;
    let site = Site::new(&base_dir)?;

    match cli.command {
        Commands::Index => {
            let manifest = commands::index::run(&site)?;
            println!("Indexed {} posts", manifest.len());
        }

        Commands::Posts => {
            let report = commands::posts::run(&site)?;
            println!(
                "Generated {} pages ({} skipped, {} failed)",
                report.generated, report.skipped, report.failed
            );
        }

        Commands::Sitemap => {
            let sitemap = commands::sitemap::run(&site)?;
            println!("Wrote {} URLs to {}", sitemap.len(), site.sitemap_path.display());
        }

        Commands::Build { watch } => {
            if watch {
                commands::build::watch(&site).await?;
            } else {
                site.build()?;
                println!("Built successfully!");
            }
        }

        Commands::List { r#type } => {
            commands::list::run(&site, &r#type)?;
        }

        Commands::New { title, category } => {
            let path = commands::new::run(&site, &title, category.as_deref())?;
            println!("Created: {}", path.display());
        }

        Commands::Server {
            port,
            ip,
            open,
            r#static,
        } => {
            tracing::info!("Building site...");
            site.build()?;

            server::start(&site, &ip, port, !r#static, open).await?;
        }
    }

    Ok(())
}
