//! CLI entry point for wikiblog

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "wikiblog")]
#[command(version)]
#[command(about = "A markdown blog with WikiLink cross-references", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
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
    /// Start the blog server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,
    },

    /// Generate static post pages
    #[command(alias = "g")]
    Generate,

    /// Check every post for broken WikiLinks
    Check {
        /// Check against a running server instead of the local posts
        #[arg(long)]
        remote: Option<String>,
    },

    /// Remove generated post pages
    Clean,

    /// List site information
    List {
        /// Type of content to list (post, tag)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "wikiblog=debug,info"
    } else {
        "wikiblog=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Cannot determine current directory")?,
    };

    match cli.command {
        Commands::Serve { port, ip } => {
            let blog = wikiblog::Blog::new(&base_dir)?;
            tracing::info!("Serving posts from {:?}", blog.posts_dir);
            wikiblog::server::start(blog, &ip, port).await?;
        }

        Commands::Generate => {
            let blog = wikiblog::Blog::new(&base_dir)?;
            tracing::info!("Generating static files...");
            let report = blog.generate().await?;
            println!("Generated {} pages.", report.pages);
        }

        Commands::Check { remote } => {
            let blog = wikiblog::Blog::new(&base_dir)?;
            blog.check(remote.as_deref()).await?;
        }

        Commands::Clean => {
            let blog = wikiblog::Blog::new(&base_dir)?;
            tracing::info!("Cleaning generated pages...");
            blog.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List { r#type } => {
            let blog = wikiblog::Blog::new(&base_dir)?;
            wikiblog::commands::list::run(&blog, &r#type)?;
        }

        Commands::Version => {
            println!("wikiblog version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
