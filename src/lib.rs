//! wikiblog: a markdown-backed blog with WikiLink cross-references
//!
//! Posts are markdown files with YAML front-matter. `[[Some Title]]` in a
//! post links to the post whose slug is `slugify("Some Title")`, and the link
//! validator marks each such link as valid or broken.

pub mod cache;
pub mod clock;
pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod server;
pub mod validator;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cache::RenderCache;
use crate::clock::{Clock, SystemClock};
use crate::content::{FsSource, MarkdownRenderer, PostSource, PostStore};

/// The main blog application
#[derive(Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Markdown posts directory
    pub posts_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Images served under `/images`
    pub images_dir: PathBuf,
    /// Post store shared by every consumer
    pub store: Arc<PostStore>,
    /// Markdown renderer shared by every consumer
    pub renderer: Arc<MarkdownRenderer>,
}

impl Blog {
    /// Create a new blog instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_clock(base_dir, config, Arc::new(SystemClock)))
    }

    /// Create from an explicit configuration and clock
    pub fn with_clock(base_dir: PathBuf, config: config::SiteConfig, clock: Arc<dyn Clock>) -> Self {
        let source = FsSource::new(base_dir.join(&config.posts_dir));
        Self::with_source(base_dir, config, source, clock)
    }

    /// Create over an arbitrary post source
    pub fn with_source<S>(
        base_dir: PathBuf,
        config: config::SiteConfig,
        source: S,
        clock: Arc<dyn Clock>,
    ) -> Self
    where
        S: PostSource + 'static,
    {
        let posts_dir = base_dir.join(&config.posts_dir);
        let public_dir = base_dir.join(&config.public_dir);
        let images_dir = base_dir.join(&config.images_dir);

        let store = PostStore::new(source, Arc::clone(&clock), config.cache.index_ttl());
        let cache = RenderCache::new(clock, config.cache.render_ttl(), config.cache.render_capacity);
        let renderer = MarkdownRenderer::with_options(cache, config.slug_style);

        Self {
            config,
            base_dir,
            posts_dir,
            public_dir,
            images_dir,
            store: Arc::new(store),
            renderer: Arc::new(renderer),
        }
    }

    /// Generate the static post pages
    pub async fn generate(&self) -> Result<generator::GenerateReport> {
        commands::generate::run(self).await
    }

    /// Clean the generated pages
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }

    /// Check every post for broken WikiLinks
    pub async fn check(&self, remote: Option<&str>) -> Result<()> {
        commands::check::run(self, remote).await
    }
}
