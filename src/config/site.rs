//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::content::SlugStyle;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub url: String,

    // Directory
    pub posts_dir: String,
    pub public_dir: String,
    pub images_dir: String,

    // Writing
    pub slug_style: SlugStyle,

    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub validator: ValidatorConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Notes".to_string(),
            description: String::new(),
            author: String::new(),
            url: "http://localhost:3000".to_string(),

            posts_dir: "notes".to_string(),
            public_dir: "public".to_string(),
            images_dir: "public/images".to_string(),

            slug_style: SlugStyle::Hangul,

            cache: CacheConfig::default(),
            validator: ValidatorConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

/// Cache lifetimes and sizes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub index_ttl_secs: u64,
    pub render_ttl_secs: u64,
    pub render_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            index_ttl_secs: 60,
            render_ttl_secs: 300,
            render_capacity: 100,
        }
    }
}

impl CacheConfig {
    pub fn index_ttl(&self) -> Duration {
        Duration::from_secs(self.index_ttl_secs)
    }

    pub fn render_ttl(&self) -> Duration {
        Duration::from_secs(self.render_ttl_secs)
    }
}

/// WikiLink validator tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    pub batch_size: usize,
    pub debounce_ms: u64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            debounce_ms: 100,
        }
    }
}

impl ValidatorConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// `s-maxage` for existence responses, in seconds
    pub exists_max_age: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { exists_max_age: 60 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.posts_dir, "notes");
        assert_eq!(config.cache.index_ttl(), Duration::from_secs(60));
        assert_eq!(config.cache.render_ttl(), Duration::from_secs(300));
        assert_eq!(config.cache.render_capacity, 100);
        assert_eq!(config.validator.batch_size, 10);
        assert_eq!(config.slug_style, SlugStyle::Hangul);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Notes
posts_dir: content
slug_style: ascii
cache:
  index_ttl_secs: 5
validator:
  batch_size: 3
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Notes");
        assert_eq!(config.posts_dir, "content");
        assert_eq!(config.slug_style, SlugStyle::Ascii);
        assert_eq!(config.cache.index_ttl_secs, 5);
        assert_eq!(config.cache.render_capacity, 100);
        assert_eq!(config.validator.batch_size, 3);
        assert_eq!(config.validator.debounce_ms, 100);
    }
}
