//! Post store - loads posts from the posts directory and caches the index

use chrono::SecondsFormat;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::slug::{filename_for_slug, is_safe_slug, slug_from_filename};
use super::source::{FsSource, PostSource};
use super::{FrontMatter, Post, PostMetadata, TagCount};
use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};

/// Default lifetime of the metadata index
pub const DEFAULT_INDEX_TTL: Duration = Duration::from_secs(60);

/// The metadata index as of its last rebuild
struct CachedIndex {
    posts: Arc<[PostMetadata]>,
    built_at: Instant,
}

/// Reads posts on demand and keeps a time-bounded index of their metadata.
///
/// Every disk failure stops here: lookups come back as `None` and listings
/// as empty, with the cause logged.
pub struct PostStore {
    source: Box<dyn PostSource>,
    clock: Arc<dyn Clock>,
    index_ttl: Duration,
    index: RwLock<Option<CachedIndex>>,
}

impl PostStore {
    /// Create a store over any post source
    pub fn new<S>(source: S, clock: Arc<dyn Clock>, index_ttl: Duration) -> Self
    where
        S: PostSource + 'static,
    {
        Self {
            source: Box::new(source),
            clock,
            index_ttl,
            index: RwLock::new(None),
        }
    }

    /// Create a store over a directory with the system clock
    pub fn open<P: AsRef<Path>>(dir: P) -> Self {
        Self::new(FsSource::new(dir), Arc::new(SystemClock), DEFAULT_INDEX_TTL)
    }

    /// Slugs of every markdown file in the posts directory
    pub fn list_slugs(&self) -> Vec<String> {
        match self.source.list() {
            Ok(names) => names
                .iter()
                .filter_map(|name| slug_from_filename(name))
                .filter(|slug| !slug.is_empty())
                .map(str::to_string)
                .collect(),
            Err(e) => {
                tracing::error!(
                    "Error reading posts directory {:?}: {}",
                    self.source.location(""),
                    e
                );
                Vec::new()
            }
        }
    }

    /// Load a post by slug
    pub fn get_post(&self, slug: &str) -> Option<Post> {
        let name = match post_filename(slug) {
            Ok(name) => name,
            Err(e) => {
                tracing::debug!("{}", e);
                return None;
            }
        };
        if !self.source.exists(&name) {
            tracing::debug!("No post for slug {:?}", slug);
            return None;
        }

        match self.load_post(slug, &name) {
            Ok(post) => Some(post),
            Err(e) => {
                tracing::error!("Error reading post {}: {}", slug, e);
                None
            }
        }
    }

    fn load_post(&self, slug: &str, name: &str) -> Result<Post> {
        let raw = self
            .source
            .read(name)
            .map_err(|e| Error::io(self.source.location(name), e))?;
        let (fm, body) = FrontMatter::parse(&raw)?;

        let date = fm.date.filter(|d| !d.trim().is_empty()).unwrap_or_else(|| {
            self.clock
                .utc()
                .to_rfc3339_opts(SecondsFormat::Millis, true)
        });

        Ok(Post {
            slug: slug.to_string(),
            title: fm
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| slug.to_string()),
            date,
            tags: fm.tags,
            description: fm.description,
            author: fm.author,
            content: body.to_string(),
        })
    }

    /// Metadata of every readable post, newest first
    pub fn list_all_metadata(&self) -> Arc<[PostMetadata]> {
        let now = self.clock.now();
        if let Some(cached) = self.index.read().as_ref() {
            if now.duration_since(cached.built_at) < self.index_ttl {
                return Arc::clone(&cached.posts);
            }
        }

        let mut index = self.index.write();
        // Another caller may have rebuilt while we waited for the lock
        if let Some(cached) = index.as_ref() {
            if self.clock.now().duration_since(cached.built_at) < self.index_ttl {
                return Arc::clone(&cached.posts);
            }
        }

        let posts = self.rebuild_index();
        tracing::debug!("Indexed {} posts", posts.len());
        *index = Some(CachedIndex {
            posts: Arc::clone(&posts),
            built_at: self.clock.now(),
        });
        posts
    }

    fn rebuild_index(&self) -> Arc<[PostMetadata]> {
        let mut posts: Vec<PostMetadata> = self
            .list_slugs()
            .iter()
            .filter_map(|slug| self.get_post(slug))
            .map(Post::into_metadata)
            .collect();

        // Sort by date string descending (newest first)
        posts.sort_by(|a, b| b.date.cmp(&a.date));
        posts.into()
    }

    /// Whether a post file exists for the slug, without reading it
    pub fn exists(&self, slug: &str) -> bool {
        post_filename(slug).is_ok_and(|name| self.source.exists(&name))
    }

    /// Forget the metadata index; the next listing rebuilds it
    pub fn clear_cache(&self) {
        *self.index.write() = None;
    }

    /// Tags across all posts, most used first
    pub fn tags(&self) -> Vec<TagCount> {
        let posts = self.list_all_metadata();
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for post in posts.iter() {
            for tag in &post.tags {
                *counts.entry(tag.as_str()).or_insert(0) += 1;
            }
        }

        let mut tags: Vec<TagCount> = counts
            .into_iter()
            .map(|(name, count)| TagCount {
                name: name.to_string(),
                count,
            })
            .collect();
        tags.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        tags
    }
}

/// Filename for a slug that stays inside the posts directory
fn post_filename(slug: &str) -> Result<String> {
    if !is_safe_slug(slug) {
        return Err(Error::InvalidSlug(slug.to_string()));
    }
    Ok(filename_for_slug(slug))
}
