//! Markdown rendering with WikiLink resolution and a render cache

use pulldown_cmark::{html, Options, Parser, TextMergeStream};
use std::sync::Arc;

use super::slug::SlugStyle;
use super::wikilink::rewrite_events;
use crate::cache::{hash_content, RenderCache};

/// Markdown renderer backed by a shared render cache
pub struct MarkdownRenderer {
    cache: RenderCache,
    slug_style: SlugStyle,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new(cache: RenderCache) -> Self {
        Self {
            cache,
            slug_style: SlugStyle::default(),
        }
    }

    /// Create with custom settings
    pub fn with_options(cache: RenderCache, slug_style: SlugStyle) -> Self {
        Self { cache, slug_style }
    }

    /// Render markdown to HTML, reusing a fresh cached result when there is one
    pub fn render(&self, markdown: &str) -> Arc<str> {
        if markdown.is_empty() {
            return Arc::from("");
        }

        let key = hash_content(markdown);
        if let Some(html) = self.cache.get(&key) {
            tracing::trace!("Render cache hit");
            return html;
        }

        let html: Arc<str> = Arc::from(self.render_uncached(markdown));
        self.cache.insert(key, Arc::clone(&html));
        html
    }

    /// Render markdown to HTML without touching the cache
    pub fn render_uncached(&self, markdown: &str) -> String {
        // GFM tables, task lists, strikethrough and footnotes.
        // Front-matter is stripped before we get here, so no metadata blocks.
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_GFM;
        let parser = TextMergeStream::new(Parser::new_ext(markdown, options));
        let events = rewrite_events(parser, self.slug_style);

        let mut html_output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }

    /// Drop every cached rendering
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache(&self) -> &RenderCache {
        &self.cache
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new(RenderCache::default())
    }
}
