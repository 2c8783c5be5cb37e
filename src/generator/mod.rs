//! Generator module - page shells and static output

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::SiteConfig;
use crate::content::{post_href, Post, PostMetadata};
use crate::validator::{validate_html, StoreChecker};
use crate::Blog;

/// Styles for validated WikiLinks
const WIKI_LINK_STYLE: &str = r#"<style>
.wiki-link-valid { text-decoration: underline; }
.wiki-link-broken { color: #b33; text-decoration: line-through; cursor: not-allowed; }
</style>"#;

/// Outcome of a generation run
#[derive(Debug, Default)]
pub struct GenerateReport {
    pub pages: usize,
    /// (post slug, missing target) pairs
    pub broken_links: Vec<(String, String)>,
}

/// Writes every post and the post index under `public/posts`
pub struct Generator {
    blog: Blog,
}

impl Generator {
    /// Create a new generator
    pub fn new(blog: &Blog) -> Self {
        Self { blog: blog.clone() }
    }

    /// Directory the generated pages land in
    pub fn output_dir(&self) -> PathBuf {
        self.blog.public_dir.join("posts")
    }

    /// Generate the post pages and the index
    pub async fn generate(&self) -> Result<GenerateReport> {
        let out_dir = self.output_dir();
        fs::create_dir_all(&out_dir)
            .with_context(|| format!("Failed to create {:?}", out_dir))?;

        let checker = Arc::new(StoreChecker::new(Arc::clone(&self.blog.store)));
        let posts = self.blog.store.list_all_metadata();
        let mut report = GenerateReport::default();

        for meta in posts.iter() {
            let Some(post) = self.blog.store.get_post(&meta.slug) else {
                continue;
            };
            let body = self.blog.renderer.render(&post.content);
            let (body, resolved) =
                validate_html(Arc::clone(&checker), &body, &self.blog.config.validator).await;
            let mut missing: Vec<_> = resolved
                .into_iter()
                .filter(|(_, exists)| !exists)
                .map(|(target, _)| target)
                .collect();
            missing.sort();
            for target in missing {
                tracing::warn!("Broken link in {}: [[{}]]", post.slug, target);
                report.broken_links.push((post.slug.clone(), target));
            }

            let page_dir = out_dir.join(&post.slug);
            fs::create_dir_all(&page_dir)?;
            let html = post_page(&self.blog.config, &post, &body);
            fs::write(page_dir.join("index.html"), html)
                .with_context(|| format!("Failed to write page for {}", post.slug))?;
            tracing::debug!("Generated: {:?}", page_dir);
            report.pages += 1;
        }

        fs::write(out_dir.join("index.html"), index_page(&self.blog.config, &posts))?;
        tracing::info!("Generated {} post pages", report.pages);
        Ok(report)
    }
}

/// Full HTML page for one post
pub fn post_page(config: &SiteConfig, post: &Post, body_html: &str) -> String {
    let mut header = format!(
        "<h1>{}</h1>\n<p class=\"post-meta\"><time datetime=\"{}\">{}</time>",
        html_escape(&post.title),
        html_escape(&post.date),
        html_escape(display_date(&post.date))
    );
    if let Some(author) = &post.author {
        header.push_str(&format!(" &middot; {}", html_escape(author)));
    }
    header.push_str("</p>\n");
    if !post.tags.is_empty() {
        let tags: Vec<String> = post
            .tags
            .iter()
            .map(|t| format!("<li>{}</li>", html_escape(t)))
            .collect();
        header.push_str(&format!("<ul class=\"post-tags\">{}</ul>\n", tags.join("")));
    }

    let body = format!(
        "<article class=\"post\">\n{}<div class=\"post-content\">\n{}</div>\n</article>",
        header, body_html
    );
    layout(config, Some(&post.title), post.description.as_deref(), &body)
}

/// Listing of every post, newest first
pub fn index_page(config: &SiteConfig, posts: &[PostMetadata]) -> String {
    let mut body = format!("<h1>{}</h1>\n<ul class=\"post-list\">\n", html_escape(&config.title));
    for post in posts {
        body.push_str(&format!(
            "<li><time datetime=\"{}\">{}</time> <a href=\"{}\">{}</a></li>\n",
            html_escape(&post.date),
            html_escape(display_date(&post.date)),
            post_href(&post.slug),
            html_escape(&post.title)
        ));
    }
    body.push_str("</ul>");
    layout(config, None, Some(config.description.as_str()), &body)
}

/// Page shown for a slug with no post
pub fn not_found_page(config: &SiteConfig, slug: &str) -> String {
    let body = format!(
        "<h1>Post not found</h1>\n<p>There is no post named <code>{}</code> yet.</p>\n<p><a href=\"/posts\">All posts</a></p>",
        html_escape(slug)
    );
    layout(config, Some("Not found"), None, &body)
}

fn layout(config: &SiteConfig, title: Option<&str>, description: Option<&str>, body: &str) -> String {
    let full_title = match title {
        Some(title) => format!("{} | {}", title, config.title),
        None => config.title.clone(),
    };
    let description = description
        .filter(|d| !d.is_empty())
        .map(|d| format!("\n<meta name=\"description\" content=\"{}\">", html_escape(d)))
        .unwrap_or_default();
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>{}\n{}\n</head>\n<body>\n<main>\n{}\n</main>\n</body>\n</html>\n",
        html_escape(&full_title),
        description,
        WIKI_LINK_STYLE,
        body
    )
}

/// Date part of an ISO-8601 timestamp
fn display_date(date: &str) -> &str {
    date.get(..10).unwrap_or(date)
}

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
