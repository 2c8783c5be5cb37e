//! Content module - posts, front-matter, slugs and markdown rendering

mod frontmatter;
mod markdown;
mod post;
pub mod slug;
pub mod source;
pub mod store;
pub mod wikilink;

pub use frontmatter::FrontMatter;
pub use markdown::MarkdownRenderer;
pub use post::{Post, PostMetadata, TagCount};
pub use slug::{post_href, slugify, slugify_with, SlugStyle};
pub use source::{FsSource, PostSource};
pub use store::PostStore;
