//! Post models

use serde::{Deserialize, Serialize};

/// A blog post read from `<slug>.md`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Slug (filename without extension)
    pub slug: String,

    /// Post title, falling back to the slug
    pub title: String,

    /// ISO-8601 publication date
    pub date: String,

    /// Post tags
    pub tags: Vec<String>,

    /// Short summary for previews
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Author name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Raw markdown content (front-matter stripped)
    pub content: String,
}

impl Post {
    /// Drop the body, keeping only what listings need
    pub fn into_metadata(self) -> PostMetadata {
        PostMetadata {
            slug: self.slug,
            title: self.title,
            date: self.date,
            tags: self.tags,
            description: self.description,
            author: self.author,
        }
    }
}

/// A post without its body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostMetadata {
    pub slug: String,
    pub title: String,
    pub date: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// A tag with the number of posts carrying it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub name: String,
    pub count: usize,
}
