//! List site content

use anyhow::Result;

use crate::Blog;

/// List site content by type
pub fn run(blog: &Blog, content_type: &str) -> Result<()> {
    match content_type {
        "post" | "posts" => {
            let posts = blog.store.list_all_metadata();
            println!("Posts ({}):", posts.len());
            for post in posts.iter() {
                println!(
                    "  {} - {} [{}]",
                    post.date.get(..10).unwrap_or(&post.date),
                    post.title,
                    post.slug
                );
            }
        }
        "tag" | "tags" => {
            let tags = blog.store.tags();
            println!("Tags ({}):", tags.len());
            for tag in tags {
                println!("  {} ({})", tag.name, tag.count);
            }
        }
        _ => {
            anyhow::bail!("Unknown type: {}. Available: post, tag", content_type);
        }
    }

    Ok(())
}
