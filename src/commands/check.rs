//! Check every post for broken WikiLinks

use anyhow::Result;
use std::sync::Arc;

use crate::validator::{validate_html, ExistenceChecker, HttpChecker, StoreChecker};
use crate::Blog;

/// A WikiLink whose target has no post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokenLink {
    pub post: String,
    pub target: String,
}

/// Render each post and validate its WikiLinks with `checker`
pub async fn find_broken<C: ExistenceChecker>(blog: &Blog, checker: Arc<C>) -> Vec<BrokenLink> {
    let mut broken = Vec::new();
    for meta in blog.store.list_all_metadata().iter() {
        let Some(post) = blog.store.get_post(&meta.slug) else {
            continue;
        };
        let html = blog.renderer.render(&post.content);
        let (_, resolved) = validate_html(Arc::clone(&checker), &html, &blog.config.validator).await;
        let mut targets: Vec<String> = resolved
            .into_iter()
            .filter(|(_, exists)| !exists)
            .map(|(target, _)| target)
            .collect();
        targets.sort();
        broken.extend(targets.into_iter().map(|target| BrokenLink {
            post: post.slug.clone(),
            target,
        }));
    }
    broken
}

/// Report broken links against the local store or a running server
pub async fn run(blog: &Blog, remote: Option<&str>) -> Result<()> {
    let broken = match remote {
        Some(url) => {
            tracing::info!("Checking links against {}", url);
            find_broken(blog, Arc::new(HttpChecker::new(url))).await
        }
        None => find_broken(blog, Arc::new(StoreChecker::new(Arc::clone(&blog.store)))).await,
    };

    if broken.is_empty() {
        println!("No broken links.");
        return Ok(());
    }

    println!("Broken links ({}):", broken.len());
    for link in &broken {
        println!("  {} -> [[{}]]", link.post, link.target);
    }
    anyhow::bail!("{} broken links found", broken.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn blog_with(files: &[(&str, &str)]) -> (TempDir, Blog) {
        let tmp = TempDir::new().unwrap();
        let notes = tmp.path().join("notes");
        fs::create_dir_all(&notes).unwrap();
        for (name, content) in files {
            fs::write(notes.join(name), content).unwrap();
        }
        let blog = Blog::new(tmp.path()).unwrap();
        (tmp, blog)
    }

    #[tokio::test]
    async fn test_find_broken() {
        let (_tmp, blog) = blog_with(&[
            ("a.md", "---\ndate: 2024-01-02\n---\n[[B]] [[Ghost]] [[ghost]]"),
            ("b.md", "---\ndate: 2024-01-01\n---\n[[A]] `[[not a link]]`"),
        ]);
        let checker = Arc::new(StoreChecker::new(Arc::clone(&blog.store)));
        let broken = find_broken(&blog, checker).await;
        assert_eq!(
            broken,
            vec![BrokenLink {
                post: "a".to_string(),
                target: "ghost".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_run_fails_on_broken() {
        let (_tmp, blog) = blog_with(&[("a.md", "[[Missing]]")]);
        assert!(run(&blog, None).await.is_err());

        let (_tmp, blog) = blog_with(&[("a.md", "[[A]]")]);
        assert!(run(&blog, None).await.is_ok());
    }
}
