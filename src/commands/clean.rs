//! Clean the generated pages

use anyhow::Result;
use std::fs;

use crate::Blog;

/// Remove `public/posts`; images and other public files stay
pub fn run(blog: &Blog) -> Result<()> {
    let posts_out = blog.public_dir.join("posts");
    if posts_out.exists() {
        fs::remove_dir_all(&posts_out)?;
        tracing::info!("Deleted: {:?}", posts_out);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_clean_keeps_images() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("public/posts/a")).unwrap();
        fs::create_dir_all(tmp.path().join("public/images")).unwrap();
        fs::write(tmp.path().join("public/images/x.png"), b"png").unwrap();

        let blog = Blog::new(tmp.path()).unwrap();
        run(&blog).unwrap();
        assert!(!tmp.path().join("public/posts").exists());
        assert!(tmp.path().join("public/images/x.png").exists());

        // Nothing to clean is fine
        run(&blog).unwrap();
    }
}
