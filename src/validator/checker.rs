//! Existence checkers consumed by the link validator

use std::future::Future;
use std::sync::Arc;

use crate::content::slug::encode_slug;
use crate::content::PostStore;
use crate::error::{Error, Result};
use crate::server::ExistsResponse;

/// Answers whether a post exists for a slug.
pub trait ExistenceChecker: Send + Sync + 'static {
    fn exists(&self, slug: &str) -> impl Future<Output = Result<bool>> + Send;
}

/// Checks slugs against an in-process post store
#[derive(Clone)]
pub struct StoreChecker {
    store: Arc<PostStore>,
}

impl StoreChecker {
    pub fn new(store: Arc<PostStore>) -> Self {
        Self { store }
    }
}

impl ExistenceChecker for StoreChecker {
    fn exists(&self, slug: &str) -> impl Future<Output = Result<bool>> + Send {
        let store = Arc::clone(&self.store);
        let slug = slug.to_string();
        async move {
            let wanted = slug.clone();
            tokio::task::spawn_blocking(move || store.exists(&wanted))
                .await
                .map_err(|e| Error::check(&slug, e))
        }
    }
}

/// Checks slugs through a running server's existence endpoint
#[derive(Clone)]
pub struct HttpChecker {
    client: reqwest::Client,
    base_url: String,
}

impl HttpChecker {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Endpoint URL for a slug
    pub fn url_for(&self, slug: &str) -> String {
        format!("{}/api/posts/{}/exists", self.base_url, encode_slug(slug))
    }
}

impl ExistenceChecker for HttpChecker {
    fn exists(&self, slug: &str) -> impl Future<Output = Result<bool>> + Send {
        let request = self.client.get(self.url_for(slug));
        let slug = slug.to_string();
        async move {
            let response = request
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(|e| Error::check(&slug, e))?;
            let body: ExistsResponse = response.json().await.map_err(|e| Error::check(&slug, e))?;
            Ok(body.exists)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::content::store::tests::MemorySource;
    use crate::content::store::DEFAULT_INDEX_TTL;

    #[tokio::test]
    async fn test_store_checker() {
        let source = MemorySource::default().with("hello.md", "# Hi");
        let store = PostStore::new(source, Arc::new(ManualClock::default()), DEFAULT_INDEX_TTL);
        let checker = StoreChecker::new(Arc::new(store));

        assert!(checker.exists("hello").await.unwrap());
        assert!(!checker.exists("missing").await.unwrap());
        assert!(!checker.exists("../hello").await.unwrap());
    }

    #[test]
    fn test_http_checker_url() {
        let checker = HttpChecker::new("http://localhost:3000/");
        assert_eq!(
            checker.url_for("my-post"),
            "http://localhost:3000/api/posts/my-post/exists"
        );
        assert_eq!(
            checker.url_for("한글"),
            "http://localhost:3000/api/posts/%ED%95%9C%EA%B8%80/exists"
        );
    }

    #[tokio::test]
    async fn test_http_checker_unreachable_is_error() {
        // Port 9 (discard) is closed on test hosts
        let checker = HttpChecker::new("http://127.0.0.1:9");
        let err = checker.exists("x").await.unwrap_err();
        assert!(matches!(err, Error::Check { ref slug, .. } if slug == "x"));
    }
}
