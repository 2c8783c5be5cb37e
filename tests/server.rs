use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use wikiblog::clock::SystemClock;
use wikiblog::config::SiteConfig;
use wikiblog::content::PostSource;
use wikiblog::server::{router, ErrorResponse, ExistsResponse};
use wikiblog::Blog;

/// A source whose lookups crash the blocking task
struct CrashingSource;

impl PostSource for CrashingSource {
    fn list(&self) -> io::Result<Vec<String>> {
        Ok(Vec::new())
    }

    fn exists(&self, _name: &str) -> bool {
        panic!("disk went away");
    }

    fn read(&self, name: &str) -> io::Result<String> {
        Err(io::Error::new(io::ErrorKind::NotFound, name.to_string()))
    }

    fn location(&self, name: &str) -> PathBuf {
        PathBuf::from(name)
    }
}

fn site() -> (TempDir, Blog) {
    let tmp = TempDir::new().unwrap();
    let notes = tmp.path().join("notes");
    fs::create_dir_all(&notes).unwrap();
    fs::write(
        notes.join("hello.md"),
        "---\ntitle: Hello\ndate: 2024-02-01T00:00:00.000Z\ntags: [intro]\n---\nSee [[한글 포스트]] and [[Nowhere]].\n",
    )
    .unwrap();
    fs::write(
        notes.join("한글-포스트.md"),
        "---\ntitle: 한글\ndate: 2024-01-01T00:00:00.000Z\n---\n본문\n",
    )
    .unwrap();
    fs::create_dir_all(tmp.path().join("public/images")).unwrap();
    fs::write(tmp.path().join("public/images/pic.txt"), "image bytes").unwrap();

    let blog = Blog::new(tmp.path()).unwrap();
    (tmp, blog)
}

async fn get(blog: &Blog, uri: &str) -> (StatusCode, axum::http::HeaderMap, String) {
    let response = router(blog.clone())
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn exists_endpoint_reports_presence() {
    let (_tmp, blog) = site();

    let (status, headers, body) = get(&blog, "/api/posts/hello/exists").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers[header::CACHE_CONTROL],
        "public, s-maxage=60, stale-while-revalidate=30"
    );
    let parsed: ExistsResponse = serde_json::from_str(&body).unwrap();
    assert_eq!(
        parsed,
        ExistsResponse {
            exists: true,
            slug: "hello".to_string()
        }
    );

    let (status, _, body) = get(&blog, "/api/posts/missing/exists").await;
    assert_eq!(status, StatusCode::OK);
    let parsed: ExistsResponse = serde_json::from_str(&body).unwrap();
    assert!(!parsed.exists);
    assert_eq!(parsed.slug, "missing");
}

#[tokio::test]
async fn exists_endpoint_decodes_hangul() {
    let (_tmp, blog) = site();
    let (status, _, body) = get(
        &blog,
        "/api/posts/%ED%95%9C%EA%B8%80-%ED%8F%AC%EC%8A%A4%ED%8A%B8/exists",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let parsed: ExistsResponse = serde_json::from_str(&body).unwrap();
    assert!(parsed.exists);
    assert_eq!(parsed.slug, "한글-포스트");
}

#[tokio::test]
async fn exists_endpoint_rejects_traversal() {
    let (_tmp, blog) = site();
    let (status, _, body) = get(&blog, "/api/posts/..%2Fhello/exists").await;
    assert_eq!(status, StatusCode::OK);
    let parsed: ExistsResponse = serde_json::from_str(&body).unwrap();
    assert!(!parsed.exists);
}

#[tokio::test]
async fn exists_endpoint_reports_failed_check() {
    let tmp = TempDir::new().unwrap();
    let blog = Blog::with_source(
        tmp.path().to_path_buf(),
        SiteConfig::default(),
        CrashingSource,
        Arc::new(SystemClock),
    );

    let (status, headers, body) = get(&blog, "/api/posts/hello/exists").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(headers.get(header::CACHE_CONTROL).is_none());
    let parsed: ErrorResponse = serde_json::from_str(&body).unwrap();
    assert_eq!(
        parsed,
        ErrorResponse {
            error: "Failed to check post existence".to_string()
        }
    );
}

#[tokio::test]
async fn list_endpoint_omits_content() {
    let (_tmp, blog) = site();
    let (status, _, body) = get(&blog, "/api/posts").await;
    assert_eq!(status, StatusCode::OK);

    let posts: Vec<serde_json::Value> = serde_json::from_str(&body).unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0]["slug"], "hello");
    assert_eq!(posts[1]["slug"], "한글-포스트");
    assert_eq!(posts[0]["tags"], serde_json::json!(["intro"]));
    assert!(posts.iter().all(|p| p.get("content").is_none()));
}

#[tokio::test]
async fn post_page_marks_links() {
    let (_tmp, blog) = site();
    let (status, _, body) = get(&blog, "/posts/hello").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<title>Hello | Notes</title>"));
    assert!(body.contains(r#"class="wiki-link wiki-link-valid" data-slug="한글-포스트""#));
    assert!(body.contains(r#"class="wiki-link wiki-link-broken" data-slug="nowhere""#));
}

#[tokio::test]
async fn missing_post_is_not_found() {
    let (_tmp, blog) = site();
    let (status, _, body) = get(&blog, "/posts/nowhere").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Post not found"));
}

#[tokio::test]
async fn index_and_images() {
    let (_tmp, blog) = site();
    let (status, _, body) = get(&blog, "/posts").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.find("Hello").unwrap() < body.find("한글</a>").unwrap());

    let (status, _, body) = get(&blog, "/images/pic.txt").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "image bytes");
}
