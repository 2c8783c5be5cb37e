//! Blog server: post pages, the content API and the link existence endpoint

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::generator::{index_page, not_found_page, post_page};
use crate::validator::{validate_html, StoreChecker};
use crate::Blog;

/// Body of a successful existence check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistsResponse {
    pub exists: bool,
    pub slug: String,
}

/// Body of a failed request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Build the application router
pub fn router(blog: Blog) -> Router {
    let images = ServeDir::new(&blog.images_dir);
    Router::new()
        .route("/api/posts", get(list_posts))
        .route("/api/posts/:slug/exists", get(post_exists))
        .route("/posts", get(post_index))
        .route("/posts/:slug", get(show_post))
        .nest_service("/images", images)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(blog))
}

/// Start the server
pub async fn start(blog: Blog, ip: &str, port: u16) -> Result<()> {
    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let app = router(blog);

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn post_exists(State(blog): State<Arc<Blog>>, Path(slug): Path<String>) -> Response {
    let store = Arc::clone(&blog.store);
    let wanted = slug.clone();
    match tokio::task::spawn_blocking(move || store.exists(&wanted)).await {
        Ok(exists) => {
            let cache_control = format!(
                "public, s-maxage={}, stale-while-revalidate=30",
                blog.config.server.exists_max_age
            );
            (
                [(header::CACHE_CONTROL, cache_control)],
                Json(ExistsResponse { exists, slug }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Error checking post existence for {}: {}", slug, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to check post existence".to_string(),
                }),
            )
                .into_response()
        }
    }
}

async fn list_posts(State(blog): State<Arc<Blog>>) -> Response {
    let store = Arc::clone(&blog.store);
    match tokio::task::spawn_blocking(move || store.list_all_metadata()).await {
        Ok(posts) => Json(posts.to_vec()).into_response(),
        Err(e) => {
            tracing::error!("Error listing posts: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to list posts".to_string(),
                }),
            )
                .into_response()
        }
    }
}

async fn post_index(State(blog): State<Arc<Blog>>) -> Response {
    let store = Arc::clone(&blog.store);
    match tokio::task::spawn_blocking(move || store.list_all_metadata()).await {
        Ok(posts) => Html(index_page(&blog.config, &posts)).into_response(),
        Err(e) => {
            tracing::error!("Error listing posts: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn show_post(State(blog): State<Arc<Blog>>, Path(slug): Path<String>) -> Response {
    let loader = Arc::clone(&blog);
    let wanted = slug.clone();
    let loaded = tokio::task::spawn_blocking(move || {
        loader.store.get_post(&wanted).map(|post| {
            let html = loader.renderer.render(&post.content);
            (post, html)
        })
    })
    .await;

    match loaded {
        Ok(Some((post, html))) => {
            let checker = Arc::new(StoreChecker::new(Arc::clone(&blog.store)));
            let (html, _) = validate_html(checker, &html, &blog.config.validator).await;
            Html(post_page(&blog.config, &post, &html)).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Html(not_found_page(&blog.config, &slug)),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Error loading post {}: {}", slug, e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
