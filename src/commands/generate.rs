//! Generate static files

use anyhow::Result;

use crate::generator::{GenerateReport, Generator};
use crate::Blog;

/// Generate the static post pages
pub async fn run(blog: &Blog) -> Result<GenerateReport> {
    let start = std::time::Instant::now();

    let generator = Generator::new(blog);
    let report = generator.generate().await?;

    if !report.broken_links.is_empty() {
        tracing::warn!("{} broken wiki links", report.broken_links.len());
    }
    tracing::info!("Completed in {:.2}s", start.elapsed().as_secs_f64());

    Ok(report)
}
