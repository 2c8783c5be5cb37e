//! WikiLink validation
//!
//! A validator is mounted on a page. After a short debounce it scans the page
//! for WikiLink anchors, checks each new slug once in batches, and marks every
//! anchor as valid or broken as results arrive. Unmounting aborts whatever is
//! still running.

mod checker;
mod dom;

pub use checker::{ExistenceChecker, HttpChecker, StoreChecker};
pub use dom::{HtmlPage, LinkDom, BROKEN_CLASS, VALID_CLASS};

use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

use crate::config::ValidatorConfig;

/// What this mount knows about link targets
#[derive(Debug, Default)]
pub struct ValidationState {
    /// Slugs already handed to the checker
    dispatched: HashSet<String>,
    /// Resolved slugs
    status: HashMap<String, bool>,
}

impl ValidationState {
    pub fn status(&self, slug: &str) -> Option<bool> {
        self.status.get(slug).copied()
    }

    pub fn resolved(&self) -> &HashMap<String, bool> {
        &self.status
    }

    /// Keep only slugs not dispatched before, in first-seen order
    fn claim(&mut self, found: Vec<String>) -> Vec<String> {
        found
            .into_iter()
            .filter(|slug| self.dispatched.insert(slug.clone()))
            .collect()
    }
}

/// A validator mounted on one page
pub struct LinkValidator<C, D> {
    checker: Arc<C>,
    dom: Arc<Mutex<D>>,
    state: Arc<Mutex<ValidationState>>,
    batch_size: usize,
    scans: JoinSet<()>,
}

impl<C, D> LinkValidator<C, D>
where
    C: ExistenceChecker,
    D: LinkDom,
{
    /// Mount on a page; the first scan runs after the configured debounce
    pub fn mount(checker: Arc<C>, dom: Arc<Mutex<D>>, config: &ValidatorConfig) -> Self {
        let mut validator = Self {
            checker,
            dom,
            state: Arc::new(Mutex::new(ValidationState::default())),
            batch_size: config.batch_size.max(1),
            scans: JoinSet::new(),
        };
        validator.schedule(config.debounce());
        validator
    }

    /// Scan the page again, e.g. after its content changed
    pub fn rescan(&mut self) {
        self.schedule(Duration::ZERO);
    }

    fn schedule(&mut self, delay: Duration) {
        let checker = Arc::clone(&self.checker);
        let dom = Arc::clone(&self.dom);
        let state = Arc::clone(&self.state);
        let batch_size = self.batch_size;
        self.scans.spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            scan(checker, dom, state, batch_size).await;
        });
    }

    /// Wait for every scheduled scan to finish
    pub async fn settled(&mut self) {
        while let Some(joined) = self.scans.join_next().await {
            if let Err(e) = joined {
                if e.is_panic() {
                    tracing::error!("Link scan panicked: {}", e);
                }
            }
        }
    }

    /// Resolution of a slug, if it has one yet
    pub fn status(&self, slug: &str) -> Option<bool> {
        self.state.lock().status(slug)
    }

    /// Every resolved slug
    pub fn resolved(&self) -> HashMap<String, bool> {
        self.state.lock().resolved().clone()
    }

    /// Mark anchors again from known results, e.g. after the page re-rendered
    pub fn reapply(&self) {
        let state = self.state.lock();
        apply(&mut *self.dom.lock(), state.resolved());
    }

    /// Stop all pending and in-flight work
    pub fn unmount(mut self) {
        self.scans.abort_all();
    }
}

async fn scan<C, D>(
    checker: Arc<C>,
    dom: Arc<Mutex<D>>,
    state: Arc<Mutex<ValidationState>>,
    batch_size: usize,
) where
    C: ExistenceChecker,
    D: LinkDom,
{
    let found = dom.lock().wiki_link_slugs();
    let fresh = state.lock().claim(found);
    if fresh.is_empty() {
        return;
    }
    tracing::debug!("Checking {} wiki links", fresh.len());

    for batch in fresh.chunks(batch_size) {
        let results = check_batch(&checker, batch).await;
        let mut known = state.lock();
        known.status.extend(results);
        apply(&mut *dom.lock(), known.resolved());
    }
}

/// Check one batch concurrently; a failed or lost check counts as missing
async fn check_batch<C: ExistenceChecker>(checker: &Arc<C>, batch: &[String]) -> Vec<(String, bool)> {
    let mut checks = JoinSet::new();
    for slug in batch {
        let checker = Arc::clone(checker);
        let slug = slug.clone();
        checks.spawn(async move {
            let exists = match checker.exists(&slug).await {
                Ok(exists) => exists,
                Err(e) => {
                    tracing::warn!("Error checking link {}: {}", slug, e);
                    false
                }
            };
            (slug, exists)
        });
    }

    let mut results = Vec::with_capacity(batch.len());
    while let Some(joined) = checks.join_next().await {
        match joined {
            Ok(result) => results.push(result),
            Err(e) => tracing::error!("Link check task failed: {}", e),
        }
    }
    for slug in batch {
        if !results.iter().any(|(s, _)| s == slug) {
            results.push((slug.clone(), false));
        }
    }
    results
}

fn apply<D: LinkDom>(dom: &mut D, status: &HashMap<String, bool>) {
    for (slug, exists) in status {
        dom.mark(slug, *exists);
    }
}

/// Validate a rendered page once and return it with state classes applied
pub async fn validate_html<C: ExistenceChecker>(
    checker: Arc<C>,
    html: &str,
    config: &ValidatorConfig,
) -> (String, HashMap<String, bool>) {
    let page = Arc::new(Mutex::new(HtmlPage::new(html)));
    let config = ValidatorConfig {
        debounce_ms: 0,
        ..config.clone()
    };
    let mut validator = LinkValidator::mount(checker, Arc::clone(&page), &config);
    validator.settled().await;
    let resolved = validator.resolved();
    let html = page.lock().as_str().to_string();
    (html, resolved)
}
