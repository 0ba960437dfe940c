//! Navigation on top of a [`Renderer`]
//!
//! Adds the pieces the crawl relies on: bounded retry with exponential
//! backoff around navigation, a settle step (fixed delay, then readiness
//! polling for an expected element), and link/label collection evaluated
//! against the current document.

use crate::config::Config;
use crate::crawler::renderer::Renderer;
use crate::RenderError;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use std::time::Duration;
use url::Url;

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// Timing and link policy for a [`Navigator`]
#[derive(Debug, Clone)]
pub struct NavigatorSettings {
    pub settle_delay: Duration,
    pub ready_timeout: Duration,
    pub poll_interval: Duration,
    pub max_attempts: u32,
    pub backoff_base: Duration,
    pub excluded_links: Vec<String>,
}

impl NavigatorSettings {
    pub fn from_config(config: &Config) -> Self {
        let nav = &config.navigator;
        Self {
            settle_delay: Duration::from_millis(nav.settle_delay_ms),
            ready_timeout: Duration::from_millis(nav.ready_timeout_ms),
            poll_interval: Duration::from_millis(nav.poll_interval_ms),
            max_attempts: nav.max_attempts.max(1),
            backoff_base: Duration::from_millis(nav.backoff_base_ms),
            excluded_links: config.site.excluded_links.clone(),
        }
    }
}

/// A hyperlink on the current page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// Absolute target URL
    pub url: Url,
    /// Visible text, whitespace-collapsed
    pub label: String,
}

/// Drives a single rendering session one page at a time
pub struct Navigator<R: Renderer> {
    renderer: R,
    settings: NavigatorSettings,
}

impl<R: Renderer> Navigator<R> {
    pub fn new(renderer: R, settings: NavigatorSettings) -> Self {
        Self { renderer, settings }
    }

    /// Navigates to `url`, retrying transient failures with backoff
    ///
    /// The delay before attempt `n + 1` is `backoff_base * 2^(n - 1)`.
    /// Permanent failures (most 4xx responses) are returned immediately.
    pub async fn go_to(&mut self, url: &Url) -> Result<(), RenderError> {
        let mut attempt = 1;
        loop {
            match self.renderer.navigate(url).await {
                Ok(()) => return Ok(()),
                Err(e) if e.is_transient() && attempt < self.settings.max_attempts => {
                    let delay = self
                        .settings
                        .backoff_base
                        .saturating_mul(2u32.saturating_pow(attempt - 1));
                    tracing::warn!(
                        "Navigation to {} failed (attempt {}/{}): {}; retrying in {:?}",
                        url,
                        attempt,
                        self.settings.max_attempts,
                        e,
                        delay
                    );
                    self.renderer.wait(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Waits for the current page to finish rendering
    ///
    /// Always pauses for the fixed settle delay. If `ready` is given, the
    /// document is then polled until it matches or the total time spent
    /// waiting would exceed the ready timeout. Running out is not an error:
    /// callers find out when the element they need is missing.
    pub async fn settle(&mut self, ready: Option<&Selector>) -> Result<(), RenderError> {
        self.renderer.wait(self.settings.settle_delay).await;
        let mut waited = self.settings.settle_delay;

        let Some(selector) = ready else {
            return Ok(());
        };

        loop {
            let html = self.renderer.content().await?;
            if document_matches(&html, selector) {
                return Ok(());
            }
            if waited + self.settings.poll_interval > self.settings.ready_timeout {
                tracing::debug!(
                    "Page {} not ready after {:?}",
                    self.current_url_display(),
                    waited
                );
                return Ok(());
            }
            self.renderer.wait(self.settings.poll_interval).await;
            waited += self.settings.poll_interval;
        }
    }

    /// Navigates to `url` and settles
    pub async fn visit(&mut self, url: &Url, ready: Option<&Selector>) -> Result<(), RenderError> {
        self.go_to(url).await?;
        self.settle(ready).await
    }

    /// Returns the current document
    pub async fn content(&mut self) -> Result<String, RenderError> {
        self.renderer.content().await
    }

    /// Collects every followable link on the page whose absolute URL passes
    /// `predicate`, in document order, without duplicates
    pub async fn collect_links<F>(&mut self, predicate: F) -> Result<Vec<Anchor>, RenderError>
    where
        F: Fn(&str) -> bool,
    {
        let html = self.renderer.content().await?;
        let base = self
            .renderer
            .current_url()
            .cloned()
            .ok_or(RenderError::NoPage)?;
        Ok(extract_anchors(&html, &base, &self.settings.excluded_links)
            .into_iter()
            .filter(|anchor| predicate(anchor.url.as_str()))
            .collect())
    }

    /// Collects the trimmed text of every element matching `selector`
    pub async fn collect_labels(&mut self, selector: &Selector) -> Result<Vec<String>, RenderError> {
        let html = self.renderer.content().await?;
        Ok(extract_labels(&html, selector))
    }

    /// Ends the rendering session
    pub async fn close(&mut self) -> Result<(), RenderError> {
        self.renderer.close().await
    }

    fn current_url_display(&self) -> String {
        self.renderer
            .current_url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "<none>".to_string())
    }
}

fn document_matches(html: &str, selector: &Selector) -> bool {
    Html::parse_document(html).select(selector).next().is_some()
}

fn extract_labels(html: &str, selector: &Selector) -> Vec<String> {
    Html::parse_document(html)
        .select(selector)
        .map(|el| crate::identity::canonical_name(&el.text().collect::<String>()))
        .filter(|label| !label.is_empty())
        .collect()
}

fn extract_anchors(html: &str, base: &Url, excluded: &[String]) -> Vec<Anchor> {
    let document = Html::parse_document(html);
    let mut anchors: Vec<Anchor> = Vec::new();

    for element in document.select(&ANCHOR_SELECTOR) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if excluded.iter().any(|x| x == href.trim()) {
            continue;
        }
        let Some(url) = resolve_link(href, base) else {
            continue;
        };
        if excluded.iter().any(|x| x == url.as_str()) {
            continue;
        }
        if anchors.iter().any(|a| a.url == url) {
            continue;
        }
        anchors.push(Anchor {
            url,
            label: crate::identity::canonical_name(&element.text().collect::<String>()),
        });
    }

    anchors
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(mut absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                absolute_url.set_fragment(None);
                Some(absolute_url)
            } else {
                None
            }
        }
        Err(_) => None,
    }
}
