//! Crawler module for the book → book page → chapter traversal
//!
//! This module contains the core crawling logic, including:
//! - The rendering boundary and its HTTP implementation
//! - Navigation with settle, readiness polling and retry
//! - The traversal state machine
//! - Overall crawl orchestration

mod navigator;
mod orchestrator;
mod phase;
mod renderer;
mod report;

pub use navigator::{Anchor, Navigator, NavigatorSettings};
pub use orchestrator::Crawler;
pub use phase::CrawlPhase;
pub use renderer::{build_http_client, HttpRenderer, Renderer};
pub use report::CrawlReport;

use crate::config::Config;
use crate::Result;

/// Runs a complete crawl over HTTP
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP rendering session
/// 2. Read the book roster from the index page
/// 3. Write the roster and per-book artifact headers
/// 4. Visit every (selected) book page and chapter page
/// 5. Close the session
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `selection` - Book names to restrict the crawl to; empty for all
pub async fn crawl(config: &Config, selection: Vec<String>) -> Result<CrawlReport> {
    let renderer = HttpRenderer::from_config(&config.navigator)?;
    Crawler::new(config, renderer)?
        .with_selection(selection)
        .run()
        .await
}
