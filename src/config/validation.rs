use crate::config::types::{Config, NavigatorConfig, OutputConfig, SiteConfig};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_navigator_config(&config.navigator)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the site layout description
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.index_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid index-url '{}': {}", config.index_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "index-url '{}' must use http or https",
            config.index_url
        )));
    }

    for (key, selector) in [
        ("book-selector", &config.book_selector),
        ("header-selector", &config.header_selector),
        ("content-selector", &config.content_selector),
        ("summary-selector", &config.summary_selector),
    ] {
        parse_selector(key, selector)?;
    }

    for (key, marker) in [
        ("section-marker", &config.section_marker),
        ("chapter-marker", &config.chapter_marker),
        ("index-chapter-marker", &config.index_chapter_marker),
    ] {
        if marker.is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", key)));
        }
    }

    Ok(())
}

/// Validates navigation pacing
fn validate_navigator_config(config: &NavigatorConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max-attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if config.poll_interval_ms == 0 {
        return Err(ConfigError::Validation(
            "poll-interval-ms must be > 0".to_string(),
        ));
    }

    if config.ready_timeout_ms < config.settle_delay_ms {
        return Err(ConfigError::Validation(format!(
            "ready-timeout-ms ({}) must be >= settle-delay-ms ({})",
            config.ready_timeout_ms, config.settle_delay_ms
        )));
    }

    if config.user_agent.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    for (key, path) in [
        ("books-path", &config.books_path),
        ("commentaries-dir", &config.commentaries_dir),
        ("combined-path", &config.combined_path),
        ("seed-data-dir", &config.seed_data_dir),
        ("seed-books-path", &config.seed_books_path),
        ("counts-path", &config.counts_path),
    ] {
        if path.is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", key)));
        }
    }

    Ok(())
}

/// Parses a CSS selector, naming the config key on failure
pub(crate) fn parse_selector(key: &str, selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector)
        .map_err(|e| ConfigError::InvalidSelector(format!("{} '{}': {:?}", key, selector, e)))
}
