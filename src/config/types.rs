use serde::Deserialize;

/// Main configuration structure for Commentary-Harvest
///
/// Every section and key is optional; missing values fall back to the
/// defaults for the Matthew Henry concise commentary site.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub navigator: NavigatorConfig,
    pub output: OutputConfig,
    pub identity: IdentityConfig,
    pub logging: LoggingConfig,
}

/// Where the crawl starts and how pages are read
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Page listing every book
    #[serde(rename = "index-url")]
    pub index_url: String,

    /// Selector for the book labels on the index page
    #[serde(rename = "book-selector")]
    pub book_selector: String,

    /// URL substring marking a book page link
    #[serde(rename = "section-marker")]
    pub section_marker: String,

    /// URL substring marking a chapter commentary link
    #[serde(rename = "chapter-marker")]
    pub chapter_marker: String,

    /// URL substring marking the chapter index (not a commentary)
    #[serde(rename = "index-chapter-marker")]
    pub index_chapter_marker: String,

    /// Links that are never followed
    #[serde(rename = "excluded-links")]
    pub excluded_links: Vec<String>,

    /// Element holding "Read all of <Book> <chapter>"
    #[serde(rename = "header-selector")]
    pub header_selector: String,

    /// Boilerplate stripped from the header text
    #[serde(rename = "header-prefix")]
    pub header_prefix: String,

    /// Content region holding the commentary body
    #[serde(rename = "content-selector")]
    pub content_selector: String,

    /// Paragraph inside the content region used as the description
    #[serde(rename = "summary-selector")]
    pub summary_selector: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            index_url: "https://www.christianity.com/bible/commentary.php?com=mhc".to_string(),
            book_selector: ".col-md-6 .row a[href]".to_string(),
            section_marker: "b=".to_string(),
            chapter_marker: "c=".to_string(),
            index_chapter_marker: "c=0".to_string(),
            excluded_links: vec![
                "javascript:void(0);".to_string(),
                "https://www.christianity.com/bible/help.php?topic=About".to_string(),
            ],
            header_selector: "#read-this-chapter".to_string(),
            header_prefix: "Read all of ".to_string(),
            content_selector: ".text".to_string(),
            summary_selector: "p".to_string(),
        }
    }
}

/// Navigation pacing and retry behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Fixed pause after every navigation (milliseconds)
    #[serde(rename = "settle-delay-ms")]
    pub settle_delay_ms: u64,

    /// Upper bound for readiness polling after the settle delay (milliseconds)
    #[serde(rename = "ready-timeout-ms")]
    pub ready_timeout_ms: u64,

    /// Interval between readiness polls (milliseconds)
    #[serde(rename = "poll-interval-ms")]
    pub poll_interval_ms: u64,

    /// Navigation attempts before a transport error is surfaced
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// First retry delay; doubles on every further attempt (milliseconds)
    #[serde(rename = "backoff-base-ms")]
    pub backoff_base_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// User agent sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 300,
            ready_timeout_ms: 3000,
            poll_interval_ms: 100,
            max_attempts: 3,
            backoff_base_ms: 500,
            request_timeout_secs: 30,
            user_agent: concat!("CommentaryHarvest/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Output artifact locations
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Roster of books (one insert per book)
    #[serde(rename = "books-path")]
    pub books_path: String,

    /// Directory of per-book commentary scripts
    #[serde(rename = "commentaries-dir")]
    pub commentaries_dir: String,

    /// Combined commentary script written by `compose`
    #[serde(rename = "combined-path")]
    pub combined_path: String,

    /// Directory holding previously exported per-book JSON
    #[serde(rename = "seed-data-dir")]
    pub seed_data_dir: String,

    /// JSON array of book names the count pass iterates
    #[serde(rename = "seed-books-path")]
    pub seed_books_path: String,

    /// Count update script written by `count`
    #[serde(rename = "counts-path")]
    pub counts_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            books_path: "output/books.sql".to_string(),
            commentaries_dir: "output/commentaries".to_string(),
            combined_path: "output/commentaries.sql".to_string(),
            seed_data_dir: "output/seed-data".to_string(),
            seed_books_path: "output/seed-data/Books.json".to_string(),
            counts_path: "output/book_counts.sql".to_string(),
        }
    }
}

/// What to do when a chapter page names a different book than the one it was reached from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MismatchPolicy {
    /// Log it, count it, and still write the statement
    #[default]
    Warn,
    /// Log it, count it, and drop the statement
    Skip,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    #[serde(rename = "on-mismatch")]
    pub on_mismatch: MismatchPolicy,
}

/// Diagnostic filtering
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log targets whose output is always silenced
    pub suppress: Vec<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            suppress: vec!["html5ever".to_string(), "selectors".to_string()],
        }
    }
}
