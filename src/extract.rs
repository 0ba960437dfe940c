//! Text normalization and field extraction for chapter commentary pages
//!
//! Each chapter page carries three things we keep:
//! - a header ("Read all of Genesis 5") naming the book and chapter
//! - a content region whose first paragraph is the description
//! - the content region's markup, cleaned into a single-line fragment
//!
//! Extraction never panics on odd markup. A missing region or an
//! unparseable header is reported as an [`ExtractError`] and the caller
//! skips that one page.

use crate::config::{parse_selector, SiteConfig};
use crate::identity::canonical_name;
use crate::ConfigError;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use thiserror::Error;

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

// "Complete" / "Concise" switcher appended after the commentary text.
regex!(DECORATIVE_LINE, r#"\s+<span class="four".*"#);
regex!(LINK_OPEN, r"(?i)<a\b[^>]*>");
regex!(LINK_CLOSE, r"(?i)</a\s*>");
regex!(LINE_BREAKS, r"\r?\n|\r");
regex!(TRAILING_NUMBER, r"^(.*?)\s*(\d+)$");

/// Reasons a single page could not be turned into a record
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Region '{selector}' not found on page")]
    MissingRegion { selector: String },

    #[error("No trailing chapter number in header '{text}'")]
    MissingSequenceNumber { text: String },

    #[error("Chapter number out of range in header '{text}'")]
    InvalidSequenceNumber { text: String },

    #[error("No book name in header '{text}'")]
    EmptyName { text: String },
}

/// Book name and chapter number parsed from a page header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityHeader {
    pub name: String,
    pub sequence_number: u32,
}

/// Everything extracted from one chapter page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafContent {
    pub header: EntityHeader,
    pub summary: String,
    pub body: String,
}

/// Parses a header such as `"Read all of Genesis 5 "`
///
/// Strips every occurrence of `prefix`, drops parentheses (the site renders
/// an empty `()` next to some headers), collapses whitespace and splits the
/// trailing chapter number from the book name.
///
/// # Example
///
/// ```
/// use commentary_harvest::extract::extract_entity_header;
///
/// let header = extract_entity_header("Read all of Genesis 5 ", "Read all of ").unwrap();
/// assert_eq!(header.name, "Genesis");
/// assert_eq!(header.sequence_number, 5);
/// ```
pub fn extract_entity_header(raw: &str, prefix: &str) -> Result<EntityHeader, ExtractError> {
    let stripped = if prefix.is_empty() {
        raw.to_string()
    } else {
        raw.replace(prefix, "")
    };
    let text = canonical_name(&stripped.replace(['(', ')'], ""));

    let captures = TRAILING_NUMBER
        .captures(&text)
        .ok_or_else(|| ExtractError::MissingSequenceNumber { text: text.clone() })?;

    let name = captures[1].trim().to_string();
    if name.is_empty() {
        return Err(ExtractError::EmptyName { text });
    }

    let sequence_number = captures[2]
        .parse::<u32>()
        .map_err(|_| ExtractError::InvalidSequenceNumber { text: text.clone() })?;

    Ok(EntityHeader {
        name,
        sequence_number,
    })
}

/// Returns the text of the first `paragraph` inside the first `region`
///
/// Whitespace runs collapse to single spaces so the description always
/// fits on one statement line.
pub fn extract_summary(
    document: &Html,
    region: &NamedSelector,
    paragraph: &NamedSelector,
) -> Result<String, ExtractError> {
    let region_el = document
        .select(&region.selector)
        .next()
        .ok_or_else(|| region.missing())?;

    let text = region_el
        .select(&paragraph.selector)
        .next()
        .map(|p| p.text().collect::<String>())
        .ok_or_else(|| paragraph.missing())?;

    Ok(canonical_name(&text))
}

/// Returns the cleaned outer markup of the first `region`
pub fn extract_body(document: &Html, region: &NamedSelector) -> Result<String, ExtractError> {
    let region_el = document
        .select(&region.selector)
        .next()
        .ok_or_else(|| region.missing())?;

    Ok(clean_body(&region_el.html()))
}

/// Cleans a commentary fragment into a single line
///
/// Four passes, in this order:
/// 1. drop the trailing decorative switcher line
/// 2. drop anchor open tags, keeping their inner text
/// 3. drop anchor close tags
/// 4. drop every line break
///
/// The decorative pass matches up to the end of its line, so it has to run
/// before line breaks are removed.
pub fn clean_body(markup: &str) -> String {
    let without_decoration = DECORATIVE_LINE.replace_all(markup, "");
    let without_open = LINK_OPEN.replace_all(&without_decoration, "");
    let without_close = LINK_CLOSE.replace_all(&without_open, "");
    LINE_BREAKS.replace_all(&without_close, "").into_owned()
}

/// A parsed CSS selector that remembers its source text for error reports
#[derive(Debug, Clone)]
pub struct NamedSelector {
    pub css: String,
    pub selector: Selector,
}

impl NamedSelector {
    /// Parses `css`, naming the config `key` it came from on failure
    pub fn parse(key: &str, css: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            css: css.to_string(),
            selector: parse_selector(key, css)?,
        })
    }

    fn missing(&self) -> ExtractError {
        ExtractError::MissingRegion {
            selector: self.css.clone(),
        }
    }
}

/// Runs the three extractors over a chapter page with configured selectors
#[derive(Debug, Clone)]
pub struct LeafExtractor {
    header: NamedSelector,
    header_prefix: String,
    content: NamedSelector,
    summary: NamedSelector,
}

impl LeafExtractor {
    /// Builds an extractor from the site layout
    ///
    /// # Returns
    ///
    /// * `Ok(LeafExtractor)` - All selectors parsed
    /// * `Err(ConfigError)` - A configured selector is not valid CSS
    pub fn from_config(site: &SiteConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            header: NamedSelector::parse("header-selector", &site.header_selector)?,
            header_prefix: site.header_prefix.clone(),
            content: NamedSelector::parse("content-selector", &site.content_selector)?,
            summary: NamedSelector::parse("summary-selector", &site.summary_selector)?,
        })
    }

    /// Selector whose presence means the page has finished rendering
    pub fn ready_selector(&self) -> &Selector {
        &self.content.selector
    }

    /// Extracts header, description and body from a page's markup
    pub fn extract(&self, html: &str) -> Result<LeafContent, ExtractError> {
        let document = Html::parse_document(html);

        let header_text = document
            .select(&self.header.selector)
            .next()
            .map(|el| el.text().collect::<String>())
            .ok_or_else(|| self.header.missing())?;

        let header = extract_entity_header(&header_text, &self.header_prefix)?;
        let body = extract_body(&document, &self.content)?;
        let summary = extract_summary(&document, &self.content, &self.summary)?;

        Ok(LeafContent {
            header,
            summary,
            body,
        })
    }
}
