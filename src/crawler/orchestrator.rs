//! Crawl orchestrator - main traversal logic
//!
//! Walks the site strictly in sequence on one rendering session:
//! - the index page yields the book roster and the book page links
//! - each book page yields chapter links
//! - each chapter page yields one commentary statement
//!
//! Transport errors abort the current book page and the crawl moves on to
//! the next one. Extraction defects skip a single chapter. Filesystem
//! errors end the run.

use crate::config::{parse_selector, Config, MismatchPolicy};
use crate::crawler::navigator::{Anchor, Navigator, NavigatorSettings};
use crate::crawler::phase::CrawlPhase;
use crate::crawler::renderer::Renderer;
use crate::crawler::report::CrawlReport;
use crate::emit::{
    append_statement, create_artifact, Row, StatementEmitter, BOOKS_HEADER, COMMENTARIES_HEADER,
};
use crate::extract::{LeafContent, LeafExtractor};
use crate::identity::assign_id;
use crate::model::{Book, Commentary, Roster};
use crate::{HarvestError, RenderError, Result};
use scraper::Selector;
use std::collections::BTreeSet;
use std::path::PathBuf;
use url::Url;

/// A book page to visit, owned by one roster book
#[derive(Debug, Clone, PartialEq, Eq)]
struct Branch {
    book: usize,
    url: Url,
}

/// Main crawler structure
pub struct Crawler<R: Renderer> {
    index_url: Url,
    book_selector: Selector,
    section_marker: String,
    chapter_marker: String,
    index_chapter_marker: String,
    mismatch_policy: MismatchPolicy,
    books_path: PathBuf,
    navigator: Navigator<R>,
    extractor: LeafExtractor,
    emitter: StatementEmitter,
    selection: Vec<String>,
    phase: CrawlPhase,
    report: CrawlReport,
}

impl<R: Renderer> Crawler<R> {
    /// Creates a new crawler around a rendering session
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `renderer` - The rendering session the crawl will own
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to run
    /// * `Err(HarvestError)` - A configured URL or selector is invalid
    pub fn new(config: &Config, renderer: R) -> Result<Self> {
        let site = &config.site;

        Ok(Self {
            index_url: Url::parse(&site.index_url)?,
            book_selector: parse_selector("book-selector", &site.book_selector)?,
            section_marker: site.section_marker.clone(),
            chapter_marker: site.chapter_marker.clone(),
            index_chapter_marker: site.index_chapter_marker.clone(),
            mismatch_policy: config.identity.on_mismatch,
            books_path: PathBuf::from(&config.output.books_path),
            navigator: Navigator::new(renderer, NavigatorSettings::from_config(config)),
            extractor: LeafExtractor::from_config(site)?,
            emitter: StatementEmitter::new(&config.output.commentaries_dir, COMMENTARIES_HEADER),
            selection: Vec::new(),
            phase: CrawlPhase::Init,
            report: CrawlReport::new(),
        })
    }

    /// Restricts the crawl to the named books (case-insensitive)
    ///
    /// An empty selection crawls every book.
    pub fn with_selection<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection = names.into_iter().map(Into::into).collect();
        self
    }

    /// Runs the crawl to completion and closes the rendering session
    ///
    /// Output written before a fatal error stays on disk untouched.
    pub async fn run(mut self) -> Result<CrawlReport> {
        tracing::info!("Starting crawl at {}", self.index_url);

        let result = self.crawl().await;
        match &result {
            Ok(()) => self.advance(CrawlPhase::Done)?,
            Err(e) => {
                tracing::error!("Crawl stopped during {}: {}", self.phase, e);
                self.phase = CrawlPhase::Done;
            }
        }

        if let Err(e) = self.navigator.close().await {
            tracing::warn!("Failed to close rendering session: {}", e);
        }

        result?;
        self.report.finish();
        self.report.log_summary();
        Ok(self.report)
    }

    async fn crawl(&mut self) -> Result<()> {
        self.advance(CrawlPhase::ListTopLevel)?;
        let (roster, section_links) = self.list_top_level().await?;

        self.advance(CrawlPhase::EmitRoster)?;
        let selected = self.select_books(&roster);
        self.emit_roster(&roster, &selected)?;

        let branches = plan_branches(&roster, &section_links, &selected);

        for book in roster.books().iter().filter(|b| selected.contains(&b.index)) {
            self.advance(CrawlPhase::ListSubLevel)?;

            let urls: Vec<Url> = branches
                .iter()
                .filter(|branch| branch.book == book.index)
                .map(|branch| branch.url.clone())
                .collect();

            if urls.is_empty() {
                tracing::warn!("No book page found for '{}'", book.name);
            }

            for url in &urls {
                self.crawl_branch(&roster, book, url).await?;
            }
        }

        Ok(())
    }

    /// Loads the index page and returns the roster plus all book page links
    async fn list_top_level(&mut self) -> Result<(Roster, Vec<Anchor>)> {
        self.navigator
            .visit(&self.index_url, Some(&self.book_selector))
            .await?;

        let labels = self.navigator.collect_labels(&self.book_selector).await?;
        let roster = Roster::from_labels(labels);
        if roster.is_empty() {
            tracing::warn!("No books found on {}", self.index_url);
        }

        let marker = self.section_marker.as_str();
        let section_links = self
            .navigator
            .collect_links(|href| href.contains(marker))
            .await?;

        tracing::info!(
            "Found {} books and {} book pages",
            roster.len(),
            section_links.len()
        );
        Ok((roster, section_links))
    }

    /// Resolves the operator's selection against the roster, once
    fn select_books(&self, roster: &Roster) -> BTreeSet<usize> {
        if self.selection.is_empty() {
            return (0..roster.len()).collect();
        }

        let mut selected = BTreeSet::new();
        for name in &self.selection {
            match roster.index_of(name) {
                Some(index) => {
                    selected.insert(index);
                }
                None => tracing::warn!("Selected book '{}' is not on the index page", name),
            }
        }

        if selected.is_empty() {
            tracing::warn!("No selected book matched; nothing to crawl");
        }
        selected
    }

    /// Writes the roster and gives every book an artifact
    ///
    /// Artifacts of the books about to be crawled are truncated to their
    /// header. Unselected books only get a header-only file if they have
    /// none yet, so their output from earlier runs is kept.
    fn emit_roster(&mut self, roster: &Roster, selected: &BTreeSet<usize>) -> Result<()> {
        create_artifact(&self.books_path, BOOKS_HEADER)?;

        for book in roster.books() {
            append_statement(&self.books_path, &book.insert_statement())?;
            if selected.contains(&book.index) {
                self.emitter.init_artifact(&book.name)?;
            } else {
                self.emitter.ensure_artifact(&book.name)?;
            }
        }

        self.report.books = roster.len();
        Ok(())
    }

    /// Visits one book page and every chapter linked from it
    async fn crawl_branch(&mut self, roster: &Roster, book: &Book, url: &Url) -> Result<()> {
        self.advance(CrawlPhase::ListLeafLinks)?;
        self.report.branches += 1;

        let leaves = match self.list_leaf_links(url).await {
            Ok(leaves) => leaves,
            Err(e) => {
                tracing::error!("Failed to list chapters of '{}' at {}: {}", book.name, url, e);
                self.report.failed_branches += 1;
                return Ok(());
            }
        };

        tracing::info!("Gathering {} commentaries for '{}'", leaves.len(), book.name);

        let total = leaves.len();
        for (i, leaf) in leaves.iter().enumerate() {
            self.advance(CrawlPhase::FetchLeaf)?;
            let html = match self.fetch_leaf(leaf).await {
                Ok(html) => html,
                Err(e) => {
                    tracing::error!(
                        "Aborting '{}' after {}/{} chapters, {} failed: {}",
                        book.name,
                        i,
                        total,
                        leaf,
                        e
                    );
                    self.report.failed_branches += 1;
                    break;
                }
            };

            self.advance(CrawlPhase::Extract)?;
            let content = match self.extractor.extract(&html) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", leaf, e);
                    self.report.leaves_skipped += 1;
                    continue;
                }
            };

            self.advance(CrawlPhase::Emit)?;
            self.emit_leaf(roster, book, content)?;
            tracing::debug!("[{}/{}] {} done", i + 1, total, leaf);
        }

        Ok(())
    }

    async fn list_leaf_links(&mut self, url: &Url) -> std::result::Result<Vec<Url>, RenderError> {
        self.navigator.visit(url, None).await?;

        let chapter = self.chapter_marker.as_str();
        let index_chapter = self.index_chapter_marker.as_str();
        let anchors = self
            .navigator
            .collect_links(|href| href.contains(chapter) && !href.contains(index_chapter))
            .await?;

        Ok(anchors.into_iter().map(|anchor| anchor.url).collect())
    }

    async fn fetch_leaf(&mut self, url: &Url) -> std::result::Result<String, RenderError> {
        self.navigator
            .visit(url, Some(self.extractor.ready_selector()))
            .await?;
        self.navigator.content().await
    }

    /// Appends the commentary to the artifact named after the page's own header
    ///
    /// The foreign key and the target file both come from the extracted
    /// name, so a header that disagrees with the branch owner is reported.
    fn emit_leaf(&mut self, roster: &Roster, owner: &Book, content: LeafContent) -> Result<()> {
        let LeafContent {
            header,
            summary,
            body,
        } = content;
        let book_id = assign_id(&header.name);

        if book_id != owner.id {
            self.report.identity_mismatches += 1;
            let in_roster = if roster.contains_id(&book_id) {
                "another roster book"
            } else {
                "no roster book"
            };
            tracing::warn!(
                "Chapter {} page names '{}' ({}) but was reached from '{}'",
                header.sequence_number,
                header.name,
                in_roster,
                owner.name
            );

            if self.mismatch_policy == MismatchPolicy::Skip {
                self.report.leaves_skipped += 1;
                return Ok(());
            }
        }

        let commentary = Commentary {
            book_id,
            book_chapter: header.sequence_number,
            content: body,
            description: summary,
        };

        self.emitter
            .emit(&header.name, &commentary.insert_statement())?;
        self.report.leaves_emitted += 1;
        Ok(())
    }

    fn advance(&mut self, next: CrawlPhase) -> Result<()> {
        if !self.phase.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        tracing::trace!("Phase {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }
}

/// Attributes each book page link to the roster book it belongs to
///
/// A link whose label names a roster book belongs to that book. Otherwise
/// it belongs to the book at the same discovery position. Links owned by
/// unselected books are dropped.
fn plan_branches(roster: &Roster, links: &[Anchor], selected: &BTreeSet<usize>) -> Vec<Branch> {
    let mut branches = Vec::new();

    for (position, anchor) in links.iter().enumerate() {
        let owner = roster
            .index_of(&anchor.label)
            .or_else(|| (position < roster.len()).then_some(position));

        match owner {
            Some(book) if selected.contains(&book) => branches.push(Branch {
                book,
                url: anchor.url.clone(),
            }),
            Some(_) => {}
            None => tracing::warn!(
                "Book page {} ('{}') matches no book; skipping",
                anchor.url,
                anchor.label
            ),
        }
    }

    branches
}
