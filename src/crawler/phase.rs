/// Crawl phase definitions for the traversal state machine
///
/// Init → ListTopLevel → EmitRoster → (ListSubLevel → (ListLeafLinks →
/// (FetchLeaf → Extract → Emit)*)*)* → Done
use std::fmt;

/// Represents the current phase of a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Nothing fetched yet
    Init,

    /// Reading book labels from the index page
    ListTopLevel,

    /// Writing the roster and per-book artifact headers
    EmitRoster,

    /// Starting the book pages of one book
    ListSubLevel,

    /// Reading chapter links from one book page
    ListLeafLinks,

    /// Loading one chapter page
    FetchLeaf,

    /// Running the extractors on the loaded chapter page
    Extract,

    /// Appending the chapter's statement
    Emit,

    /// Session closed
    Done,
}

impl CrawlPhase {
    /// Returns true if the crawl may move from `self` to `next`
    ///
    /// Every phase after the roster may jump back to an outer loop (a
    /// skipped leaf, an aborted branch) or finish.
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        use CrawlPhase::*;

        match (self, next) {
            (Done, _) => false,
            (Init, ListTopLevel) => true,
            (ListTopLevel, EmitRoster) => true,
            (EmitRoster, ListSubLevel | Done) => true,
            (ListSubLevel, ListSubLevel | ListLeafLinks | Done) => true,
            (ListLeafLinks, FetchLeaf | ListLeafLinks | ListSubLevel | Done) => true,
            (FetchLeaf, Extract | ListLeafLinks | ListSubLevel | Done) => true,
            (Extract, Emit | FetchLeaf | ListLeafLinks | ListSubLevel | Done) => true,
            (Emit, FetchLeaf | ListLeafLinks | ListSubLevel | Done) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::ListTopLevel => "list_top_level",
            Self::EmitRoster => "emit_roster",
            Self::ListSubLevel => "list_sub_level",
            Self::ListLeafLinks => "list_leaf_links",
            Self::FetchLeaf => "fetch_leaf",
            Self::Extract => "extract",
            Self::Emit => "emit",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
