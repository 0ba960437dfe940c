//! Chapter count reconciliation
//!
//! Recomputes each book's chapter count from previously exported seed data
//! (one JSON file per book) and writes one `update ... where "id" = ...`
//! statement per book. Runs as a separate batch pass after the crawl.

use crate::emit::{
    append_statement, create_artifact, Record, Row, Statement, Value, BOOK_COUNTS_HEADER,
};
use crate::identity::{assign_id, EntityId};
use crate::model::Book;
use crate::{HarvestError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Chapters of an exported book, keyed by chapter number or listed in order
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Chapters {
    Keyed(serde_json::Map<String, serde_json::Value>),
    Listed(Vec<serde_json::Value>),
}

impl Chapters {
    pub fn len(&self) -> usize {
        match self {
            Self::Keyed(map) => map.len(),
            Self::Listed(list) => list.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One exported book
#[derive(Debug, Clone, Deserialize)]
pub struct SeedBook {
    pub book: String,
    pub chapters: Chapters,
}

impl SeedBook {
    pub fn id(&self) -> EntityId {
        assign_id(&self.book)
    }

    /// The count update for this book
    pub fn count_statement(&self) -> Statement {
        let mut record = Record::new();
        record.insert("count", Value::from(self.chapters.len()));
        Statement::update_by_id(Book::TABLE, self.id(), record)
    }
}

/// What a reconcile pass wrote
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// (book name, chapter count), in roster order
    pub counts: Vec<(String, usize)>,
}

/// File name of a book's seed data: the name with spaces removed
pub fn seed_file_name(name: &str) -> String {
    format!("{}.json", name.replace(' ', ""))
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path).map_err(|e| HarvestError::artifact(path, e))?;
    serde_json::from_str(&contents).map_err(|source| HarvestError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads the agreed roster: a JSON array of book names
pub fn load_roster_list(path: &Path) -> Result<Vec<String>> {
    read_json(path)
}

/// Loads one book's seed data
pub fn load_seed_book(path: &Path) -> Result<SeedBook> {
    read_json(path)
}

/// Writes a count update for every book in the roster list
///
/// # Arguments
///
/// * `roster_path` - JSON array of book names
/// * `seed_dir` - Directory of `<NameWithoutSpaces>.json` files
/// * `output` - Script to (over)write
///
/// # Returns
///
/// * `Ok(ReconcileReport)` - One entry per roster book
/// * `Err(HarvestError)` - A roster or seed file is missing or malformed,
///   or the script could not be written
pub fn reconcile(roster_path: &Path, seed_dir: &Path, output: &Path) -> Result<ReconcileReport> {
    let names = load_roster_list(roster_path)?;
    create_artifact(output, BOOK_COUNTS_HEADER)?;

    let mut report = ReconcileReport::default();
    for name in &names {
        let path: PathBuf = seed_dir.join(seed_file_name(name));
        let seed = load_seed_book(&path)?;

        if assign_id(name) != seed.id() {
            tracing::warn!(
                "Seed file {} names '{}' but the roster lists '{}'; using '{}'",
                path.display(),
                seed.book,
                name,
                seed.book
            );
        }

        append_statement(output, &seed.count_statement())?;
        tracing::debug!("{}: {} chapters", seed.book, seed.chapters.len());
        report.counts.push((seed.book.clone(), seed.chapters.len()));
    }

    tracing::info!(
        "Wrote {} count updates to {}",
        report.counts.len(),
        output.display()
    );
    Ok(report)
}
