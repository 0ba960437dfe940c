//! Append-only statement files
//!
//! Every artifact starts with a single `-- <title>` comment line written
//! exactly once, followed by one statement per line. Files are only ever
//! created or appended to, and each append is a separate open/write/close,
//! so a run that dies halfway leaves every line it wrote intact.

use crate::emit::statement::Statement;
use crate::{HarvestError, Result};
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Header title of the book roster
pub const BOOKS_HEADER: &str = "Books";

/// Header title of per-book and combined commentary scripts
pub const COMMENTARIES_HEADER: &str = "Commentaries";

/// Header title of the count reconciliation script
pub const BOOK_COUNTS_HEADER: &str = "Book Counts";

/// Formats the single header comment line of an artifact
pub fn header_line(title: &str) -> String {
    format!("-- {}\n", title)
}

/// Creates (or truncates) an artifact and writes its header line
pub fn create_artifact(path: &Path, title: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| HarvestError::artifact(parent, e))?;
    }
    fs::write(path, header_line(title)).map_err(|e| HarvestError::artifact(path, e))
}

/// Appends one statement and its line terminator to an existing artifact
pub fn append_statement(path: &Path, statement: &Statement) -> Result<()> {
    let mut file = OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(|e| HarvestError::artifact(path, e))?;
    writeln!(file, "{}", statement).map_err(|e| HarvestError::artifact(path, e))
}

/// Maps an entity name to a file name that cannot escape its directory
pub fn artifact_file_name(name: &str) -> String {
    let safe: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let safe = if safe.is_empty() || safe.chars().all(|c| c == '.') {
        format!("_{}", safe)
    } else {
        safe
    };

    format!("{}.sql", safe)
}

/// Routes statements to one artifact per owning entity
///
/// An entity's artifact gets its header the first time the emitter sees
/// that entity in this run; after that it is only appended to. Entities
/// are matched by case-insensitive file name, so names differing only in
/// case share the artifact of whichever was seen first and never truncate
/// each other on case-insensitive filesystems.
#[derive(Debug)]
pub struct StatementEmitter {
    dir: PathBuf,
    title: String,
    initialized: HashMap<String, PathBuf>,
}

impl StatementEmitter {
    pub fn new(dir: impl Into<PathBuf>, title: &str) -> Self {
        Self {
            dir: dir.into(),
            title: title.to_string(),
            initialized: HashMap::new(),
        }
    }

    /// Path of the artifact for `entity`
    pub fn artifact_path(&self, entity: &str) -> PathBuf {
        let file_name = artifact_file_name(entity);
        match self.initialized.get(&file_name.to_lowercase()) {
            Some(path) => path.clone(),
            None => self.dir.join(file_name),
        }
    }

    /// Returns true if `entity`'s artifact was initialised in this run
    pub fn is_initialized(&self, entity: &str) -> bool {
        self.initialized
            .contains_key(&artifact_file_name(entity).to_lowercase())
    }

    /// Writes the header of `entity`'s artifact, truncating any older file
    ///
    /// Does nothing if the artifact was already initialised in this run.
    pub fn init_artifact(&mut self, entity: &str) -> Result<PathBuf> {
        let key = artifact_file_name(entity).to_lowercase();
        if let Some(path) = self.initialized.get(&key) {
            return Ok(path.clone());
        }

        let path = self.artifact_path(entity);
        create_artifact(&path, &self.title)?;
        self.initialized.insert(key, path.clone());
        Ok(path)
    }

    /// Writes a header-only artifact for `entity` unless a file already exists
    ///
    /// Existing files are left untouched and the entity is not marked as
    /// initialised, so output from an earlier run survives.
    pub fn ensure_artifact(&mut self, entity: &str) -> Result<PathBuf> {
        let path = self.artifact_path(entity);
        if !self.is_initialized(entity) && !path.exists() {
            create_artifact(&path, &self.title)?;
        }
        Ok(path)
    }

    /// Appends `statement` to `entity`'s artifact
    pub fn emit(&mut self, entity: &str, statement: &Statement) -> Result<()> {
        if !self.is_initialized(entity) {
            tracing::debug!(
                "Initialising artifact {} on first write",
                self.artifact_path(entity).display()
            );
        }
        let path = self.init_artifact(entity)?;
        append_statement(&path, statement)
    }
}
