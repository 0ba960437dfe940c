//! Records produced by a crawl
//!
//! - [`Book`]: a top-level entity discovered on the index page
//! - [`Commentary`]: one chapter commentary extracted from a leaf page
//! - [`Roster`]: the books of one crawl, in discovery order

use crate::emit::{Record, Row, Value};
use crate::identity::{assign_id, EntityId};
use std::collections::HashMap;

/// A top-level entity; immutable once discovered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: EntityId,
    pub name: String,
    /// 0-based discovery order on the index page
    pub index: usize,
}

impl Book {
    pub fn new(name: &str, index: usize) -> Self {
        Self {
            id: assign_id(name),
            name: name.to_string(),
            index,
        }
    }
}

impl Row for Book {
    const TABLE: &'static str = "books";

    fn record(&self) -> Record {
        let mut record = Record::new();
        record.insert("id", Value::from(self.id));
        record.insert("index", Value::from(self.index));
        record.insert("name", Value::from(self.name.as_str()));
        record
    }
}

/// A leaf record: commentary for one chapter of one book
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commentary {
    pub book_id: EntityId,
    pub book_chapter: u32,
    pub content: String,
    pub description: String,
}

impl Row for Commentary {
    const TABLE: &'static str = "commentaries";

    fn record(&self) -> Record {
        let mut record = Record::new();
        record.insert("book_chapter", Value::from(self.book_chapter));
        record.insert("book_id", Value::from(self.book_id));
        record.insert("content", Value::from(self.content.as_str()));
        record.insert("description", Value::from(self.description.as_str()));
        record
    }
}

/// Books of a single crawl with name and ID lookups built once
#[derive(Debug, Clone, Default)]
pub struct Roster {
    books: Vec<Book>,
    by_name: HashMap<String, usize>,
}

impl Roster {
    /// Builds a roster from labels in discovery order
    ///
    /// Blank labels are dropped. A repeated label keeps its first position.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut roster = Self::default();
        for label in labels {
            let name = crate::identity::canonical_name(label.as_ref());
            if name.is_empty() || roster.by_name.contains_key(&name.to_lowercase()) {
                continue;
            }
            let book = Book::new(&name, roster.books.len());
            roster.by_name.insert(name.to_lowercase(), book.index);
            roster.books.push(book);
        }
        roster
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Book> {
        self.books.get(index)
    }

    /// Case-insensitive lookup of a book's discovery index
    pub fn index_of(&self, name: &str) -> Option<usize> {
        let key = crate::identity::canonical_name(name).to_lowercase();
        self.by_name.get(&key).copied()
    }

    /// Returns true if some book in the roster carries `id`
    pub fn contains_id(&self, id: &EntityId) -> bool {
        self.books.iter().any(|b| &b.id == id)
    }
}
