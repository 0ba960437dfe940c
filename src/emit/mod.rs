//! Statement emission
//!
//! This module turns extracted records into SQL statements and appends them
//! to the right artifact:
//! - `statement`: statement model, literal escaping and the [`Row`] trait
//! - `artifact`: header-once, append-only statement files

mod artifact;
mod statement;

pub use artifact::{
    append_statement, artifact_file_name, create_artifact, header_line, StatementEmitter,
    BOOKS_HEADER, BOOK_COUNTS_HEADER, COMMENTARIES_HEADER,
};
pub use statement::{quote_ident, quote_text, Record, Row, Statement, Value};
