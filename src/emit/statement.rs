//! Idempotent-intent SQL statements in the PostgreSQL dialect
//!
//! Identifiers are double-quoted, columns are written in alphabetical order
//! and text literals are escaped the way the downstream loader expects:
//! single quotes are doubled, and any text containing a backslash doubles
//! it and switches to an `E'...'` literal.

use crate::identity::EntityId;
use std::collections::BTreeMap;
use std::fmt;

/// A single column value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Integer(i64),
    Id(EntityId),
}

impl Value {
    /// Renders the value as a SQL literal
    pub fn to_sql(&self) -> String {
        match self {
            Self::Text(text) => quote_text(text),
            Self::Integer(n) => n.to_string(),
            Self::Id(id) => format!("'{}'", id),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Self::Integer(value as i64)
    }
}

impl From<EntityId> for Value {
    fn from(value: EntityId) -> Self {
        Self::Id(value)
    }
}

/// Column name to value; ordered so output is byte-stable
pub type Record = BTreeMap<&'static str, Value>;

/// A row type that knows its target relation
pub trait Row {
    /// Relation the row is inserted into
    const TABLE: &'static str;

    /// Column values for an insert
    fn record(&self) -> Record;

    /// Builds the insert statement for this row
    fn insert_statement(&self) -> Statement {
        Statement::insert(Self::TABLE, self.record())
    }
}

/// A data-mutation statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// Inserts a new row
    Insert { table: String, record: Record },

    /// Sets columns on the row with the given primary key
    UpdateById {
        table: String,
        id: EntityId,
        record: Record,
    },
}

impl Statement {
    pub fn insert(table: &str, record: Record) -> Self {
        Self::Insert {
            table: table.to_string(),
            record,
        }
    }

    pub fn update_by_id(table: &str, id: EntityId, record: Record) -> Self {
        Self::UpdateById {
            table: table.to_string(),
            id,
            record,
        }
    }

    /// Renders the statement without a trailing terminator
    pub fn to_sql(&self) -> String {
        match self {
            Self::Insert { table, record } => {
                let columns = record
                    .keys()
                    .map(|c| quote_ident(c))
                    .collect::<Vec<_>>()
                    .join(", ");
                let values = record
                    .values()
                    .map(Value::to_sql)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!(
                    "insert into {} ({}) values ({})",
                    quote_ident(table),
                    columns,
                    values
                )
            }
            Self::UpdateById { table, id, record } => {
                let assignments = record
                    .iter()
                    .map(|(c, v)| format!("{} = {}", quote_ident(c), v.to_sql()))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!(
                    "update {} set {} where \"id\" = '{}'",
                    quote_ident(table),
                    assignments,
                    id
                )
            }
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};", self.to_sql())
    }
}

/// Double-quotes an identifier
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Single-quotes a text literal
///
/// NUL characters cannot be stored in PostgreSQL text and are dropped.
pub fn quote_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 3);
    let mut has_backslash = false;

    out.push('\'');
    for c in text.chars() {
        match c {
            '\'' => out.push_str("''"),
            '\\' => {
                out.push_str("\\\\");
                has_backslash = true;
            }
            '\0' => {}
            _ => out.push(c),
        }
    }
    out.push('\'');

    if has_backslash {
        format!("E{}", out)
    } else {
        out
    }
}
