//! Deterministic, content-addressed entity identifiers
//!
//! Every book gets an ID derived purely from its name, so the roster file,
//! the per-book commentary files and the count reconciliation pass can all
//! agree on foreign keys without sharing a database connection.
//!
//! The scheme is pinned by [`HASH_VERSION`]. Changing it invalidates every
//! ID that was ever emitted, so it is never inferred at runtime.

use std::fmt;
use uuid::{Builder, Uuid};

/// Name-hashing scheme used to derive entity IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashVersion {
    /// UUID version 3: MD5 over the UTF-8 bytes of the canonical name,
    /// with no namespace prefix.
    V3,
}

impl HashVersion {
    /// The UUID version number this scheme stamps into generated IDs
    pub fn as_u8(&self) -> u8 {
        match self {
            Self::V3 => 3,
        }
    }
}

/// The hash version every ID in this crate is derived with
pub const HASH_VERSION: HashVersion = HashVersion::V3;

/// A deterministic entity identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(Uuid);

impl EntityId {
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Canonicalises a name before hashing
///
/// Leading and trailing whitespace is dropped and internal whitespace runs
/// collapse to a single space, so a name scraped from a link label and the
/// same name scraped from a page header hash identically.
pub fn canonical_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Derives the entity ID for `name` with the pinned [`HASH_VERSION`]
///
/// # Example
///
/// ```
/// use commentary_harvest::identity::assign_id;
///
/// assert_eq!(assign_id("Genesis"), assign_id("Genesis"));
/// assert_eq!(
///     assign_id("Genesis").to_string(),
///     "411f3239-ffbe-3d44-abd0-8ac9eaec6489"
/// );
/// ```
pub fn assign_id(name: &str) -> EntityId {
    assign_id_with(name, HASH_VERSION)
}

/// Derives the entity ID for `name` with an explicit hash version
pub fn assign_id_with(name: &str, version: HashVersion) -> EntityId {
    let canonical = canonical_name(name);
    match version {
        HashVersion::V3 => {
            let digest = md5::compute(canonical.as_bytes());
            EntityId(Builder::from_md5_bytes(digest.0).into_uuid())
        }
    }
}
