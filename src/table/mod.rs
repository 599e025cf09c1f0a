//! The in-memory string table.
//!
//! Keys are identifier hashes and every ordered view of the key set runs in
//! descending numeric order — the binary layout depends on it, so the maps
//! are keyed by `Reverse(hash)`.  Two name maps exist side by side: `map`
//! is the hash→name dictionary loaded from map files, `ids` is the working
//! key set that actually serializes.  Column rows store only non-empty
//! texts; an absent row is an empty string.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use crate::csv::encoding::encode_w1252;
use crate::ftime::FileTime;
use crate::hash::{hash_name, hash_name_bytes};

pub mod ini;
pub mod map;

/// Identifier hash over the Windows-1252 byte form of a name.
///
/// Falls back to the UTF-8 bytes for names outside Windows-1252; the
/// readers validate convertibility first, so the fallback only affects
/// internal idempotency lookups.
pub(crate) fn name_hash(name: &str) -> u32 {
    match encode_w1252(name) {
        Some(bytes) => hash_name_bytes(&bytes),
        None => hash_name(name),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sources and columns
// ─────────────────────────────────────────────────────────────────────────────

/// One contributing CSV file.
#[derive(Debug, Clone)]
pub struct Source {
    pub csv_path: String,
    pub csv_hash: u32,
    pub prefix: String,
    pub prefix_hash: u32,
    pub modified: FileTime,
}

impl Source {
    fn new(csv_path: &str) -> Source {
        Source {
            csv_path: csv_path.to_owned(),
            csv_hash: name_hash(csv_path),
            prefix: String::new(),
            prefix_hash: 0,
            modified: FileTime::default(),
        }
    }

    /// An empty prefix hashes to 0, never to the hash of `""`.
    pub fn set_prefix(&mut self, prefix: &str) {
        self.prefix = prefix.to_owned();
        self.prefix_hash = if prefix.is_empty() {
            0
        } else {
            name_hash(prefix)
        };
    }
}

/// One named set of localized texts.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub name_hash: u32,
    /// Non-empty texts only, in descending key order.
    pub rows: BTreeMap<Reverse<u32>, String>,
}

impl Column {
    fn new(name: &str) -> Column {
        Column {
            name: name.to_owned(),
            name_hash: name_hash(name),
            rows: BTreeMap::new(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// The table
// ─────────────────────────────────────────────────────────────────────────────

/// The aggregate every command reads or mutates.
#[derive(Debug, Default)]
pub struct Stringtable {
    /// Hash→name dictionary from map files.
    pub map: BTreeMap<Reverse<u32>, String>,
    /// Working key set; names may be empty (hash-only keys).
    pub ids: BTreeMap<Reverse<u32>, String>,
    pub sources: Vec<Source>,
    pub columns: Vec<Column>,
}

impl Stringtable {
    pub fn new() -> Self {
        Stringtable::default()
    }

    /// Reset to the empty state.
    pub fn clear(&mut self) {
        self.map.clear();
        self.ids.clear();
        self.sources.clear();
        self.columns.clear();
    }

    /// Register a source CSV; idempotent on the path's name hash.
    pub fn add_source(&mut self, csv_path: &str) -> usize {
        let hash = name_hash(csv_path);
        if let Some(i) = self.sources.iter().position(|s| s.csv_hash == hash) {
            return i;
        }
        self.sources.push(Source::new(csv_path));
        self.sources.len() - 1
    }

    /// Register a column; idempotent on the name hash.
    pub fn add_column(&mut self, name: &str) -> usize {
        let hash = name_hash(name);
        if let Some(i) = self.columns.iter().position(|c| c.name_hash == hash) {
            return i;
        }
        self.columns.push(Column::new(name));
        self.columns.len() - 1
    }

    /// Working keys in descending hash order.
    pub fn keys(&self) -> impl Iterator<Item = u32> + '_ {
        self.ids.keys().map(|r| r.0)
    }

    /// The display name for a key: `prefix:id`, bare id, or empty.
    pub fn id_name(&self, key: u32) -> Option<&str> {
        self.ids.get(&Reverse(key)).map(String::as_str)
    }
}
