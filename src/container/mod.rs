//! The binary container: a self-describing little- or big-endian file with
//! a fixed header, a source manifest, a column-name index, a key table, and
//! per-column string/symbol tables addressed by `(offset, size)`
//! references.

pub mod header;
pub mod read;
pub mod write;

pub use header::TableHeader;
pub use read::read_bin;
pub use write::save_bin;
