//! Packer/unpacker for Genome-engine localized string table binaries.
//!
//! The library side of the `loctab` tool.  A string table is built from
//! pipe-delimited source CSVs and a hash→identifier map, packed into a
//! single self-describing binary whose per-column dictionary decoder the
//! engine walks at run time, and unpacked back to the same sources.
//!
//! Module map:
//!
//! - [`table`] — the in-memory model all commands share
//! - [`csv`], [`table::map`], [`table::ini`] — the text-file collaborators
//! - [`archive`] — endian-aware primitives: reader, writer, null sink
//! - [`container`] — the binary layout on top of them
//! - [`codec`] — the five column compressors and the decoder
//! - [`tree`] — the generalized suffix tree behind the `tree`/`best` levels
//! - [`cli`] — the command scanner and display plumbing for the binary

pub mod archive;
pub mod cli;
pub mod codec;
pub mod container;
pub mod csv;
pub mod error;
pub mod ftime;
pub mod hash;
pub mod table;
pub mod tree;

pub use error::{Error, FormatError, InputError, Result};
pub use table::Stringtable;
