//! Error taxonomy shared by every fallible operation in the crate.
//!
//! Three families surface through the single [`Error`] type:
//!
//! - [`Error::Io`] — underlying filesystem/stream failures, propagated
//!   without recovery.
//! - [`Error::Format`] — structural violations while parsing a file.  The
//!   partial side effects of the failed command are discarded; callers stage
//!   parsed data and merge only on success.
//! - [`Error::Input`] — command-line or CSV-content misuse, reported with
//!   the offending line number where one exists.
//!
//! A full symbol table during packing is *not* an error — the encoders
//! restart their current chain instead.

use std::fmt;
use std::io;

// ─────────────────────────────────────────────────────────────────────────────
// Format errors
// ─────────────────────────────────────────────────────────────────────────────

/// Structural violation found while parsing a binary table, CSV, or map file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The file does not start with the expected archive signature.
    BadSignature,
    /// The archive or table version byte is unsupported.
    BadVersion,
    /// The endianness byte in the archive header is not 0x10 or 0x20.
    BadEndian,
    /// The fixed header could not be read in full.
    TruncatedHeader,
    /// A section offset points outside the file or before the header.
    BadOffset(&'static str),
    /// A referenced section is shorter than its declared contents.
    TruncatedSection(&'static str),
    /// A string offset in `str_tab` points past the sequence table.
    BadSequenceIndex,
    /// A sequence entry names a symbol outside the symbol table.
    BadSymbolIndex,
    /// A symbol expands to a NUL character.
    NullCharInSymbol,
    /// A sequence ran past the end of the sequence table without terminator.
    UnterminatedSequence,
    /// A symbol chain exceeds the decoder's depth ceiling.
    SymbolChainTooLong,
    /// Invalid UTF-8 (including overlong encodings) in a text file.
    InvalidUtf8,
    /// An unpaired UTF-16 surrogate in decoded text.
    UnpairedSurrogate,
}

impl FormatError {
    /// Stable identifier used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            FormatError::BadSignature => "BadSignature",
            FormatError::BadVersion => "BadVersion",
            FormatError::BadEndian => "BadEndian",
            FormatError::TruncatedHeader => "TruncatedHeader",
            FormatError::BadOffset(_) => "BadOffset",
            FormatError::TruncatedSection(_) => "TruncatedSection",
            FormatError::BadSequenceIndex => "BadSequenceIndex",
            FormatError::BadSymbolIndex => "BadSymbolIndex",
            FormatError::NullCharInSymbol => "NullCharInSymbol",
            FormatError::UnterminatedSequence => "UnterminatedSequence",
            FormatError::SymbolChainTooLong => "SymbolChainTooLong",
            FormatError::InvalidUtf8 => "InvalidUtf8",
            FormatError::UnpairedSurrogate => "UnpairedSurrogate",
        }
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::BadSignature => write!(f, "invalid archive signature"),
            FormatError::BadVersion => write!(f, "unsupported version"),
            FormatError::BadEndian => write!(f, "invalid archive endianness"),
            FormatError::TruncatedHeader => write!(f, "failed to read header"),
            FormatError::BadOffset(what) => write!(f, "invalid {what} offset"),
            FormatError::TruncatedSection(what) => write!(f, "invalid {what} reference"),
            FormatError::BadSequenceIndex => write!(f, "invalid string sequence index"),
            FormatError::BadSymbolIndex => write!(f, "invalid string symbol index"),
            FormatError::NullCharInSymbol => write!(f, "invalid string symbol character"),
            FormatError::UnterminatedSequence => write!(f, "unterminated string sequence"),
            FormatError::SymbolChainTooLong => write!(f, "string symbol chain too long"),
            FormatError::InvalidUtf8 => write!(f, "invalid UTF-8 encoding"),
            FormatError::UnpairedSurrogate => write!(f, "unpaired UTF-16 surrogate"),
        }
    }
}

impl std::error::Error for FormatError {}

// ─────────────────────────────────────────────────────────────────────────────
// Input errors
// ─────────────────────────────────────────────────────────────────────────────

/// Command-line or CSV-content misuse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// An unrecognized command word.
    UnknownCommand(String),
    /// More positional arguments than the command accepts.
    TooManyArguments(String),
    /// A platform name outside the accepted set.
    InvalidPlatform(String),
    /// A table version outside 5..=255.
    InvalidVersion(String),
    /// A compression level outside 0..=9.
    InvalidLevel(String),
    /// A UTF flag other than 0 or 1.
    InvalidUtfFlag(String),
    /// An unconvertible legacy column filter argument.
    InvalidFilter(String),
    /// A CSV column name that is empty, unconvertible, or reserved.
    InvalidColumnName { line: u32 },
    /// The same column appears twice in one CSV header.
    DuplicateColumn { line: u32 },
    /// A CSV record with more fields than the header declares.
    TooManyFields { line: u32 },
    /// A CSV record whose identifier field is empty or unconvertible.
    InvalidIdentifier { line: u32 },
    /// A NUL character inside a CSV record.
    NulInRecord { line: u32 },
    /// Two distinct identifiers hash to the same key.
    HashConflict {
        line: u32,
        hash: u32,
        new_name: String,
        old_name: String,
    },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::UnknownCommand(cmd) => write!(f, "unsupported command '{cmd}'"),
            InputError::TooManyArguments(cmd) => write!(f, "too many arguments for --{cmd}"),
            InputError::InvalidPlatform(name) => write!(f, "invalid target platform '{name}'"),
            InputError::InvalidVersion(arg) => write!(f, "invalid string table version '{arg}'"),
            InputError::InvalidLevel(arg) => write!(f, "invalid compression level '{arg}'"),
            InputError::InvalidUtfFlag(arg) => write!(f, "invalid UTF flag '{arg}'"),
            InputError::InvalidFilter(arg) => write!(f, "invalid column filter '{arg}'"),
            InputError::InvalidColumnName { line } => {
                write!(f, "invalid csv column name in line {line}")
            }
            InputError::DuplicateColumn { line } => {
                write!(f, "duplicate csv column name in line {line}")
            }
            InputError::TooManyFields { line } => {
                write!(f, "too many csv fields in line {line}")
            }
            InputError::InvalidIdentifier { line } => {
                write!(f, "invalid csv id in line {line}")
            }
            InputError::NulInRecord { line } => {
                write!(f, "NUL character in csv line {line}")
            }
            InputError::HashConflict {
                line,
                hash,
                new_name,
                old_name,
            } => write!(
                f,
                "hash conflict in line {line} ({hash:08x}|{new_name}|{old_name})"
            ),
        }
    }
}

impl std::error::Error for InputError {}

// ─────────────────────────────────────────────────────────────────────────────
// Unified error
// ─────────────────────────────────────────────────────────────────────────────

/// Any failure surfaced by the library.
#[derive(Debug)]
pub enum Error {
    /// Filesystem or stream failure.
    Io(io::Error),
    /// Structural violation in a parsed file.
    Format(FormatError),
    /// Command-line or CSV-content misuse.
    Input(InputError),
}

impl Error {
    /// Short family name, printed in the CLI failure report.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Io(_) => "io",
            Error::Format(_) => "format",
            Error::Input(_) => "input",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "{e}"),
            Error::Format(e) => write!(f, "{e}"),
            Error::Input(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Format(e) => Some(e),
            Error::Input(e) => Some(e),
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<FormatError> for Error {
    fn from(e: FormatError) -> Self {
        Error::Format(e)
    }
}

impl From<InputError> for Error {
    fn from(e: InputError) -> Self {
        Error::Input(e)
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
