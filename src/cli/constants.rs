//! Program identity, per-command defaults, and display infrastructure.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::archive::Platform;

// ── Identity ──────────────────────────────────────────────────────────────────

pub const PROGRAM_NAME: &str = "loctab";
pub const PROGRAM_DESC: &str = "string table [un]packer";
pub const PROGRAM_VERSION: &str = env!("CARGO_PKG_VERSION");

// ── Command defaults ──────────────────────────────────────────────────────────

pub const DEFAULT_INI: &str = "loc.ini";
pub const DEFAULT_BIN: &str = "w_strings.bin";
pub const DEFAULT_MAP: &str = "idnames.csv";
/// Fallback source when unpacking a table that names none.
pub const DEFAULT_CSV: &str = "strings.csv";
pub const DEFAULT_PREFIX: &str = "default";
pub const DEFAULT_PLATFORM: Platform = Platform::X64;
pub const DEFAULT_LEVEL: &str = "9";
pub const DEFAULT_UTF: &str = "1";
/// Legacy column filter, accepted and ignored.
pub const DEFAULT_FILTER: &str = "*_Text;*_StageDir";

// ── Display level ─────────────────────────────────────────────────────────────
//
// 0 = silent; 1 = errors only; 2 = normal (warnings and reports).

pub static DISPLAY_LEVEL: AtomicU32 = AtomicU32::new(2);

#[inline]
pub fn display_level() -> u32 {
    DISPLAY_LEVEL.load(Ordering::Relaxed)
}

#[inline]
pub fn set_display_level(level: u32) {
    DISPLAY_LEVEL.store(level, Ordering::Relaxed);
}

/// Print an operation report line to stdout.
#[macro_export]
macro_rules! displayout {
    ($($arg:tt)*) => {
        if $crate::cli::constants::display_level() >= 2 {
            print!($($arg)*)
        }
    };
}

/// Print to stderr unconditionally.
#[macro_export]
macro_rules! display {
    ($($arg:tt)*) => { eprint!($($arg)*) };
}

/// Print to stderr when the display level is at least `$l`.
#[macro_export]
macro_rules! displaylevel {
    ($l:expr, $($arg:tt)*) => {
        if $crate::cli::constants::display_level() >= $l {
            eprint!($($arg)*)
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_level_reports() {
        assert!(display_level() >= 1);
    }

    #[test]
    fn defaults_are_consistent() {
        assert_eq!(DEFAULT_PLATFORM, Platform::X64);
        assert_eq!(DEFAULT_LEVEL.parse::<u32>().unwrap(), 9);
        assert_eq!(DEFAULT_UTF, "1");
    }
}
