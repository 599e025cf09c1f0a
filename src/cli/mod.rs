//! Command-line surface: scanner, defaults, display macros, help text.

pub mod args;
pub mod constants;
pub mod help;
