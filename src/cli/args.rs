//! The left-to-right command scanner.
//!
//! The command line is a sequence of `--command [argument]…` groups; every
//! word up to the next `--` word belongs to the current command.  Commands
//! execute in order against one shared table, so the scanner yields them
//! lazily — anything after `--exit` is never even validated.

use crate::error::InputError;

/// One scanned command with its positional arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub args: Vec<String>,
}

/// Lazy scanner over `argv` (program name already stripped).
pub struct CommandStream {
    argv: std::vec::IntoIter<String>,
    pending: Option<String>,
}

impl CommandStream {
    pub fn new(argv: Vec<String>) -> Self {
        CommandStream {
            argv: argv.into_iter(),
            pending: None,
        }
    }

    fn next_word(&mut self) -> Option<String> {
        self.pending.take().or_else(|| self.argv.next())
    }
}

fn is_command_word(word: &str) -> bool {
    word.len() > 2 && word.starts_with("--")
}

impl Iterator for CommandStream {
    type Item = Result<Command, InputError>;

    fn next(&mut self) -> Option<Self::Item> {
        let word = self.next_word()?;
        if !is_command_word(&word) {
            return Some(Err(InputError::UnknownCommand(word)));
        }
        let name = word[2..].to_owned();
        let mut args = Vec::new();
        for arg in self.argv.by_ref() {
            if is_command_word(&arg) {
                self.pending = Some(arg);
                break;
            }
            args.push(arg);
        }
        Some(Ok(Command { name, args }))
    }
}

/// `args[index]`, or `default` when the argument was omitted.
pub fn arg_or<'a>(args: &'a [String], index: usize, default: &'a str) -> &'a str {
    args.get(index).map(String::as_str).unwrap_or(default)
}

/// Strict decimal parse: every digit counts, no signs, no leading junk.
pub fn parse_decimal(arg: &str) -> Option<u32> {
    if arg.is_empty() || !arg.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    arg.parse().ok()
}
