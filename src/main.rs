//! Binary entry point for the `loctab` command-line tool.
//!
//! Commands execute left to right against one shared [`Stringtable`]; the
//! first error aborts the run with a non-zero exit code and a
//! `;fail: (<kind>) <message>` line on stderr.  `--exit` stops early with
//! the current (successful) status; everything after it is ignored.

use anyhow::anyhow;

use loctab::archive::Platform;
use loctab::cli::args::{arg_or, parse_decimal, Command, CommandStream};
use loctab::cli::constants::{
    DEFAULT_BIN, DEFAULT_FILTER, DEFAULT_INI, DEFAULT_LEVEL, DEFAULT_MAP, DEFAULT_PLATFORM,
    DEFAULT_UTF,
};
use loctab::cli::help::{print_help, print_version};
use loctab::codec::Compression;
use loctab::csv::encoding::encode_w1252;
use loctab::{container, csv, table, Error, InputError, Stringtable};

/// Outcome of one command: keep going or stop the run successfully.
enum Flow {
    Continue,
    Exit,
}

fn too_many(cmd: &Command, max: usize) -> Result<(), Error> {
    if cmd.args.len() > max {
        return Err(InputError::TooManyArguments(cmd.name.clone()).into());
    }
    Ok(())
}

fn dispatch(table: &mut Stringtable, cmd: &Command) -> Result<Flow, Error> {
    match cmd.name.as_str() {
        "version" => {
            print_version();
            too_many(cmd, 0)?;
        }
        "help" => {
            print_help();
            too_many(cmd, 0)?;
        }
        "exit" => {
            // Remaining arguments and commands are ignored.
            return Ok(Flow::Exit);
        }
        "clear" => {
            table.clear();
        }
        "read-ini" => {
            too_many(cmd, 1)?;
            table::ini::read_ini(table, arg_or(&cmd.args, 0, DEFAULT_INI))?;
        }
        "read-csv" => {
            too_many(cmd, 1)?;
            let utf = match arg_or(&cmd.args, 0, DEFAULT_UTF) {
                "0" => false,
                "1" => true,
                other => return Err(InputError::InvalidUtfFlag(other.to_owned()).into()),
            };
            csv::read_csv(table, utf)?;
        }
        "save-map" => {
            too_many(cmd, 1)?;
            table::map::save_map(table, arg_or(&cmd.args, 0, DEFAULT_MAP))?;
        }
        "save-bin" => {
            too_many(cmd, 5)?;
            let plat_arg = arg_or(&cmd.args, 0, DEFAULT_PLATFORM.name());
            let platform = Platform::from_name(plat_arg)
                .ok_or_else(|| InputError::InvalidPlatform(plat_arg.to_owned()))?;
            // An omitted version derives from the platform's endianness.
            let version = match cmd.args.get(1) {
                None => 0,
                Some(arg) => match parse_decimal(arg) {
                    Some(v @ 5..=255) => v as u8,
                    _ => return Err(InputError::InvalidVersion(arg.clone()).into()),
                },
            };
            let path = arg_or(&cmd.args, 2, DEFAULT_BIN);
            let level_arg = arg_or(&cmd.args, 3, DEFAULT_LEVEL);
            let comp = parse_decimal(level_arg)
                .and_then(Compression::from_level)
                .ok_or_else(|| InputError::InvalidLevel(level_arg.to_owned()))?;
            // The legacy column filter is accepted and ignored.
            let filter = arg_or(&cmd.args, 4, DEFAULT_FILTER);
            let _ = encode_w1252(filter)
                .ok_or_else(|| InputError::InvalidFilter(filter.to_owned()))?;
            container::save_bin(table, platform, version, path, comp)?;
        }
        "read-map" => {
            too_many(cmd, 1)?;
            table::map::read_map(table, arg_or(&cmd.args, 0, DEFAULT_MAP))?;
        }
        "read-bin" => {
            too_many(cmd, 1)?;
            container::read_bin(table, arg_or(&cmd.args, 0, DEFAULT_BIN))?;
        }
        "save-csv" => {
            too_many(cmd, 0)?;
            csv::save_csv(table)?;
        }
        other => return Err(InputError::UnknownCommand(other.to_owned()).into()),
    }
    Ok(Flow::Continue)
}

fn run(argv: Vec<String>) -> anyhow::Result<()> {
    if argv.is_empty() {
        print_help();
        return Err(anyhow!("no commands given"));
    }
    let mut table = Stringtable::new();
    for cmd in CommandStream::new(argv) {
        let cmd = cmd?;
        match dispatch(&mut table, &cmd)? {
            Flow::Continue => {}
            Flow::Exit => break,
        }
    }
    Ok(())
}

fn main() {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    if let Err(err) = run(argv) {
        let kind = err
            .downcast_ref::<Error>()
            .map(Error::kind)
            .unwrap_or("input");
        eprintln!(";fail: ({kind}) {err}");
        std::process::exit(1);
    }
}
