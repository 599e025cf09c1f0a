//! The localization config file (`loc.ini` style).
//!
//! Parsed by hand the way the engine does: a line must start with the
//! case-sensitive head `prefix=` or `csv=`, whitespace is not trimmed, and
//! anything else is ignored.  Each non-empty `csv=` registers a source
//! carrying the last seen `prefix=`; the pending prefix resets after every
//! `csv=` line.

use std::fs;

use crate::csv::encoding::{decode_text, encode_w1252};
use crate::displayout;
use crate::error::Result;

use super::Stringtable;

pub fn read_ini(table: &mut Stringtable, path: &str) -> Result<()> {
    displayout!("[{}]\n", path);
    let bytes = fs::read(path)?;
    let (_, text) = decode_text(&bytes, false)?;

    let mut prefix = String::new();
    for raw in text.split('\n') {
        let line = raw.replace('\r', "");
        if line.is_empty() {
            continue;
        }
        if encode_w1252(&line).is_none() {
            continue;
        }
        if let Some(rest) = line.strip_prefix("prefix=") {
            prefix = rest.to_owned();
            continue;
        }
        if let Some(rest) = line.strip_prefix("csv=") {
            if !rest.is_empty() {
                let i = table.add_source(rest);
                if prefix.is_empty() {
                    prefix = table.sources[i].prefix.clone();
                } else {
                    table.sources[i].set_prefix(&prefix);
                }
                displayout!("{}={}\n", prefix, rest);
            }
            prefix.clear();
        }
    }
    displayout!("\n");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn read_from(content: &str) -> Stringtable {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(content.as_bytes()).unwrap();
        tmp.flush().unwrap();
        let mut table = Stringtable::new();
        read_ini(&mut table, tmp.path().to_str().unwrap()).unwrap();
        table
    }

    #[test]
    fn pairs_prefixes_with_sources() {
        let table = read_from("prefix=menu\ncsv=menu.csv\nprefix=hud\ncsv=hud.csv\n");
        assert_eq!(table.sources.len(), 2);
        assert_eq!(table.sources[0].prefix, "menu");
        assert_eq!(table.sources[0].csv_path, "menu.csv");
        assert_eq!(table.sources[1].prefix, "hud");
    }

    #[test]
    fn prefix_resets_after_each_csv() {
        let table = read_from("prefix=menu\ncsv=a.csv\ncsv=b.csv\n");
        assert_eq!(table.sources[0].prefix, "menu");
        assert_eq!(table.sources[1].prefix, "");
    }

    #[test]
    fn empty_prefix_keeps_an_existing_one() {
        let table = read_from("prefix=menu\ncsv=a.csv\ncsv=a.csv\n");
        assert_eq!(table.sources.len(), 1);
        assert_eq!(table.sources[0].prefix, "menu");
    }

    #[test]
    fn heads_are_case_sensitive_and_untrimmed() {
        let table = read_from("Prefix=menu\ncsv=a.csv\n csv=b.csv\nCSV=c.csv\n");
        assert_eq!(table.sources.len(), 1);
        assert_eq!(table.sources[0].csv_path, "a.csv");
        assert_eq!(table.sources[0].prefix, "");
    }

    #[test]
    fn empty_csv_values_are_ignored() {
        let table = read_from("prefix=menu\ncsv=\ncsv=real.csv\n");
        assert_eq!(table.sources.len(), 1);
        assert_eq!(table.sources[0].csv_path, "real.csv");
        // The pending prefix was consumed by the empty csv= line.
        assert_eq!(table.sources[0].prefix, "");
    }
}
