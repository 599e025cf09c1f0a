//! The hash→identifier map file.
//!
//! Binary tables carry only key hashes; map files restore the display
//! names.  Every non-empty line is `<[prefix:]id>[|…]` — everything after
//! the first `|` (the exported hash) is ignored on read.  Map files are
//! UTF-8, BOM optional.

use std::cmp::Reverse;
use std::fs;

use crate::csv::encoding::encode_w1252;
use crate::error::{FormatError, InputError, Result};
use crate::hash::{hash_name_bytes, hash_to_hex};
use crate::{displaylevel, displayout};

use super::Stringtable;

/// Case-insensitive (ASCII letters) byte-string equality.
fn names_equal(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a.bytes()
            .zip(b.bytes())
            .all(|(x, y)| x.to_ascii_lowercase() == y.to_ascii_lowercase())
}

/// Read a map file into the name dictionary.
///
/// Invalid lines are skipped with a warning; a key colliding with a
/// *different* identifier is fatal and leaves the dictionary untouched.
pub fn read_map(table: &mut Stringtable, path: &str) -> Result<()> {
    displayout!("[{}]\n", path);
    let bytes = fs::read(path)?;
    let body = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(&bytes);
    let text = std::str::from_utf8(body).map_err(|_| FormatError::InvalidUtf8)?;

    let mut lines: Vec<&str> = text.split('\n').collect();
    if lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    let mut staged: Vec<(u32, String)> = Vec::new();
    let mut staged_by_key: std::collections::HashMap<u32, usize> =
        std::collections::HashMap::new();
    let mut valid: u32 = 0;
    for (index, raw) in lines.iter().enumerate() {
        let lno = index as u32 + 1;
        let mut line = raw.replace('\r', "");
        if let Some(cut) = line.find('|') {
            line.truncate(cut);
        }
        if line.is_empty() {
            continue;
        }
        if encode_w1252(&line).is_none() {
            displaylevel!(2, ";warn: invalid characters in {},{}\n", path, lno);
            continue;
        }
        // The id is everything after the first colon (the whole line when
        // there is none); a second colon is malformed.
        let id = match line.split_once(':') {
            Some((_, id)) => id,
            None => line.as_str(),
        };
        if id.is_empty() || id.contains(':') {
            displaylevel!(2, ";warn: invalid identifier in {},{}\n", path, lno);
            continue;
        }
        let key = hash_name_bytes(&encode_w1252(id).unwrap_or_default());

        let existing = staged_by_key
            .get(&key)
            .map(|&i| staged[i].1.as_str())
            .or_else(|| table.map.get(&Reverse(key)).map(String::as_str));
        match existing {
            Some(old) if names_equal(old, &line) => {
                displaylevel!(2, ";info: duplicate entry in {},{}\n", path, lno);
            }
            Some(old) => {
                return Err(InputError::HashConflict {
                    line: lno,
                    hash: key,
                    new_name: line,
                    old_name: old.to_owned(),
                }
                .into());
            }
            None => {
                staged_by_key.insert(key, staged.len());
                staged.push((key, line));
                valid += 1;
            }
        }
    }

    for (key, name) in staged {
        table.map.insert(Reverse(key), name);
    }
    displayout!("idname.lines={}\n", lines.len());
    displayout!("idname.valid={}\n", valid);
    displayout!("idname.count={}\n", table.map.len());
    displayout!("\n");
    Ok(())
}

/// Write `name|hash` lines for every named working key, UTF-8 and LF.
pub fn save_map(table: &Stringtable, path: &str) -> Result<()> {
    displayout!("[{}]\n", path);
    let mut out = String::new();
    let mut count: u32 = 0;
    for (key, name) in &table.ids {
        if name.is_empty() {
            continue;
        }
        out.push_str(name);
        out.push('|');
        out.push_str(&hash_to_hex(key.0));
        out.push('\n');
        count += 1;
    }
    fs::write(path, out)?;
    displayout!("idnames={}\n", count);
    displayout!("\n");
    Ok(())
}
