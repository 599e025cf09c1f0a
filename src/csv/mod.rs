//! Pipe-delimited CSV layer.
//!
//! Records are LF-terminated, fields are separated by `|`, and there is no
//! quoting — five escape sequences cover the metacharacters:
//!
//! | text | wire |
//! |------|------|
//! | `@`  | `\a` |
//! | LF   | `\n` |
//! | CR   | `\r` |
//! | `\`  | `\\` |
//! | `\|` | `\v` |
//!
//! An unknown escape keeps its backslash literally.  CR bytes are dropped
//! before records are split, NUL is rejected.  The first record names the
//! columns; the first field of every data record is an identifier or an
//! eight-digit hex key.
//!
//! Reading stages a whole file before the model is touched, so a failed
//! file leaves the table as it was.

use std::cmp::Reverse;
use std::fs;
use std::path::Path;

use crate::cli::constants::{DEFAULT_CSV, DEFAULT_PREFIX};
use crate::error::{InputError, Result};
use crate::ftime::FileTime;
use crate::hash::{hash_name_bytes, hash_to_hex, hex_to_hash};
use crate::table::{name_hash, Stringtable};
use crate::{displaylevel, displayout};

pub mod encoding;

use encoding::{decode_text, encode_w1252, Encoding};

// ─────────────────────────────────────────────────────────────────────────────
// Record escapes
// ─────────────────────────────────────────────────────────────────────────────

/// Append `text` to `out` with the wire escapes applied.
pub fn escape_field(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '@' => out.push_str("\\a"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\\' => out.push_str("\\\\"),
            '|' => out.push_str("\\v"),
            _ => out.push(c),
        }
    }
}

/// Split one record into unescaped fields.
pub fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut esc = false;
    for c in line.chars() {
        if c == '\\' {
            if esc {
                field.push('\\');
                esc = false;
                continue;
            }
            esc = true;
            continue;
        }
        if c == '|' {
            if esc {
                field.push('\\');
                esc = false;
            }
            fields.push(std::mem::take(&mut field));
            continue;
        }
        if esc {
            esc = false;
            match c {
                'a' => {
                    field.push('@');
                    continue;
                }
                'n' => {
                    field.push('\n');
                    continue;
                }
                'r' => {
                    field.push('\r');
                    continue;
                }
                'v' => {
                    field.push('|');
                    continue;
                }
                _ => field.push('\\'),
            }
        }
        field.push(c);
    }
    fields.push(field);
    fields
}

/// Records of a decoded file: CR dropped, trailing empty record removed.
fn records(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = text
        .split('\n')
        .map(|l| l.replace('\r', ""))
        .collect();
    if lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

// ─────────────────────────────────────────────────────────────────────────────
// Reading
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct StagedRow {
    hash: u32,
    name: String,
    /// `(column slot, text)` for the record's non-empty cells.
    cells: Vec<(usize, String)>,
}

#[derive(Debug)]
struct StagedCsv {
    columns: Vec<String>,
    rows: Vec<StagedRow>,
    records: u32,
    unnamed: u32,
}

/// Read every registered source CSV into the table.
///
/// `utf` enables BOM-less encoding detection from the first two octets.
pub fn read_csv(table: &mut Stringtable, utf: bool) -> Result<()> {
    for src_index in 0..table.sources.len() {
        let path = table.sources[src_index].csv_path.clone();
        displayout!("[{}]\n", path);

        let modified = FileTime::from_path(Path::new(&path))?;
        displayout!("modtime={}\n", modified);

        let bytes = fs::read(&path)?;
        let (enc, text) = decode_text(&bytes, utf)?;
        if enc == Encoding::Windows1252 {
            displaylevel!(
                2,
                ";warn: CSV with Windows-1252 encoding (UTF-8 without BOM?)\n"
            );
        }

        let staged = parse_csv(table, src_index, &text)?;

        // Everything validated; apply.
        table.sources[src_index].modified = modified;
        let col_idx: Vec<usize> = staged
            .columns
            .iter()
            .map(|name| table.add_column(name))
            .collect();
        for row in staged.rows {
            table.ids.insert(Reverse(row.hash), row.name);
            for (slot, text) in row.cells {
                table.columns[col_idx[slot]]
                    .rows
                    .insert(Reverse(row.hash), text);
            }
        }

        displayout!("records={}\n", staged.records);
        displayout!("unnamed={}\n", staged.unnamed);
        displayout!("\n");
    }
    Ok(())
}

/// Parse and validate one CSV against the current table state.
fn parse_csv(table: &Stringtable, src_index: usize, text: &str) -> Result<StagedCsv> {
    let id_col_hash = name_hash("ID");
    let prefix = table.sources[src_index].prefix.clone();
    let lines = records(text);

    let mut iter = lines.iter().enumerate();
    let (_, head) = iter
        .next()
        .ok_or(InputError::InvalidColumnName { line: 1 })?;
    if head.contains('\0') {
        return Err(InputError::NulInRecord { line: 1 }.into());
    }

    // Header: field 0 is the id column, the rest are column names.
    let mut columns: Vec<String> = Vec::new();
    let mut column_hashes: Vec<u32> = Vec::new();
    for field in split_record(head).into_iter().skip(1) {
        let bytes = encode_w1252(&field)
            .filter(|b| !b.is_empty())
            .ok_or(InputError::InvalidColumnName { line: 1 })?;
        let hash = hash_name_bytes(&bytes);
        if hash == id_col_hash {
            return Err(InputError::InvalidColumnName { line: 1 }.into());
        }
        if column_hashes.contains(&hash) {
            return Err(InputError::DuplicateColumn { line: 1 }.into());
        }
        column_hashes.push(hash);
        columns.push(field);
    }

    let mut staged = StagedCsv {
        columns,
        rows: Vec::new(),
        records: 0,
        unnamed: 0,
    };
    let mut seen: std::collections::HashMap<u32, usize> = std::collections::HashMap::new();

    for (index, line) in iter {
        let lno = index as u32 + 1;
        if line.is_empty() {
            continue;
        }
        if line.contains('\0') {
            return Err(InputError::NulInRecord { line: lno }.into());
        }
        let fields = split_record(line);
        if fields.len() - 1 > staged.columns.len() {
            return Err(InputError::TooManyFields { line: lno }.into());
        }

        let id_field = &fields[0];
        let id_bytes = encode_w1252(id_field)
            .filter(|b| !b.is_empty())
            .ok_or(InputError::InvalidIdentifier { line: lno })?;
        let (hash, name) = match hex_to_hash(id_field) {
            Some(hash) => {
                staged.unnamed += 1;
                (hash, String::new())
            }
            None => {
                let hash = hash_name_bytes(&id_bytes);
                let name = if prefix.is_empty() {
                    id_field.clone()
                } else {
                    format!("{prefix}:{id_field}")
                };
                (hash, name)
            }
        };

        // A key this command already staged, or one the model already
        // carries, is a conflict either way.
        let old_name = seen
            .get(&hash)
            .map(|&i| staged.rows[i].name.as_str())
            .or_else(|| table.id_name(hash));
        if let Some(old) = old_name {
            return Err(InputError::HashConflict {
                line: lno,
                hash,
                new_name: name,
                old_name: old.to_owned(),
            }
            .into());
        }

        let cells = fields
            .into_iter()
            .skip(1)
            .enumerate()
            .filter(|(_, text)| !text.is_empty())
            .collect();
        seen.insert(hash, staged.rows.len());
        staged.rows.push(StagedRow { hash, name, cells });
        staged.records += 1;
    }
    Ok(staged)
}

// ─────────────────────────────────────────────────────────────────────────────
// Writing
// ─────────────────────────────────────────────────────────────────────────────

/// Write every source CSV back from the merged model.
///
/// Rows route to the source whose prefix matches their name's prefix (the
/// first source by default); nameless keys render as eight hex digits.
/// Output is UTF-8 with Unix line endings.
pub fn save_csv(table: &mut Stringtable) -> Result<()> {
    if table.ids.is_empty() || table.columns.is_empty() {
        return Ok(());
    }
    if table.sources.is_empty() {
        let i = table.add_source(DEFAULT_CSV);
        table.sources[i].set_prefix(DEFAULT_PREFIX);
    }

    let mut id_src: Vec<usize> = Vec::with_capacity(table.ids.len());
    let mut id_text: Vec<String> = Vec::with_capacity(table.ids.len());
    let mut id_key: Vec<u32> = Vec::with_capacity(table.ids.len());
    for (key, name) in &table.ids {
        let (src, display) = match name.split_once(':') {
            Some((prefix, rest)) => {
                let hash = name_hash(prefix);
                let src = table
                    .sources
                    .iter()
                    .position(|s| s.prefix_hash == hash)
                    .unwrap_or(0);
                (src, rest.to_owned())
            }
            None => (0, name.clone()),
        };
        let display = if display.is_empty() {
            hash_to_hex(key.0)
        } else {
            display
        };
        id_src.push(src);
        id_text.push(display);
        id_key.push(key.0);
    }

    let mut head = String::from("ID");
    for col in &table.columns {
        head.push('|');
        head.push_str(&col.name);
    }

    for (i, src) in table.sources.iter().enumerate() {
        displayout!("[{}]\n", src.csv_path);
        ensure_parent_dirs(Path::new(&src.csv_path))?;
        let mut out = String::with_capacity(4096);
        out.push_str(&head);
        out.push('\n');
        for j in (0..id_key.len()).filter(|&j| id_src[j] == i) {
            out.push_str(&id_text[j]);
            for col in &table.columns {
                out.push('|');
                if let Some(text) = col.rows.get(&Reverse(id_key[j])) {
                    escape_field(text, &mut out);
                }
            }
            out.push('\n');
        }
        fs::write(&src.csv_path, out)?;
        displayout!("\n");
    }
    Ok(())
}

fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn escape_round_trip() {
        // The reference cell: a|b\c<LF>d wires as a\vb\\c\nd.
        let cell = "a|b\\c\nd";
        let mut wire = String::new();
        escape_field(cell, &mut wire);
        assert_eq!(wire, "a\\vb\\\\c\\nd");
        let fields = split_record(&wire);
        assert_eq!(fields, vec![cell.to_owned()]);
    }

    #[test]
    fn all_escapes_round_trip() {
        let cell = "@ \n \r \\ |";
        let mut wire = String::new();
        escape_field(cell, &mut wire);
        assert!(!wire.contains('|') && !wire.contains('\n'));
        assert_eq!(split_record(&wire), vec![cell.to_owned()]);
    }

    #[test]
    fn unknown_escape_keeps_the_backslash() {
        assert_eq!(split_record("a\\xb"), vec!["a\\xb".to_owned()]);
    }

    #[test]
    fn fields_split_on_unescaped_pipes_only() {
        assert_eq!(split_record("a|b|c"), vec!["a", "b", "c"]);
        assert_eq!(split_record("a\\vb|c"), vec!["a|b", "c"]);
        assert_eq!(split_record(""), vec![""]);
        assert_eq!(split_record("|"), vec!["", ""]);
    }

    fn table_with_source(prefix: &str) -> Stringtable {
        let mut table = Stringtable::new();
        let i = table.add_source("test.csv");
        table.sources[i].set_prefix(prefix);
        table
    }

    #[test]
    fn parse_applies_prefix_and_detects_hex_keys() {
        let table = table_with_source("menu");
        let text = "ID|Text\nStart|Begin\nbc8f7935|Stored\n";
        let staged = parse_csv(&table, 0, text).unwrap();
        assert_eq!(staged.records, 2);
        assert_eq!(staged.unnamed, 1);
        assert_eq!(staged.rows[0].name, "menu:Start");
        assert_eq!(staged.rows[1].hash, 0xBC8F_7935);
        assert_eq!(staged.rows[1].name, "");
    }

    #[test]
    fn parse_rejects_header_problems() {
        let table = table_with_source("");
        let dup = parse_csv(&table, 0, "ID|Text|TEXT\n");
        assert!(matches!(
            dup.unwrap_err(),
            Error::Input(InputError::DuplicateColumn { line: 1 })
        ));
        let id_again = parse_csv(&table, 0, "ID|id\n");
        assert!(matches!(
            id_again.unwrap_err(),
            Error::Input(InputError::InvalidColumnName { line: 1 })
        ));
        let empty = parse_csv(&table, 0, "ID||Text\n");
        assert!(matches!(
            empty.unwrap_err(),
            Error::Input(InputError::InvalidColumnName { line: 1 })
        ));
    }

    #[test]
    fn parse_rejects_row_problems() {
        let table = table_with_source("");
        let wide = parse_csv(&table, 0, "ID|Text\na|b|c\n");
        assert!(matches!(
            wide.unwrap_err(),
            Error::Input(InputError::TooManyFields { line: 2 })
        ));
        let conflict = parse_csv(&table, 0, "ID|Text\nFoo|x\nfoo|y\n");
        match conflict.unwrap_err() {
            Error::Input(InputError::HashConflict { line, .. }) => assert_eq!(line, 3),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn short_records_leave_cells_empty() {
        let table = table_with_source("");
        let staged = parse_csv(&table, 0, "ID|A|B\nrow|only-a\n").unwrap();
        assert_eq!(staged.rows[0].cells, vec![(0, "only-a".to_owned())]);
    }

    #[test]
    fn empty_cells_are_not_staged() {
        let table = table_with_source("");
        let staged = parse_csv(&table, 0, "ID|A|B\nrow||b-text\n").unwrap();
        assert_eq!(staged.rows[0].cells, vec![(1, "b-text".to_owned())]);
    }
}
