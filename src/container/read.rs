//! Parsing a table binary into the model.
//!
//! The whole file is staged into local structures first and merged into the
//! table only when everything validated, so a corrupt binary leaves the
//! model exactly as it was.  One tolerated irregularity, matching the
//! shipping tool: a broken source manifest only warns — the manifest is
//! provenance, not data.

use std::cmp::Reverse;
use std::path::Path;

use crate::archive::{Reader, StreamRef};
use crate::codec::decode_rows;
use crate::csv::encoding::decode_w1252;
use crate::error::{FormatError, Result};
use crate::ftime::FileTime;
use crate::hash::hash_to_hex;
use crate::table::Stringtable;
use crate::{displaylevel, displayout};

use super::header::TableHeader;

struct StagedBin {
    sources: Vec<(String, FileTime)>,
    keys: Vec<u32>,
    columns: Vec<(String, Vec<Option<String>>)>,
}

/// Read a table binary and merge it into the model.
pub fn read_bin(table: &mut Stringtable, path: &str) -> Result<()> {
    displayout!("[{}]\n", path);
    let mut r = Reader::open(Path::new(path))?;
    let hdr = TableHeader::read(&mut r)?;
    displayout!("version={}\n", hdr.version());
    displayout!("reserved={}\n", hdr.reserved);
    displayout!("source.count={}\n", hdr.src_count);
    displayout!("column.count={}\n", hdr.col_count);
    displayout!("string.count={}\n", hdr.row_count);
    displayout!("source.table=0x{}\n", hash_to_hex(hdr.src_table));
    displayout!("idhash.table=0x{}\n", hash_to_hex(hdr.key_table));
    displayout!("column.names=0x{}\n", hash_to_hex(hdr.col_names));
    displayout!("column.table=0x{}\n", hash_to_hex(hdr.col_table));

    let staged = StagedBin {
        sources: read_sources(&mut r, &hdr),
        keys: read_keys(&mut r, &hdr)?,
        columns: read_columns(&mut r, &hdr)?,
    };

    // Everything validated; merge.
    for (csv_path, modified) in staged.sources {
        let i = table.add_source(&csv_path);
        table.sources[i].modified = modified;
    }
    let mut named = 0u32;
    for &key in &staged.keys {
        let mapped = table.map.get(&Reverse(key)).cloned().unwrap_or_default();
        let entry = table.ids.entry(Reverse(key)).or_default();
        if entry.is_empty() && !mapped.is_empty() {
            *entry = mapped;
            named += 1;
        }
    }
    displayout!("idhash.names={}\n", named);
    for (name, rows) in staged.columns {
        let col = table.add_column(&name);
        for (&key, text) in staged.keys.iter().zip(rows) {
            if let Some(text) = text {
                table.columns[col].rows.insert(Reverse(key), text);
            }
        }
    }
    displayout!("\n");
    Ok(())
}

/// Source manifest; problems here warn instead of failing.
fn read_sources<R: std::io::Read + std::io::Seek>(
    r: &mut Reader<R>,
    hdr: &TableHeader,
) -> Vec<(String, FileTime)> {
    let mut sources = Vec::new();
    if hdr.src_count == 0 {
        return sources;
    }
    if r.seek_to(hdr.src_table).is_err() {
        displaylevel!(2, ";warn: invalid source table offset\n");
        return sources;
    }
    for i in 0..hdr.src_count {
        let entry = (|| -> Result<(String, FileTime)> {
            let path = r.read_u16_str()?;
            let high = r.read_u32()?;
            let low = r.read_u32()?;
            Ok((decode_w1252(&path), FileTime::from_words(high, low)))
        })();
        match entry {
            Ok((path, modified)) => {
                displayout!("source.{}={} {}\n", i + 1, modified, path);
                sources.push((path, modified));
            }
            Err(_) => {
                displaylevel!(2, ";warn: failed to read source entry #{}\n", i + 1);
                break;
            }
        }
    }
    sources
}

/// The key table: one reference to `row_count` hashes in descending order.
fn read_keys<R: std::io::Read + std::io::Seek>(
    r: &mut Reader<R>,
    hdr: &TableHeader,
) -> Result<Vec<u32>> {
    if hdr.row_count == 0 {
        return Ok(Vec::new());
    }
    r.seek_to(hdr.key_table)
        .map_err(|_| FormatError::BadOffset("idhash table"))?;
    let key_ref = r
        .read_ref()
        .map_err(|_| FormatError::BadOffset("idhash table"))?;
    let key_bytes = hdr
        .row_count
        .checked_mul(4)
        .ok_or(FormatError::TruncatedSection("idhash table"))?;
    if !key_ref.valid() || key_ref.size < key_bytes {
        return Err(FormatError::TruncatedSection("idhash table").into());
    }
    r.seek_to(key_ref.pos)
        .map_err(|_| FormatError::BadOffset("idhash table"))?;
    r.read_u32_vec(hdr.row_count as usize)
        .map_err(|_| FormatError::TruncatedSection("idhash table").into())
}

/// Column names, data references, and every decoded row.
fn read_columns<R: std::io::Read + std::io::Seek>(
    r: &mut Reader<R>,
    hdr: &TableHeader,
) -> Result<Vec<(String, Vec<Option<String>>)>> {
    let mut columns = Vec::new();
    if hdr.col_count == 0 {
        return Ok(columns);
    }

    r.seek_to(hdr.col_names)
        .map_err(|_| FormatError::BadOffset("column name table"))?;
    let name_refs = r
        .read_ref_vec(hdr.col_count as usize)
        .map_err(|_| FormatError::BadOffset("column name table"))?;
    let mut names = Vec::with_capacity(name_refs.len());
    for (i, &name_ref) in name_refs.iter().enumerate() {
        let bytes = r
            .read_ref_str(name_ref)
            .map_err(|_| FormatError::TruncatedSection("column name"))?;
        if bytes.is_empty() {
            return Err(FormatError::TruncatedSection("column name").into());
        }
        let name = decode_w1252(&bytes);
        displayout!("column.name.{}={}\n", i + 1, name);
        names.push(name);
    }

    r.seek_to(hdr.col_table)
        .map_err(|_| FormatError::BadOffset("column data table"))?;
    let mut data_refs: Vec<(StreamRef, StreamRef)> = Vec::with_capacity(names.len());
    for _ in 0..hdr.col_count {
        let str_ref = r
            .read_ref()
            .map_err(|_| FormatError::BadOffset("column data table"))?;
        let sym_ref = r
            .read_ref()
            .map_err(|_| FormatError::BadOffset("column data table"))?;
        data_refs.push((str_ref, sym_ref));
    }

    for (i, (name, (str_ref, sym_ref))) in names.into_iter().zip(data_refs).enumerate() {
        displayout!(
            "column.data.{}.strings=0x{}[0x{}]\n",
            i + 1,
            hash_to_hex(str_ref.pos),
            hash_to_hex(str_ref.size)
        );
        displayout!(
            "column.data.{}.symbols=0x{}[0x{}]\n",
            i + 1,
            hash_to_hex(sym_ref.pos),
            hash_to_hex(sym_ref.size)
        );

        // str_ref: row_count u32 offsets, then the u16 sequence table.
        let str_bytes = hdr
            .row_count
            .checked_mul(4)
            .ok_or(FormatError::TruncatedSection("string table"))?;
        if !str_ref.valid() || str_ref.size < str_bytes {
            return Err(FormatError::TruncatedSection("string table").into());
        }
        r.seek_to(str_ref.pos)
            .map_err(|_| FormatError::BadOffset("string table"))?;
        let str_tab = r
            .read_u32_vec(hdr.row_count as usize)
            .map_err(|_| FormatError::TruncatedSection("string table"))?;
        let seq_tab = r
            .read_u16_vec(((str_ref.size - str_bytes) / 2) as usize)
            .map_err(|_| FormatError::TruncatedSection("string table"))?;
        displayout!("column.data.{}.seq_num={}\n", i + 1, seq_tab.len());

        r.seek_to(sym_ref.pos)
            .map_err(|_| FormatError::BadOffset("symbol table"))?;
        let sym_tab = r
            .read_u32_vec((sym_ref.size / 4) as usize)
            .map_err(|_| FormatError::TruncatedSection("symbol table"))?;
        displayout!("column.data.{}.sym_num={}\n", i + 1, sym_tab.len());

        let rows = decode_rows(&str_tab, &seq_tab, &sym_tab)?;
        columns.push((name, rows));
    }
    Ok(columns)
}
