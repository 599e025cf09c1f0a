//! Writing the table binary.
//!
//! The container is strictly sequential, but the header and the reference
//! arrays up front need every section offset.  Instead of seeking back, the
//! writer runs the full emission twice: a layout pass against a
//! [`NullSink`] records every offset, then the real pass replays the same
//! sequence into the file.  Columns are packed once, before either pass.
//!
//! Consecutive all-empty columns share one table: the first empty column's
//! references are copied for the rest, the way the shipping tables do it.

use std::cmp::Reverse;
use std::fs;
use std::path::Path;

use crate::archive::{NullSink, Platform, Sink, StreamRef, Writer};
use crate::codec::{pack_column, Compression, PackedColumn};
use crate::csv::encoding::encode_w1252;
use crate::displayout;
use crate::error::Result;
use crate::table::Stringtable;

use super::header::TableHeader;

/// Pack the model and write the binary for `platform`.
///
/// `version` 0 derives the default from the platform's endianness.
pub fn save_bin(
    table: &Stringtable,
    platform: Platform,
    version: u8,
    path: &str,
    comp: Compression,
) -> Result<()> {
    let version = if version == 0 {
        platform.default_version()
    } else {
        version
    };
    let endian = platform.endian();

    displayout!("[{}]\n", path);
    displayout!("target={}\n", platform.name());
    displayout!("version={}\n", version);
    displayout!("strings={}\n", table.ids.len());
    displayout!("columns={}\n", table.columns.len());

    let keys: Vec<u32> = table.keys().collect();
    let col_names: Vec<Vec<u8>> = table
        .columns
        .iter()
        .map(|c| encode_w1252(&c.name).unwrap_or_else(|| c.name.clone().into_bytes()))
        .collect();

    // Pack every column up front; empty columns after the first packed
    // empty one share its table.
    let mut packed: Vec<PackedColumn> = Vec::new();
    let mut col_to_packed: Vec<Option<usize>> = Vec::with_capacity(table.columns.len());
    let mut first_empty: Option<usize> = None;
    for (i, col) in table.columns.iter().enumerate() {
        displayout!("column.{}.name={}\n", i, col.name);
        if col.rows.is_empty() {
            if first_empty.is_some() {
                col_to_packed.push(None);
                continue;
            }
            first_empty = Some(i);
        }
        let rows: Vec<Option<Vec<u16>>> = keys
            .iter()
            .map(|&k| {
                col.rows
                    .get(&Reverse(k))
                    .map(|text| text.encode_utf16().collect())
            })
            .collect();
        let tab = pack_column(&rows, comp);
        if !col.rows.is_empty() {
            displayout!(
                "column.{}.seq_avg={:.6}\n",
                i,
                tab.seq_tab.len() as f64 / col.rows.len() as f64
            );
            displayout!("column.{}.seq_num={}\n", i, tab.seq_tab.len());
            displayout!("column.{}.sym_num={}\n", i, tab.sym_tab.len());
        }
        col_to_packed.push(Some(packed.len()));
        packed.push(tab);
    }

    let mut hdr = TableHeader::new(version);
    hdr.src_count = table.sources.len() as u32;
    hdr.col_count = table.columns.len() as u32;
    hdr.row_count = keys.len() as u32;

    // Layout pass: record every offset and reference.
    let mut name_refs = vec![StreamRef::default(); table.columns.len()];
    let mut col_refs = vec![(StreamRef::default(), StreamRef::default()); table.columns.len()];
    let mut key_ref = StreamRef::default();
    {
        let mut sink = NullSink::new(endian);
        hdr.write(&mut sink)?;
        hdr.src_table = sink.pos();
        write_sources(&mut sink, table)?;
        hdr.col_names = sink.pos();
        sink.put_ref_slice(&name_refs)?;
        for (i, name) in col_names.iter().enumerate() {
            name_refs[i] = sink.put_ref_str(name)?;
        }
        hdr.col_table = sink.pos();
        sink.put_ref_slice(&flatten_col_refs(&col_refs))?;
        hdr.key_table = sink.pos();
        sink.put_ref(key_ref)?;
        key_ref = sink.ref_begin();
        sink.put_u32_slice(&keys)?;
        sink.ref_end(&mut key_ref);
        for i in 0..table.columns.len() {
            match col_to_packed[i] {
                Some(p) => {
                    let tab = &packed[p];
                    let mut str_ref = sink.ref_begin();
                    sink.put_u32_slice(&tab.str_tab)?;
                    sink.put_u16_slice(&tab.seq_tab)?;
                    sink.ref_end(&mut str_ref);
                    let mut sym_ref = sink.ref_begin();
                    sink.put_u32_slice(&tab.sym_tab)?;
                    sink.ref_end(&mut sym_ref);
                    col_refs[i] = (str_ref, sym_ref);
                }
                None => {
                    // Shared empty table.
                    col_refs[i] = col_refs[first_empty.unwrap_or(0)];
                }
            }
        }
    }

    // Real pass: identical sequence into the file.
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut out = Writer::create(Path::new(path), endian)?;
    hdr.write(&mut out)?;
    write_sources(&mut out, table)?;
    out.put_ref_slice(&name_refs)?;
    for name in &col_names {
        out.put_ref_str(name)?;
    }
    out.put_ref_slice(&flatten_col_refs(&col_refs))?;
    out.put_ref(key_ref)?;
    out.put_u32_slice(&keys)?;
    for tab in &packed {
        out.put_u32_slice(&tab.str_tab)?;
        out.put_u16_slice(&tab.seq_tab)?;
        out.put_u32_slice(&tab.sym_tab)?;
    }
    out.finish()?;
    displayout!("\n");
    Ok(())
}

/// The source manifest: u16-prefixed path plus FILETIME words, padded to a
/// 4-byte boundary.
fn write_sources<S: Sink>(sink: &mut S, table: &Stringtable) -> Result<()> {
    for src in &table.sources {
        let path = encode_w1252(&src.csv_path)
            .unwrap_or_else(|| src.csv_path.clone().into_bytes());
        sink.put_u16_str(&path)?;
        let [high, low] = src.modified.to_words();
        sink.put_u32(high)?;
        sink.put_u32(low)?;
    }
    sink.align4()
}

/// Column data pairs flattened for one `put_ref_slice` call.
fn flatten_col_refs(pairs: &[(StreamRef, StreamRef)]) -> Vec<StreamRef> {
    pairs
        .iter()
        .flat_map(|&(str_ref, sym_ref)| [str_ref, sym_ref])
        .collect()
}
