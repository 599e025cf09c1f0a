//! The column decoder.
//!
//! This is the validation boundary for untrusted table data: every index,
//! character, and chain length is checked before use, and any violation
//! surfaces as a [`FormatError`] instead of a panic or bogus text.  The
//! decoder accepts the output of all five strategies — it only understands
//! the shared three-array shape.

use crate::error::{FormatError, Result};

use super::{EMPTY_ROW, MAX_CHAIN};

/// Decode every row of a packed column.
///
/// `str_tab` carries one entry per key in descending-hash order; the result
/// has the same length and order, with `None` for absent rows.
pub fn decode_rows(
    str_tab: &[u32],
    seq_tab: &[u16],
    sym_tab: &[u32],
) -> Result<Vec<Option<String>>> {
    let mut rows = Vec::with_capacity(str_tab.len());
    let mut chain: Vec<u16> = Vec::with_capacity(MAX_CHAIN as usize);
    for &begin in str_tab {
        if begin == EMPTY_ROW {
            rows.push(None);
            continue;
        }
        let mut p = begin as usize;
        if p >= seq_tab.len() {
            return Err(FormatError::BadSequenceIndex.into());
        }
        let mut units: Vec<u16> = Vec::new();
        while seq_tab[p] != 0 {
            expand_symbol(seq_tab[p], sym_tab, &mut chain)?;
            units.extend(chain.iter().rev());
            p += 1;
            if p >= seq_tab.len() {
                return Err(FormatError::UnterminatedSequence.into());
            }
        }
        let text = String::from_utf16(&units).map_err(|_| FormatError::UnpairedSurrogate)?;
        rows.push(Some(text));
    }
    Ok(rows)
}

/// Walk one symbol's `prev` chain, collecting characters innermost-last.
///
/// The caller appends the collected chain in reverse to restore
/// left-to-right order.
fn expand_symbol(index: u16, sym_tab: &[u32], chain: &mut Vec<u16>) -> Result<()> {
    chain.clear();
    if index as usize >= sym_tab.len() {
        return Err(FormatError::BadSymbolIndex.into());
    }
    let mut sym = sym_tab[index as usize];
    loop {
        let c = (sym >> 16) as u16;
        if c == 0 {
            return Err(FormatError::NullCharInSymbol.into());
        }
        if chain.len() as u32 >= MAX_CHAIN {
            return Err(FormatError::SymbolChainTooLong.into());
        }
        chain.push(c);
        let prev = (sym & 0xFFFF) as u16;
        if prev == 0 {
            return Ok(());
        }
        if prev as usize >= sym_tab.len() {
            return Err(FormatError::BadSymbolIndex.into());
        }
        sym = sym_tab[prev as usize];
    }
}
