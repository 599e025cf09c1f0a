//! The two link-free strategies: `none` and `fast`.
//!
//! Both emit one symbol per code unit and differ only in how the symbol
//! table is populated: `none` pre-populates all 65 535 leaf symbols so a
//! code unit is its own symbol index, `fast` adds a leaf symbol the first
//! time a code unit appears.

use std::collections::HashMap;

use super::PackedColumn;

/// Pre-populated code table: symbol index == code unit.
pub fn pack_none(rows: &[Option<Vec<u16>>], tab: &mut PackedColumn) {
    tab.sym_tab.reserve(1 << 16);
    for c in 1..=u16::MAX {
        tab.add_symbol(PackedColumn::make_char_key(c));
    }
    tab.seq_tab.reserve(rows.len() * 64);
    for row in rows {
        match row {
            None => tab.add_empty(),
            Some(text) => {
                tab.add_new_string();
                for &c in text {
                    tab.push_seq(c);
                }
                tab.push_seq(0);
            }
        }
    }
}

/// Lazy code table: one leaf symbol per distinct code unit that occurs.
pub fn pack_fast(rows: &[Option<Vec<u16>>], tab: &mut PackedColumn) {
    let mut char_to_sym: HashMap<u16, u16> = HashMap::new();
    char_to_sym.insert(0, 0);

    tab.seq_tab.reserve(rows.len() * 64);
    tab.sym_tab.reserve(128);
    for row in rows {
        match row {
            None => tab.add_empty(),
            Some(text) => {
                tab.add_new_string();
                for &c in text {
                    let sym = match char_to_sym.get(&c) {
                        Some(&sym) => sym,
                        None => {
                            let sym = tab.next_symbol();
                            char_to_sym.insert(c, sym);
                            tab.add_symbol(PackedColumn::make_char_key(c));
                            sym
                        }
                    };
                    tab.push_seq(sym);
                }
                tab.push_seq(0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::testutil::{rows, unpack};

    #[test]
    fn none_uses_code_units_as_indices() {
        let mut tab = PackedColumn::new();
        pack_none(&rows(&["hi"]), &mut tab);
        assert_eq!(tab.sym_tab.len(), 1 << 16);
        assert_eq!(tab.seq_tab, vec![b'h' as u16, b'i' as u16, 0]);
        assert_eq!(tab.str_tab, vec![0]);
    }

    #[test]
    fn fast_allocates_per_distinct_unit() {
        let mut tab = PackedColumn::new();
        pack_fast(&rows(&["aba", "", "bc"]), &mut tab);
        // Symbols: reserved 0, then a, b, c in first-seen order.
        assert_eq!(tab.sym_tab.len(), 4);
        assert_eq!(tab.sym_tab[1] >> 16, u32::from(b'a'));
        assert_eq!(tab.sym_tab[2] >> 16, u32::from(b'b'));
        assert_eq!(tab.sym_tab[3] >> 16, u32::from(b'c'));
        assert_eq!(tab.seq_tab, vec![1, 2, 1, 0, 2, 3, 0]);
        assert_eq!(unpack_padded(tab), vec!["aba", "", "bc"]);
    }

    fn unpack_padded(mut tab: PackedColumn) -> Vec<String> {
        if tab.seq_tab.len() % 2 == 1 {
            tab.seq_tab.push(0);
        }
        unpack(&tab)
    }
}
