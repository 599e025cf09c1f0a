//! Greedy one-growing strategy (`lzpb`, and `lzex` with sequence reuse).
//!
//! Symbols grow one character at a time: for each input character the
//! encoder tries to extend its current symbol; a known `(char, prev)` pair
//! is adopted, an unknown one allocates a linked symbol while the table has
//! room, and a full table flushes the current symbol and restarts from the
//! character's leaf symbol.  Chains restart unconditionally after
//! [`super::MAX_CHAIN`] characters so the decoder's depth ceiling holds.

use std::collections::HashMap;

use super::{PackedColumn, MAX_CHAIN};

pub fn pack(rows: &[Option<Vec<u16>>], tab: &mut PackedColumn, ext: bool) {
    let mut key_to_sym: HashMap<u32, u16> = HashMap::new();
    key_to_sym.insert(0, 0);

    // Seed leaf symbols for every code unit in use, so a restart always has
    // a symbol to fall back to.
    tab.sym_tab.reserve(1 << 16);
    for text in rows.iter().flatten() {
        for &c in text {
            let key = PackedColumn::make_char_key(c);
            if !key_to_sym.contains_key(&key) {
                key_to_sym.insert(key, tab.next_symbol());
                tab.add_symbol(key);
            }
        }
    }

    tab.seq_tab.reserve(rows.len() * 16);
    let mut str_seq: Vec<u16> = Vec::new();
    for row in rows {
        let text = match row {
            None => {
                tab.add_empty();
                continue;
            }
            Some(text) => text,
        };
        str_seq.clear();
        let mut str_ext = ext;
        let mut seq_sym: u16 = 0;
        let mut seq_len: u32 = 0;
        for &c in text {
            let key = PackedColumn::make_link_key(c, seq_sym);
            match key_to_sym.get(&key) {
                Some(&sym) => {
                    // Extend with an existing (possibly linked) symbol.
                    seq_sym = sym;
                }
                None if tab.symbols_full() => {
                    // Flush what was found so far and restart from the
                    // character's leaf symbol.
                    if seq_sym != 0 {
                        str_seq.push(seq_sym);
                    }
                    seq_sym = key_to_sym[&PackedColumn::make_char_key(c)];
                    seq_len = 0;
                }
                None => {
                    // Allocate one linked symbol, then force a flush: letting
                    // every string grow a fresh chain fills the table after
                    // a few percent of the rows.
                    str_ext = false;
                    seq_sym = tab.next_symbol();
                    tab.add_symbol(key);
                    key_to_sym.insert(key, seq_sym);
                    seq_len = MAX_CHAIN;
                }
            }
            seq_len += 1;
            if seq_len >= MAX_CHAIN {
                str_seq.push(seq_sym);
                seq_sym = 0;
                seq_len = 0;
            }
        }
        if seq_sym != 0 {
            str_seq.push(seq_sym);
        }
        tab.add_string_sequence(&mut str_seq, str_ext);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::testutil::{max_chain_depth, rows, unpack};
    use crate::codec::pack_column;
    use crate::codec::Compression;

    #[test]
    fn repeated_prefixes_share_symbols() {
        let input = ["Sword", "Sword of Fire", "Sword of Ice"];
        let tab = pack_column(&rows(&input), Compression::Lzpb);
        assert_eq!(unpack(&tab), input);
        // The second and third rows reuse the grown "Sword…" chain, so the
        // sequence stays far shorter than the raw code-unit count.
        let raw: usize = input.iter().map(|s| s.len() + 1).sum();
        assert!(tab.seq_tab.len() < raw);
    }

    #[test]
    fn chains_restart_at_the_depth_ceiling() {
        // Chains deepen by one per flush cycle, so a few identical long
        // rows push the deepest chain to exactly the ceiling.
        let long = "x".repeat(200);
        let input = [long.as_str(), long.as_str(), long.as_str(), long.as_str()];
        let tab = pack_column(&rows(&input), Compression::Lzpb);
        assert_eq!(unpack(&tab), input);
        assert_eq!(max_chain_depth(&tab), MAX_CHAIN);
    }

    #[test]
    fn ext_reuses_identical_sequences() {
        // The first "aa" grows its chain symbol; the second walks existing
        // symbols only, so its fragment is eligible for reuse and binds to
        // the first row's offset.
        let input = ["aa", "aa", "other"];
        let plain = pack_column(&rows(&input), Compression::Lzpb);
        let extended = pack_column(&rows(&input), Compression::Lzex);
        assert_eq!(unpack(&extended), input);
        assert_eq!(extended.str_tab[0], extended.str_tab[1]);
        assert!(extended.seq_tab.len() < plain.seq_tab.len());
    }

    #[test]
    fn ext_kicks_in_once_chains_stop_growing() {
        // Identical rows deepen the shared chain by one per row; once the
        // whole row is a single chain, later rows stop allocating and
        // collapse onto one stored sequence.
        let input = vec!["same text"; 12];
        let tab = pack_column(&rows(&input), Compression::Lzex);
        assert_eq!(unpack(&tab), input);
        assert_eq!(tab.str_tab[10], tab.str_tab[11]);
    }

    #[test]
    fn ext_is_disabled_for_strings_that_allocate() {
        // A first-of-its-kind string allocates symbols, so its fragment
        // cannot already exist in the sequence table; the search is skipped
        // but the output still round-trips.
        let input = ["abcabcabc"];
        let tab = pack_column(&rows(&input), Compression::Lzex);
        assert_eq!(unpack(&tab), input);
    }
}
