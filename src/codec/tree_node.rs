//! Node-promotion strategy: fill the symbol table with high-weight suffix
//! tree nodes, then emit rows through the interning map.
//!
//! A node's weight is the number of leaves below it — the total occurrence
//! count of its path across all rows.  Nodes are promoted into chains of
//! linked symbols in weight order until the table fills; suffix-link targets
//! are discounted once so a substring and its first-character-stripped twin
//! do not both win a slot on the same evidence.

use std::collections::HashMap;

use crate::tree::{SuffixTree, ROOT};

use super::{grow_tree, PackedColumn, MAX_CHAIN};

pub fn pack(rows: &[Option<Vec<u16>>], tab: &mut PackedColumn, ext: bool) {
    let mut key_to_sym: HashMap<u32, u16> = HashMap::new();
    key_to_sym.insert(0, 0);

    {
        let tree = grow_tree(rows, false);

        // Leaf symbols for every code unit in use.  Every character in any
        // row starts some suffix, so the root's char children cover them
        // all; the emission walk below relies on that.
        for child in tree.children(ROOT) {
            if let Some(sym) = tree.first_symbol(child) {
                if sym.is_char() {
                    let key = PackedColumn::make_char_key(sym.as_char());
                    if key != 0 {
                        key_to_sym.insert(key, tab.next_symbol());
                        tab.add_symbol(key);
                    }
                }
            }
        }

        if !tab.symbols_full() {
            let weights = node_weights(&tree);
            let mut node_to_sym = vec![0u16; tree.len()];

            // Complete the root children first: their first characters are
            // in the table, the rest of their edges are not yet.
            let mut full = false;
            for child in tree.children(ROOT) {
                if tree.char_len(child, false) > 0
                    && add_node(&tree, child, &mut node_to_sym, &mut key_to_sym, tab)
                        == u16::MAX
                {
                    full = true;
                    break;
                }
            }
            // Then promote by weight until the table fills.
            if !full && !tab.symbols_full() {
                for &(idx, weight) in &weights {
                    if weight == 0 {
                        break;
                    }
                    if add_node(&tree, idx, &mut node_to_sym, &mut key_to_sym, tab)
                        == u16::MAX
                    {
                        break;
                    }
                }
            }
        }
    }

    // Emission: greedy longest-match through the interning map.  A missing
    // extension flushes the current symbol and restarts from the
    // character's leaf symbol; chains longer than the ceiling were never
    // interned, so the depth cap holds without an explicit counter.
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
        let mut seq_sym: u16 = 0;
        for &c in text {
            let key = PackedColumn::make_link_key(c, seq_sym);
            match key_to_sym.get(&key) {
                Some(&sym) => seq_sym = sym,
                None => {
                    if seq_sym != 0 {
                        str_seq.push(seq_sym);
                    }
                    seq_sym = key_to_sym[&PackedColumn::make_char_key(c)];
                }
            }
        }
        if seq_sym != 0 {
            str_seq.push(seq_sym);
        }
        tab.add_string_sequence(&mut str_seq, ext);
    }
}

/// Weighted node list: `(arena index, leaf count)`, heaviest first.
fn node_weights(tree: &SuffixTree) -> Vec<(u32, u32)> {
    let mut weights: Vec<(u32, u32)> = (0..tree.len() as u32).map(|i| (i, 0)).collect();

    for idx in 0..tree.len() as u32 {
        if !tree.is_leaf(idx) {
            continue;
        }
        let mut up = tree.parent(idx);
        while let Some(parent) = up {
            if tree.parent(parent).is_none() {
                break; // root collects no weight
            }
            let w = &mut weights[parent as usize].1;
            *w = w.saturating_add(1);
            up = tree.parent(parent);
        }
    }

    // One discount per weighted node for its suffix-link target: the target
    // encodes the same sequence minus the first character and would
    // otherwise be counted on the same occurrences.
    for i in 0..weights.len() {
        if weights[i].1 == 0 {
            continue;
        }
        if let Some(link) = tree.suffix_link(weights[i].0) {
            let target = &mut weights[link as usize].1;
            if *target > 0 {
                *target -= 1;
            }
        }
    }

    // The root and anything deeper than a decodable chain cannot be
    // promoted.
    for entry in &mut weights {
        if entry.1 > 0 {
            let len = tree.char_len(entry.0, true);
            if len == 0 || len > MAX_CHAIN {
                entry.1 = 0;
            }
        }
    }

    weights.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    weights
}

/// Ensure the chain for `idx`'s path (parents first) is in the table.
///
/// Returns the symbol for the node's path, capped at [`MAX_CHAIN`]
/// characters per edge.  A return of `u16::MAX` means the slot just taken
/// was the last one; callers stop promoting.
fn add_node(
    tree: &SuffixTree,
    idx: u32,
    node_to_sym: &mut [u16],
    key_to_sym: &mut HashMap<u32, u16>,
    tab: &mut PackedColumn,
) -> u16 {
    let known = node_to_sym[idx as usize];
    if known != 0 {
        return known;
    }
    let mut sym = 0u16;
    if tree.parent_depth(idx) > 0 {
        if let Some(parent) = tree.parent(idx) {
            sym = add_node(tree, parent, node_to_sym, key_to_sym, tab);
        }
    }
    let mut chars = tree.path_chars(idx, false);
    chars.truncate(MAX_CHAIN as usize);
    for &c in &chars {
        if sym == u16::MAX {
            break;
        }
        let key = PackedColumn::make_link_key(c, sym);
        sym = match key_to_sym.get(&key) {
            Some(&s) => s,
            None => {
                let s = tab.next_symbol();
                key_to_sym.insert(key, s);
                tab.add_symbol(key);
                s
            }
        };
    }
    node_to_sym[idx as usize] = sym;
    sym
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::testutil::{max_chain_depth, rows, unpack};

    fn pack_padded(input: &[&str], ext: bool) -> PackedColumn {
        let mut tab = PackedColumn::new();
        pack(&rows(input), &mut tab, ext);
        if tab.seq_tab.len() % 2 == 1 {
            tab.seq_tab.push(0);
        }
        tab
    }

    #[test]
    fn round_trips_shared_suffixes() {
        let input = [
            "Press [A] to continue",
            "Press [B] to continue",
            "",
            "to continue",
        ];
        let tab = pack_padded(&input, false);
        assert_eq!(unpack(&tab), input);
        assert!(max_chain_depth(&tab) <= MAX_CHAIN);
    }

    #[test]
    fn repeated_substring_becomes_one_symbol() {
        let input = ["abcabcabcabc"];
        let tab = pack_padded(&input, false);
        assert_eq!(unpack(&tab), input);
        // "abc" repeats, so the emitted sequence is far shorter than the
        // code-unit count (plus terminator).
        assert!(tab.seq_tab.len() < input[0].len());
    }

    #[test]
    fn long_repeat_emits_full_depth_chains() {
        let long = "x".repeat(200);
        let input = [long.as_str()];
        let tab = pack_padded(&input, false);
        assert_eq!(unpack(&tab), input);
        // The promoted x-run chains top out at the ceiling, and the walk
        // emits them at exactly that depth before restarting.
        assert_eq!(max_chain_depth(&tab), MAX_CHAIN);
    }

    #[test]
    fn weights_count_occurrences() {
        let mut tree = SuffixTree::new();
        for row in ["banana", "bandana"] {
            let units: Vec<u16> = row.encode_utf16().collect();
            tree.append(&units);
        }
        tree.build();
        let weights = node_weights(&tree);
        // Heaviest entries sort first and carry nonzero weight.
        assert!(weights[0].1 >= weights[weights.len() - 1].1);
        assert!(weights[0].1 > 0);
        // All promoted candidates are decodable.
        for &(idx, w) in &weights {
            if w > 0 {
                let len = tree.char_len(idx, true);
                assert!(len >= 1 && len <= MAX_CHAIN);
            }
        }
    }
}
