//! Char-anchored strategy: materialize symbols only where they are emitted.
//!
//! Where node promotion fills the table up front, this strategy walks every
//! row through the suffix tree first, recording for each character position
//! the deepest reachable node and the usable match length.  Rows are then
//! covered by recursively picking the position with the best
//! `weight × length` rating, emitting one symbol there, and splitting the
//! remaining intervals.  Only the chains actually emitted enter the symbol
//! table, so sparse columns do not pay for speculative symbols.

use crate::tree::{SuffixTree, ROOT};

use super::{grow_tree, PackedColumn, MAX_CHAIN, MAX_SYMBOLS};

/// Per-node table state: last symbol index, chars of the path in the table.
type SymbolInfo = (u16, u16);

/// Per-position walk result: deepest node, usable char length.
type CharInfo = (u32, u32);

pub fn pack(rows: &[Option<Vec<u16>>], tab: &mut PackedColumn, ext: bool) {
    let tree = grow_tree(rows, true);
    let weights = char_weights(&tree);

    let mut node_symbol: Vec<SymbolInfo> = vec![(0, 0); tree.len()];

    // Leaf symbols for all used code units; this also guarantees the
    // ancestor scan in `symbol_count` always terminates on a root child.
    for child in tree.children(ROOT) {
        if let Some(sym) = tree.first_symbol(child) {
            if sym.is_char() {
                let key = PackedColumn::make_char_key(sym.as_char());
                let info = &mut node_symbol[child as usize];
                if key != 0 {
                    info.0 = tab.next_symbol();
                    tab.add_symbol(key);
                }
                info.1 = 1;
            }
        }
    }

    tab.seq_tab.reserve(rows.len() * 16);
    let mut char_node: Vec<CharInfo> = Vec::new();
    let mut str_seq: Vec<u16> = Vec::new();
    for row in rows {
        let text = match row {
            None => {
                tab.add_empty();
                continue;
            }
            Some(text) => text,
        };
        if text.is_empty() {
            tab.add_empty();
            continue;
        }
        walk_positions(&tree, text, &mut char_node);
        build_sequence(
            &tree,
            &weights,
            &mut node_symbol,
            &char_node,
            tab,
            &mut str_seq,
        );
        tab.add_string_sequence(&mut str_seq, ext);
    }
}

/// Leaf-count weights, also propagated along each ancestor's suffix-link
/// chain (a suffix of a frequent sequence is frequent on the same
/// occurrences and competes for the same positions).
fn char_weights(tree: &SuffixTree) -> Vec<u32> {
    let mut weights = vec![0u32; tree.len()];
    for idx in 0..tree.len() as u32 {
        if !tree.is_leaf(idx) {
            continue;
        }
        let mut up = tree.parent(idx);
        while let Some(parent) = up {
            if tree.parent(parent).is_none() {
                break;
            }
            weights[parent as usize] = weights[parent as usize].saturating_add(1);
            let mut chain = tree.suffix_link(parent);
            while let Some(link) = chain {
                if tree.parent(link).is_none() {
                    break;
                }
                weights[link as usize] = weights[link as usize].saturating_add(1);
                chain = tree.suffix_link(link);
            }
            up = tree.parent(parent);
        }
    }
    weights
}

/// For every character position, find the deepest node reachable and the
/// usable length, using the previous position's suffix link as a shortcut.
fn walk_positions(tree: &SuffixTree, text: &[u16], out: &mut Vec<CharInfo>) {
    out.clear();
    out.reserve(text.len());
    let mut prev = ROOT;
    for pos in 0..text.len() {
        let mut chr = pos;
        let mut node;
        let mut length: u32;
        match tree.suffix_link(prev) {
            // Non-root link: the previous suffix minus its first character.
            Some(link) if tree.parent(link).is_some() => {
                node = link;
                length = tree.char_len(node, true);
                let pos_len = (text.len() - pos) as u32;
                if length >= pos_len {
                    length = pos_len;
                    chr = text.len();
                } else {
                    chr = pos + length as usize;
                }
            }
            _ => {
                node = ROOT;
                length = 0;
            }
        }
        // Extend downward while matches remain.  Edge interiors need no
        // comparing: this row is in the tree, so a child taken by its first
        // character matches its whole edge.
        while length < MAX_CHAIN && chr < text.len() {
            let next = match tree.find_child(node, text[chr]) {
                Some(next) => next,
                None => break,
            };
            node = next;
            length = tree.char_len(node, true);
            let remaining = (text.len() - chr) as u32;
            if length >= remaining {
                length = remaining;
                break;
            }
            let node_len = length - tree.parent_depth(node);
            chr += node_len as usize;
        }
        if length > MAX_CHAIN {
            length = MAX_CHAIN;
        }
        out.push((node, length));
        prev = node;
    }
}

/// Saturating selection score.
fn rating(weight: u32, length: u32) -> u32 {
    (u64::from(weight) * u64::from(length)).min(u64::from(u32::MAX)) as u32
}

/// The ancestor of `idx` whose edge spans character `length` of the path.
fn anchor(tree: &SuffixTree, mut idx: u32, length: u32) -> u32 {
    while length <= tree.parent_depth(idx) {
        idx = tree.parent(idx).unwrap_or(ROOT);
    }
    idx
}

/// Chars of `idx`'s path already materialized in the table (nearest
/// recorded ancestor).
fn symbol_count(tree: &SuffixTree, node_symbol: &[SymbolInfo], mut idx: u32) -> u16 {
    let mut count = node_symbol[idx as usize].1;
    while count == 0 {
        idx = tree.parent(idx).unwrap_or(ROOT);
        count = node_symbol[idx as usize].1;
    }
    count
}

/// Usable length at a position, capped by the interval and by the symbol
/// slots still available for the missing part of the chain.
fn usable_length(
    tree: &SuffixTree,
    node_symbol: &[SymbolInfo],
    tab: &PackedColumn,
    info: CharInfo,
    max_len: u32,
) -> u32 {
    let mut length = info.1.min(max_len);
    let node = anchor(tree, info.0, length);
    let count = u32::from(symbol_count(tree, node_symbol, node));
    if count < length {
        let space = (MAX_SYMBOLS.saturating_sub(tab.sym_tab.len())) as u32;
        if length - count > space {
            length = count + space;
        }
    }
    length
}

/// Ensure the first `length` chars of `idx`'s path are a table chain and
/// return the chain's last symbol.
///
/// A recorded longer chain is reused by walking `prev` pointers back; a
/// shorter one is extended in place.  Capacity was checked by
/// [`usable_length`], so the pushes here never overflow the table.
fn insert_node_symbol(
    tree: &SuffixTree,
    node_symbol: &mut [SymbolInfo],
    tab: &mut PackedColumn,
    idx: u32,
    length: u32,
) -> u16 {
    let (sym, have) = node_symbol[idx as usize];
    if u32::from(have) >= length {
        let mut index = sym;
        for _ in 0..(u32::from(have) - length) {
            index = (tab.sym_tab[index as usize] & 0xFFFF) as u16;
        }
        return index;
    }
    let mut chars = tree.path_chars(idx, false);
    let keep = (length - tree.parent_depth(idx)) as usize;
    chars.truncate(keep);
    let mut index;
    let start;
    if have == 0 {
        let parent = tree.parent(idx).unwrap_or(ROOT);
        index = insert_node_symbol(tree, node_symbol, tab, parent, tree.parent_depth(idx));
        start = 0;
    } else {
        index = sym;
        start = (u32::from(have) - tree.parent_depth(idx)) as usize;
    }
    for &c in &chars[start..] {
        let value = PackedColumn::make_link_key(c, index);
        index = tab.next_symbol();
        tab.add_symbol(value);
    }
    node_symbol[idx as usize] = (index, length as u16);
    index
}

/// Cover the row with symbols: best-rated position first, then the left
/// and right remainders, until every character is inside some interval.
fn build_sequence(
    tree: &SuffixTree,
    weights: &[u32],
    node_symbol: &mut [SymbolInfo],
    char_node: &[CharInfo],
    tab: &mut PackedColumn,
    str_seq: &mut Vec<u16>,
) {
    str_seq.clear();
    str_seq.resize(char_node.len(), 0);
    let mut work: Vec<(usize, usize)> = vec![(0, char_node.len())];
    while let Some((begin, end)) = work.pop() {
        let mut best_pos = begin;
        let mut best_length =
            usable_length(tree, node_symbol, tab, char_node[begin], (end - begin) as u32);
        let mut best_rating = rating(weights[char_node[begin].0 as usize], best_length);
        for pos in begin + 1..end {
            let length =
                usable_length(tree, node_symbol, tab, char_node[pos], (end - pos) as u32);
            let r = rating(weights[char_node[pos].0 as usize], length);
            if best_rating <= r && (best_rating < r || best_length < length) {
                best_pos = pos;
                best_length = length;
                best_rating = r;
            }
        }
        let node = anchor(tree, char_node[best_pos].0, best_length);
        let symbol = insert_node_symbol(tree, node_symbol, tab, node, best_length);
        str_seq[best_pos] = symbol;
        let next = best_pos + best_length as usize;
        if next != end {
            work.push((next, end));
        }
        if best_pos != begin {
            work.push((begin, best_pos));
        }
    }
    str_seq.retain(|&s| s != 0);
}
