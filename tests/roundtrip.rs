//! Pack/unpack round trips across all compression levels, plus the
//! boundary shapes the decoder's ceilings impose.

use loctab::codec::{
    decode_rows, pack_column, Compression, PackedColumn, EMPTY_ROW, MAX_CHAIN, MAX_SYMBOLS,
};

const ALL_LEVELS: [Compression; 6] = [
    Compression::None,
    Compression::Fast,
    Compression::Lzpb,
    Compression::Lzex,
    Compression::Tree,
    Compression::Best,
];

fn rows_of(texts: &[String]) -> Vec<Option<Vec<u16>>> {
    texts
        .iter()
        .map(|t| {
            if t.is_empty() {
                None
            } else {
                Some(t.encode_utf16().collect())
            }
        })
        .collect()
}

fn unpack(tab: &PackedColumn) -> Vec<String> {
    decode_rows(&tab.str_tab, &tab.seq_tab, &tab.sym_tab)
        .expect("packed output must decode")
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect()
}

fn max_chain_depth(tab: &PackedColumn) -> u32 {
    let mut max = 0;
    for &s in &tab.seq_tab {
        let mut hops = 0;
        let mut sym = s;
        while sym != 0 {
            hops += 1;
            sym = (tab.sym_tab[sym as usize] & 0xFFFF) as u16;
        }
        max = max.max(hops);
    }
    max
}

fn assert_invariants(tab: &PackedColumn, rows: usize, level: Compression) {
    assert_eq!(tab.str_tab.len(), rows, "{level:?}: one entry per key");
    assert_eq!(tab.seq_tab.len() % 2, 0, "{level:?}: even sequence table");
    assert_eq!(tab.sym_tab[0], 0, "{level:?}: reserved symbol");
    assert!(tab.sym_tab.len() <= MAX_SYMBOLS, "{level:?}: symbol cap");
    assert!(max_chain_depth(tab) <= MAX_CHAIN, "{level:?}: chain cap");
}

/// Deterministic xorshift; tests must not depend on ambient randomness.
struct Rng(u64);

impl Rng {
    fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }

    fn range(&mut self, lo: u32, hi: u32) -> u32 {
        lo + (self.next() % u64::from(hi - lo)) as u32
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Identity across levels
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn trivial_round_trip() {
    // Two keys, one row present: the absent key marks empty.
    let input = vec!["hi".to_owned(), String::new()];
    let tab = pack_column(&rows_of(&input), Compression::None);
    assert_eq!(tab.str_tab[1], EMPTY_ROW);
    assert_eq!(unpack(&tab), input);
}

#[test]
fn every_level_is_identity_on_game_like_rows() {
    let input: Vec<String> = [
        "New Game",
        "Continue",
        "",
        "Load Game",
        "Save Game",
        "Press [Enter] to continue",
        "Press [Esc] to cancel",
        "",
        "Öffne die Tür",
        "Zurück zum Hauptmenü",
        "…",
        "A | B \\ C @ D",
        "line\nbreak",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    for level in ALL_LEVELS {
        let tab = pack_column(&rows_of(&input), level);
        assert_eq!(unpack(&tab), input, "{level:?}");
        assert_invariants(&tab, input.len(), level);
    }
}

#[test]
fn random_ascii_rows_identity_and_best_not_larger_than_fast() {
    let mut rng = Rng(0x5EED_1DEA_F00D_CAFE);
    let mut input = Vec::with_capacity(1000);
    for _ in 0..1000 {
        let len = rng.range(0, 64);
        let mut s = String::new();
        for _ in 0..len {
            s.push(char::from_u32(rng.range(0x20, 0x7F)).unwrap());
        }
        input.push(s);
    }
    let rows = rows_of(&input);

    let fast = pack_column(&rows, Compression::Fast);
    assert_eq!(unpack(&fast), input);
    assert_invariants(&fast, input.len(), Compression::Fast);

    let best = pack_column(&rows, Compression::Best);
    assert_eq!(unpack(&best), input);
    assert_invariants(&best, input.len(), Compression::Best);

    // Entry counts: the tree strategies trade sequence entries for symbol
    // entries, but never end up with more table entries than the
    // one-symbol-per-unit encoding.
    let fast_entries = fast.seq_tab.len() + fast.sym_tab.len();
    let best_entries = best.seq_tab.len() + best.sym_tab.len();
    assert!(
        best_entries <= fast_entries,
        "best ({best_entries}) must not exceed fast ({fast_entries})"
    );
}

#[test]
fn bmp_unicode_rows_round_trip() {
    let input: Vec<String> = vec![
        "日本語のテキスト".into(),
        "Русский текст".into(),
        "Ελληνικά".into(),
        "한국어".into(),
    ];
    for level in ALL_LEVELS {
        let tab = pack_column(&rows_of(&input), level);
        assert_eq!(unpack(&tab), input, "{level:?}");
    }
}

#[test]
fn surrogate_pairs_round_trip() {
    // Astral characters travel as surrogate pairs of code units.
    let input: Vec<String> = vec!["𝄞 music 🎮 games".into(), "plain".into()];
    for level in ALL_LEVELS {
        let tab = pack_column(&rows_of(&input), level);
        assert_eq!(unpack(&tab), input, "{level:?}");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Boundary shapes
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn empty_column_fixed_shape() {
    let input = vec![String::new(); 4];
    for level in ALL_LEVELS {
        let tab = pack_column(&rows_of(&input), level);
        assert_eq!(tab.str_tab, vec![EMPTY_ROW; 4], "{level:?}");
        assert_eq!(tab.seq_tab, vec![0, 0], "{level:?}");
        assert_eq!(tab.sym_tab, vec![0], "{level:?}");
    }
}

#[test]
fn depth_cap_one_long_row() {
    // One row of 200 identical units: the promoted chain tops out at
    // exactly the ceiling and the walk restarts past it.
    let input = vec!["x".repeat(200)];
    let tab = pack_column(&rows_of(&input), Compression::Tree);
    assert_eq!(unpack(&tab), input);
    assert_eq!(max_chain_depth(&tab), MAX_CHAIN);
}

#[test]
fn symbol_cap_none_level_fills_the_table() {
    // Level none pre-populates all 65 535 leaf symbols plus the reserved
    // zero entry: the table is exactly full and still decodes.
    let input = vec!["cap check".to_owned()];
    let tab = pack_column(&rows_of(&input), Compression::None);
    assert_eq!(tab.sym_tab.len(), MAX_SYMBOLS);
    assert_eq!(unpack(&tab), input);
}

#[test]
fn symbol_pressure_many_distinct_units() {
    // Thousands of distinct code units across rows: fast allocates one
    // symbol each and stays within the cap.
    let mut input = Vec::new();
    for block in 0u32..40 {
        let mut s = String::new();
        for i in 0..100u32 {
            let c = 0x4E00 + block * 100 + i; // CJK block, no surrogates
            s.push(char::from_u32(c).unwrap());
        }
        input.push(s);
    }
    for level in [Compression::Fast, Compression::Lzpb, Compression::Best] {
        let tab = pack_column(&rows_of(&input), level);
        assert_eq!(unpack(&tab), input, "{level:?}");
        assert_invariants(&tab, input.len(), level);
    }
}

#[test]
fn pathological_repetition_every_level() {
    let mut input = vec![
        "ab".repeat(60),
        "abc".repeat(40),
        "a".repeat(150),
        "ab".repeat(60),
    ];
    input.push(String::new());
    for level in ALL_LEVELS {
        let tab = pack_column(&rows_of(&input), level);
        assert_eq!(unpack(&tab), input, "{level:?}");
        assert_invariants(&tab, input.len(), level);
    }
}

#[test]
fn tree_fallback_path_round_trips() {
    // A single self-similar row makes node promotion emit fewer sequence
    // entries than symbols, which reruns the column through the
    // char-anchored strategy.
    let input = vec!["abab".to_owned()];
    let tab = pack_column(&rows_of(&input), Compression::Best);
    assert_eq!(unpack(&tab), input);
    assert!(tab.seq_tab.len() >= tab.sym_tab.len() || tab.sym_tab.len() <= 8);
}
