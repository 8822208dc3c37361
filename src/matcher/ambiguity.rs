//! Diagnostics for op ranges claimed by more than one glyph.

use std::collections::HashMap;

use itertools::Itertools;

use super::Match;

/// Tally of surviving matches that cover the same op range as each other
/// with different sigils, keyed by the sorted characters of each colliding
/// group.
///
/// Purely diagnostic: recognition output is unaffected, but a persistent
/// entry here usually means two dictionary characters were captured with
/// identical stroke sequences.
pub fn count_ambiguous(matches: &[Match<'_>]) -> HashMap<String, usize> {
    let mut by_position: HashMap<(usize, usize), Vec<char>> = HashMap::new();

    for m in matches {
        by_position
            .entry((m.start, m.sig.ops.len()))
            .or_default()
            .push(m.sig.char);
    }

    let mut tally = HashMap::new();

    for chars in by_position.into_values() {
        if chars.len() > 1 {
            let key: String = chars.into_iter().sorted_unstable().collect();
            *tally.entry(key).or_insert(0) += 1;
        }
    }

    tally
}
