//! Removal of candidates contained inside larger candidates.

use super::Match;

/// Remove every match whose op range lies strictly inside a larger match's
/// range, e.g. a hyphen matched on the crossbar of an "A".
///
/// Candidates are sorted by (end ascending, start descending) and scanned
/// right to left. The scan tracks the current supermatch, the most recently
/// visited candidate reaching furthest left; anything inside it is dropped.
/// Candidates covering the exact same range survive together and are
/// reported later as ambiguous.
pub(crate) fn remove_submatches(mut matches: Vec<Match<'_>>) -> Vec<Match<'_>> {
    matches.sort_by(|a, b| a.end.cmp(&b.end).then(b.start.cmp(&a.start)));

    let mut kept: Vec<Match> = Vec::with_capacity(matches.len());
    let mut iter = matches.into_iter().rev();

    let Some(last) = iter.next() else {
        return Vec::new();
    };

    let (mut super_start, mut super_end) = (last.start, last.end);
    kept.push(last);

    for m in iter {
        let contained =
            m.start > super_start || (m.start == super_start && m.end < super_end);

        if !contained {
            kept.push(m);
        }

        if m.start < super_start {
            super_start = m.start;
            super_end = m.end;
        }
    }

    kept.reverse();
    kept
}
