//! The sigil recognition pipeline.
//!
//! Candidates are found by opcode-skeleton and stroke-direction matching,
//! then winnowed: candidates contained inside larger ones go first, then
//! candidates whose stroke lengths disagree with their own scale factor,
//! then stray single-stroke matches that do not extend a line of text.

use crate::{
    geometry::Point,
    ops::{self, AbsOp},
    sigil::{Sigil, SigilDict},
};

pub use ambiguity::count_ambiguous;

mod alignment;
mod ambiguity;
mod prune;
mod scale;
mod shape;

/// A glyph placement: a dictionary sigil matched onto a half-open range of
/// the differential op stream
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match<'a> {
    pub sig: &'a Sigil,
    pub start: usize,
    pub end: usize,
    /// Absolute position of the glyph's reference point; filled in by scale
    /// verification
    pub origin: Point,
    /// Document size over sigil size; filled in by scale verification
    pub sf: f32,
}

impl<'a> Match<'a> {
    fn candidate(sig: &'a Sigil, start: usize) -> Self {
        Self {
            sig,
            start,
            end: start + sig.ops.len(),
            origin: Point::nan(),
            sf: 0.0,
        }
    }
}

/// Recognize every sigil placement in a page's op stream.
///
/// The dictionary is read-only for the duration of the call and must already
/// carry its rotated twins (loading does this). `skip_alignment_check`
/// retains stray single-stroke matches; the capture tooling uses it to
/// inspect raw matches.
pub fn match_sigils<'a>(
    dict: &'a SigilDict,
    abs_ops: &[AbsOp],
    skip_alignment_check: bool,
) -> Vec<Match<'a>> {
    if abs_ops.len() < 2 {
        return Vec::new();
    }

    let non_zero_abs_ops = ops::remove_zero_ops(abs_ops);
    let diffed = ops::diff_ops(&non_zero_abs_ops);

    let matches = shape::match_without_scale(dict, &diffed);

    if matches.is_empty() {
        return matches;
    }

    let matches = prune::remove_submatches(matches);
    let mut matches = scale::check_scales(matches, &non_zero_abs_ops, &diffed);

    if !skip_alignment_check {
        matches = alignment::check_alignment(dict, matches);

        let ambiguous = count_ambiguous(&matches);
        if !ambiguous.is_empty() {
            log::debug!("ambiguous matches: {ambiguous:?}");
        }
    }

    matches
}
