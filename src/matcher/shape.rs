//! Direction-only shape matching.

use crate::{
    ops::{DiffOp, ZERO_LENGTH_TOLERANCE},
    sigil::SigilDict,
};

use super::Match;

/// Two strokes point the same way when the cosine of the angle between them
/// exceeds this
pub(crate) const DIRECTION_COSINE_TOLERANCE: f32 = 0.93;

/// Find every position in the stream where a sigil's opcode skeleton occurs
/// and all stroke directions agree within tolerance. Stroke lengths are not
/// considered here.
pub(crate) fn match_without_scale<'a>(dict: &'a SigilDict, ops: &[DiffOp]) -> Vec<Match<'a>> {
    let stream = opcode_skeleton(ops);

    let mut matches = Vec::new();

    for sig in dict.variants() {
        let pattern = opcode_skeleton(&sig.ops);

        if pattern.len() > stream.len() {
            continue;
        }

        // overlapping occurrences; a window at i covers ops[i..i + len]
        for (start, window) in stream.windows(pattern.len()).enumerate() {
            if window != pattern.as_slice() {
                continue;
            }

            let doc_ops = &ops[start..start + sig.ops.len()];

            let directions_agree = doc_ops
                .iter()
                .zip(&sig.ops)
                .all(|(doc_op, sig_op)| strokes_aligned(doc_op, sig_op));

            if directions_agree {
                matches.push(Match::candidate(sig, start));
            }
        }
    }

    matches
}

/// Opcode letters wrapped in sentinel `m`s on both ends. The wrapping forces
/// every occurrence to line up with true path boundaries: the op before a
/// candidate (and the op after it) must be a reposition or the stream edge,
/// so a sigil cannot be recognized in the middle of a longer pen-down run.
fn opcode_skeleton(ops: &[DiffOp]) -> Vec<u8> {
    let mut skeleton = Vec::with_capacity(ops.len() + 2);

    skeleton.push(b'm');
    skeleton.extend(ops.iter().map(|op| op.opcode.letter()));
    skeleton.push(b'm');

    skeleton
}

fn strokes_aligned(doc_op: &DiffOp, sig_op: &DiffOp) -> bool {
    let doc_len = doc_op.delta.distance_from_origin();
    let sig_len = sig_op.delta.distance_from_origin();

    // a degenerate stroke only agrees with another degenerate stroke
    if doc_len < ZERO_LENGTH_TOLERANCE || sig_len < ZERO_LENGTH_TOLERANCE {
        return doc_len < ZERO_LENGTH_TOLERANCE && sig_len < ZERO_LENGTH_TOLERANCE;
    }

    doc_op.delta.dot(sig_op.delta) / doc_len / sig_len > DIRECTION_COSINE_TOLERANCE
}
