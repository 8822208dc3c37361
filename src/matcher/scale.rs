//! Per-candidate scale verification.

use crate::ops::{self, AbsOp, DiffOp, ZERO_LENGTH_TOLERANCE};

use super::Match;

/// Absolute tolerance on each stroke's length once the match's overall scale
/// factor is applied
pub(crate) const STROKE_LENGTH_TOLERANCE: f32 = 0.3;

/// Compute each candidate's scale factor from the total stroke length of the
/// ops it covers, then reject candidates where any single stroke disagrees
/// with that factor. Survivors get their absolute origin and scale factor
/// filled in.
pub(crate) fn check_scales<'a>(
    matches: Vec<Match<'a>>,
    abs_ops: &[AbsOp],
    ops: &[DiffOp],
) -> Vec<Match<'a>> {
    matches
        .into_iter()
        .filter_map(|mut m| {
            let doc_ops = &ops[m.start..m.end];
            let sf = ops::ops_scale(doc_ops) / m.sig.scale;

            for (sig_op, doc_op) in m.sig.ops.iter().zip(doc_ops) {
                debug_assert_eq!(
                    sig_op.opcode, doc_op.opcode,
                    "opcode skeletons diverged between matching and verification"
                );

                let sig_len = sig_op.delta.distance_from_origin();
                let doc_len = doc_op.delta.distance_from_origin();

                if sig_len < ZERO_LENGTH_TOLERANCE || doc_len < ZERO_LENGTH_TOLERANCE {
                    debug_assert!(
                        sig_len < ZERO_LENGTH_TOLERANCE && doc_len < ZERO_LENGTH_TOLERANCE,
                        "degenerate stroke paired with a real one"
                    );
                    continue;
                }

                if (doc_len - sig_len * sf).abs() > STROKE_LENGTH_TOLERANCE {
                    return None;
                }
            }

            m.origin = abs_ops[m.start].pos + m.sig.origin * sf;
            m.sf = sf;

            Some(m)
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{geometry::Point, ops::Opcode, sigil::Sigil};

    #[test]
    fn consistent_match_gets_scale_factor_and_origin() {
        let sig = Sigil::new(
            'v',
            vec![
                DiffOp::new(1.0, -2.0, Opcode::Line),
                DiffOp::new(1.0, 2.0, Opcode::Line),
            ],
        );

        // the same glyph drawn at double size, pen starting at (10, 14)
        let abs = vec![
            AbsOp::new(10.0, 14.0, Opcode::Move),
            AbsOp::new(12.0, 10.0, Opcode::Line),
            AbsOp::new(14.0, 14.0, Opcode::Line),
        ];
        let diffs = ops::diff_ops(&abs);

        let kept = check_scales(vec![Match::candidate(&sig, 0)], &abs, &diffs);

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].sf, 2.0);
        // origin vector (0, -2) scaled by 2 from the pen start
        assert_eq!(kept[0].origin, Point::new(10.0, 10.0));
    }

    #[test]
    fn one_disproportionate_stroke_rejects_the_match() {
        let sig = Sigil::new(
            'L',
            vec![
                DiffOp::new(1.0, 0.0, Opcode::Line),
                DiffOp::new(0.0, 1.0, Opcode::Line),
            ],
        );

        // second stroke twice as long as the template allows
        let abs = vec![
            AbsOp::new(0.0, 0.0, Opcode::Move),
            AbsOp::new(1.0, 0.0, Opcode::Line),
            AbsOp::new(1.0, 2.0, Opcode::Line),
        ];
        let diffs = ops::diff_ops(&abs);

        let kept = check_scales(vec![Match::candidate(&sig, 0)], &abs, &diffs);

        assert!(kept.is_empty());
    }

    #[test]
    fn small_deviations_within_tolerance_survive() {
        let sig = Sigil::new('-', vec![DiffOp::new(2.0, 0.0, Opcode::Line)]);

        let abs = vec![
            AbsOp::new(0.0, 0.0, Opcode::Move),
            AbsOp::new(2.2, 0.0, Opcode::Line),
        ];
        let diffs = ops::diff_ops(&abs);

        // a single stroke always agrees with its own scale factor
        let kept = check_scales(vec![Match::candidate(&sig, 0)], &abs, &diffs);

        assert_eq!(kept.len(), 1);
        assert!((kept[0].sf - 1.1).abs() < 1e-5);
    }
}
