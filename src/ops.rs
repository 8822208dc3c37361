//! Drawing operations and op-stream preparation.
//!
//! A document page arrives as a flat stream of absolute pen movements. Before
//! matching, the stream is stripped of degenerate strokes and converted to
//! differential form, where each op carries the delta from the previous pen
//! position.

use serde::{Deserialize, Serialize};

use crate::geometry::{BoundingBox, Point};

/// Strokes shorter than this are treated as zero-length
pub(crate) const ZERO_LENGTH_TOLERANCE: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Opcode {
    /// Pen up, reposition
    #[serde(rename = "m")]
    Move,

    /// Pen down, draw a straight stroke
    #[serde(rename = "l")]
    Line,

    /// Bezier control point from the document stream. Never part of a sigil;
    /// acts as a barrier no match can cross
    #[serde(rename = "c")]
    Curve,
}

impl Opcode {
    pub fn letter(self) -> u8 {
        match self {
            Opcode::Move => b'm',
            Opcode::Line => b'l',
            Opcode::Curve => b'c',
        }
    }
}

/// An op in page-local coordinates, as produced by the content stream reader
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbsOp {
    pub pos: Point,
    pub opcode: Opcode,
}

/// An op whose position is the delta from the previous op's endpoint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiffOp {
    pub delta: Point,
    pub opcode: Opcode,
}

impl AbsOp {
    pub fn new(x: f32, y: f32, opcode: Opcode) -> Self {
        Self {
            pos: Point::new(x, y),
            opcode,
        }
    }
}

impl DiffOp {
    pub fn new(dx: f32, dy: f32, opcode: Opcode) -> Self {
        Self {
            delta: Point::new(dx, dy),
            opcode,
        }
    }
}

// ops are stored as `[[x, y], "m"]` on the wire
impl Serialize for AbsOp {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ((self.pos.x, self.pos.y), self.opcode).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AbsOp {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let ((x, y), opcode) = <((f32, f32), Opcode)>::deserialize(deserializer)?;

        Ok(Self::new(x, y, opcode))
    }
}

impl Serialize for DiffOp {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ((self.delta.x, self.delta.y), self.opcode).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DiffOp {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let ((dx, dy), opcode) = <((f32, f32), Opcode)>::deserialize(deserializer)?;

        Ok(Self::new(dx, dy, opcode))
    }
}

/// Drop every op whose displacement from the previous retained position is
/// shorter than [ZERO_LENGTH_TOLERANCE]. The first op is always retained.
///
/// Panics if the stream does not begin with a `Move`; the content stream
/// reader guarantees it does.
pub fn remove_zero_ops(ops: &[AbsOp]) -> Vec<AbsOp> {
    assert!(
        matches!(ops.first(), Some(op) if op.opcode == Opcode::Move),
        "op stream must begin with a move"
    );

    let mut prev = ops[0].pos;
    let mut retained = vec![ops[0]];

    for &op in &ops[1..] {
        let delta = op.pos - prev;

        if delta.dot(delta) > ZERO_LENGTH_TOLERANCE * ZERO_LENGTH_TOLERANCE {
            retained.push(op);
            prev = op.pos;
        }
    }

    retained
}

/// Convert absolute ops to differential ops. The leading `Move` is consumed
/// as the origin anchor, so the result has one fewer element.
pub fn diff_ops(ops: &[AbsOp]) -> Vec<DiffOp> {
    assert!(
        matches!(ops.first(), Some(op) if op.opcode == Opcode::Move),
        "op stream must begin with a move"
    );

    let mut prev = ops[0].pos;

    ops[1..]
        .iter()
        .map(|op| {
            let diff = DiffOp {
                delta: op.pos - prev,
                opcode: op.opcode,
            };
            prev = op.pos;
            diff
        })
        .collect()
}

/// An orientation-tolerant size measure: the sum of `|dx| + |dy|` over all
/// strokes
pub fn ops_scale(ops: &[DiffOp]) -> f32 {
    ops.iter()
        .map(|op| op.delta.x.abs() + op.delta.y.abs())
        .sum()
}

/// Bounding box of the cumulative path traced from (0, 0)
pub fn ops_bounding_box(ops: &[DiffOp]) -> BoundingBox {
    let mut bbox = BoundingBox::new();
    let mut pos = Point::origin();

    bbox.add_point(pos);

    for op in ops {
        pos += op.delta;
        bbox.add_point(pos);
    }

    bbox
}

/// The glyph reference point: the (min x, min y) corner of the cumulative
/// path, as a vector from the path's start
pub fn ops_origin(ops: &[DiffOp]) -> Point {
    ops_bounding_box(ops).min()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn zero_length_strokes_are_dropped() {
        let ops = vec![
            AbsOp::new(1.0, 1.0, Opcode::Move),
            AbsOp::new(1.005, 1.0, Opcode::Line),
            AbsOp::new(4.0, 1.0, Opcode::Line),
        ];

        let retained = remove_zero_ops(&ops);

        assert_eq!(retained.len(), 2);
        assert_eq!(retained[1].pos, Point::new(4.0, 1.0));
    }

    #[test]
    fn displacement_measured_from_last_retained_position() {
        // each step is below tolerance but they accumulate past it
        let ops = vec![
            AbsOp::new(0.0, 0.0, Opcode::Move),
            AbsOp::new(0.008, 0.0, Opcode::Line),
            AbsOp::new(0.016, 0.0, Opcode::Line),
        ];

        let retained = remove_zero_ops(&ops);

        assert_eq!(retained.len(), 2);
        assert_eq!(retained[1].pos, Point::new(0.016, 0.0));
    }

    #[test]
    fn first_op_is_always_retained() {
        let ops = vec![
            AbsOp::new(2.0, 3.0, Opcode::Move),
            AbsOp::new(2.0, 3.0, Opcode::Line),
        ];

        let retained = remove_zero_ops(&ops);

        assert_eq!(retained, vec![ops[0]]);
    }

    #[test]
    #[should_panic(expected = "must begin with a move")]
    fn stream_not_starting_with_move_is_a_contract_violation() {
        diff_ops(&[AbsOp::new(0.0, 0.0, Opcode::Line)]);
    }

    #[test]
    fn diff_conversion_is_lossless_given_the_anchor() {
        let abs = vec![
            AbsOp::new(10.0, 20.0, Opcode::Move),
            AbsOp::new(11.0, 22.0, Opcode::Line),
            AbsOp::new(9.0, 22.0, Opcode::Line),
            AbsOp::new(15.0, 25.0, Opcode::Move),
            AbsOp::new(16.0, 24.0, Opcode::Line),
        ];

        let diffs = diff_ops(&abs);

        assert_eq!(diffs.len(), abs.len() - 1);

        let mut pos = abs[0].pos;
        for (diff, op) in diffs.iter().zip(&abs[1..]) {
            pos += diff.delta;
            assert_eq!(pos, op.pos);
            assert_eq!(diff.opcode, op.opcode);
        }
    }

    #[test]
    fn scale_sums_absolute_components() {
        let ops = vec![
            DiffOp::new(1.0, 0.0, Opcode::Line),
            DiffOp::new(-2.0, 3.0, Opcode::Line),
        ];

        assert_eq!(ops_scale(&ops), 6.0);
    }

    #[test]
    fn bounding_box_includes_path_start() {
        let ops = vec![DiffOp::new(2.0, 5.0, Opcode::Line)];

        let bbox = ops_bounding_box(&ops);

        assert_eq!(bbox.min(), Point::origin());
        assert_eq!(bbox.max(), Point::new(2.0, 5.0));
    }

    #[test]
    fn origin_is_min_corner_of_path() {
        // a "v" drawn left to right: down-right then up-right
        let ops = vec![
            DiffOp::new(1.0, -2.0, Opcode::Line),
            DiffOp::new(1.0, 2.0, Opcode::Line),
        ];

        assert_eq!(ops_origin(&ops), Point::new(0.0, -2.0));
    }

    #[test]
    fn ops_round_trip_through_json() {
        let op = AbsOp::new(1.5, -2.0, Opcode::Move);
        let json = serde_json::to_string(&op).unwrap();

        assert_eq!(json, "[[1.5,-2.0],\"m\"]");
        assert_eq!(serde_json::from_str::<AbsOp>(&json).unwrap(), op);
    }
}
