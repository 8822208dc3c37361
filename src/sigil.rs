//! Sigil templates and the learned dictionary.
//!
//! A sigil is the captured stroke sequence of one character in one
//! orientation. The dictionary maps each character to one or more alternate
//! shapes, since the same letter is often drawn with different stroke
//! orderings. Dictionaries are persisted as pretty-printed JSON keyed by
//! character so that training diffs stay reviewable.

use std::{
    collections::BTreeMap,
    io::{Read, Write},
};

use serde::{Deserialize, Serialize};

use crate::{
    error::{SigilError, SigilResult},
    geometry::Point,
    ops::{self, AbsOp, DiffOp, Opcode},
};

/// A learned glyph template
#[derive(Debug, Clone, PartialEq)]
pub struct Sigil {
    /// Differential strokes; straight `Move`/`Line` only
    pub ops: Vec<DiffOp>,
    pub char: char,
    /// Vector from the first stroke's start to the glyph's baseline-left
    /// reference point. Estimated as the (min x, min y) corner of the
    /// cumulative path; the training tool corrects the y component so that
    /// all origins of a line of text are collinear.
    pub origin: Point,
    /// Sum of `|dx| + |dy|` over all strokes
    pub scale: f32,
    /// Horizontal extent of the cumulative path
    pub width: f32,
    /// Degrees; 0 for captured sigils, -90 for their rotated twins
    pub angle: f32,
}

impl Sigil {
    /// Build a sigil from captured strokes, estimating the origin from the
    /// path's bounding box
    pub fn new(ch: char, ops: Vec<DiffOp>) -> Self {
        let origin = ops::ops_origin(&ops);

        Self::with_origin(ch, ops, origin, 0.0)
    }

    /// Build a sigil with a known (possibly hand-corrected) origin
    pub fn with_origin(ch: char, ops: Vec<DiffOp>, origin: Point, angle: f32) -> Self {
        let scale = ops::ops_scale(&ops);
        let width = ops::ops_bounding_box(&ops).width();

        Self {
            ops,
            char: ch,
            origin,
            scale,
            width,
            angle,
        }
    }

    /// Capture a sigil from a selection of absolute ops
    pub fn from_abs_ops(ch: char, abs_ops: &[AbsOp]) -> Self {
        Self::new(ch, ops::diff_ops(abs_ops))
    }

    /// A copy of the sigil rotated clockwise by `degrees`. Rotation is
    /// isometric, so the scale carries over; the width is recomputed from
    /// the rotated path.
    pub fn rotated(&self, degrees: f32) -> Self {
        let theta = degrees.to_radians();

        let ops = self
            .ops
            .iter()
            .map(|op| DiffOp {
                delta: op.delta.rotate(theta),
                opcode: op.opcode,
            })
            .collect();

        Self::with_origin(self.char, ops, self.origin.rotate(theta), self.angle + degrees)
    }
}

/// The learned mapping from character to sigil variants
#[derive(Debug, Default, Clone)]
pub struct SigilDict {
    sigils: BTreeMap<char, Vec<Sigil>>,
}

/// Wire form of one sigil: `{ "ops": [...], "origin": [x, y], "angle": -90.0 }`
#[derive(Serialize, Deserialize)]
struct SigilRepr {
    ops: Vec<DiffOp>,
    origin: (f32, f32),
    #[serde(default, skip_serializing_if = "Option::is_none")]
    angle: Option<f32>,
}

/// Older dictionaries store a bare object where newer ones store a list
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(SigilRepr),
    Many(Vec<SigilRepr>),
}

impl SigilDict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, sigil: Sigil) {
        self.sigils.entry(sigil.char).or_default().push(sigil);
    }

    pub fn get(&self, ch: char) -> Option<&[Sigil]> {
        self.sigils.get(&ch).map(Vec::as_slice)
    }

    /// All variants of all characters, in character order
    pub fn variants(&self) -> impl Iterator<Item = &Sigil> {
        self.sigils.values().flatten()
    }

    /// Append a -90 degree twin for every captured sigil, so vertically set
    /// text matches too. Entries that already carry rotated variants are
    /// left alone.
    pub fn expand_rotations(&mut self) {
        for variants in self.sigils.values_mut() {
            if variants.iter().any(|sig| sig.angle != 0.0) {
                continue;
            }

            let twins: Vec<Sigil> = variants.iter().map(|sig| sig.rotated(-90.0)).collect();

            variants.extend(twins);
        }
    }

    /// Load a dictionary and expand rotated twins
    pub fn from_reader(reader: impl Read) -> SigilResult<Self> {
        let raw: BTreeMap<String, OneOrMany> = serde_json::from_reader(reader)?;

        let mut dict = Self::new();

        for (key, entry) in raw {
            let mut chars = key.chars();
            let ch = match (chars.next(), chars.next()) {
                (Some(ch), None) => ch,
                _ => return Err(SigilError::InvalidDictionaryKey { key }),
            };

            let reprs = match entry {
                OneOrMany::One(repr) => vec![repr],
                OneOrMany::Many(reprs) => reprs,
            };

            if reprs.is_empty() {
                return Err(SigilError::EmptyEntry { ch });
            }

            for repr in reprs {
                dict.insert(Self::sigil_from_repr(ch, repr)?);
            }
        }

        dict.expand_rotations();

        Ok(dict)
    }

    fn sigil_from_repr(ch: char, repr: SigilRepr) -> SigilResult<Sigil> {
        if repr.ops.is_empty() {
            return Err(SigilError::EmptySigil { ch });
        }

        if repr.ops.iter().any(|op| op.opcode == Opcode::Curve) {
            return Err(SigilError::CurveInSigil { ch });
        }

        let origin = Point::new(repr.origin.0, repr.origin.1);
        let sigil = Sigil::with_origin(ch, repr.ops, origin, repr.angle.unwrap_or(0.0));

        if sigil.scale <= 0.0 {
            return Err(SigilError::DegenerateSigil { ch });
        }

        Ok(sigil)
    }

    /// Persist the captured sigils as sorted, pretty-printed JSON. Rotated
    /// twins are derived at load time and not written out.
    pub fn to_writer(&self, writer: impl Write) -> SigilResult<()> {
        let raw: BTreeMap<String, Vec<SigilRepr>> = self
            .sigils
            .iter()
            .map(|(ch, variants)| {
                let reprs = variants
                    .iter()
                    .filter(|sig| sig.angle == 0.0)
                    .map(|sig| SigilRepr {
                        ops: sig.ops.clone(),
                        origin: (sig.origin.x, sig.origin.y),
                        angle: None,
                    })
                    .collect();

                (ch.to_string(), reprs)
            })
            .collect();

        serde_json::to_writer_pretty(writer, &raw)?;

        Ok(())
    }
}
