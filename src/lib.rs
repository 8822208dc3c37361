//! Vector-glyph recognition for schematic PDFs.
//!
//! Schematic pages draw their text as bare line strokes, with no encoded
//! characters behind them. This crate matches a learned dictionary of stroke
//! templates ("sigils") against a page's drawing operations and reports
//! where each character sits and at what size and orientation, so that an
//! invisible text layer can be placed over the page and found by a viewer's
//! search.

mod content;
mod error;
mod geometry;
mod matcher;
mod ops;
mod sigil;
mod spatial;

pub use crate::{
    content::{inflate_stream, LineOpExtractor, Matrix},
    error::{SigilError, SigilResult},
    geometry::{BoundingBox, Point},
    matcher::{count_ambiguous, match_sigils, Match},
    ops::{
        diff_ops, ops_bounding_box, ops_origin, ops_scale, remove_zero_ops, AbsOp, DiffOp, Opcode,
    },
    sigil::{Sigil, SigilDict},
    spatial::BoxLookup,
};
