use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SigilError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("sigil dictionary is not valid JSON: {0}")]
    DictionaryJson(#[from] serde_json::Error),

    #[error("dictionary key {key:?} is not a single character")]
    InvalidDictionaryKey { key: String },

    #[error("dictionary entry for {ch:?} has no sigils")]
    EmptyEntry { ch: char },

    #[error("sigil for {ch:?} has no strokes")]
    EmptySigil { ch: char },

    #[error("sigil for {ch:?} has zero scale")]
    DegenerateSigil { ch: char },

    #[error("sigil for {ch:?} contains a curve op; sigils are straight strokes only")]
    CurveInSigil { ch: char },

    #[error("content stream restored graphics state with no matching save")]
    GraphicsStateUnderflow,

    #[error("content stream operator {op} expects {expected} operands, found {found}")]
    MissingOperands {
        op: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("malformed number in content stream at byte offset {offset}")]
    MalformedNumber { offset: usize },

    #[error("unsupported page rotation: {0}")]
    UnsupportedRotation(i32),
}

pub type SigilResult<T> = Result<T, SigilError>;
