//! Extraction of line-drawing operations from page content streams.
//!
//! The extractor walks an already-decoded content stream, tracking the
//! current transformation matrix through `q`/`Q`/`cm`, and emits every
//! `m`/`l` endpoint (and `c` control point) in page-local coordinates. All
//! other operators carry no geometry the matcher cares about; they consume
//! their operands and are otherwise ignored.

use std::io::Read;

use flate2::read::ZlibDecoder;

use crate::{
    error::{SigilError, SigilResult},
    geometry::Point,
    ops::{AbsOp, Opcode},
};

pub use matrix::Matrix;

mod matrix;

/// Inflate a FlateDecode content stream
pub fn inflate_stream(buffer: &[u8]) -> SigilResult<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(buffer);
    let mut decoded = Vec::new();
    decoder.read_to_end(&mut decoded)?;

    Ok(decoded)
}

pub struct LineOpExtractor<'a> {
    buffer: &'a [u8],
    cursor: usize,
    ctm: Matrix,
    ctm_stack: Vec<Matrix>,
    operands: Vec<f32>,
    line_ops: Vec<AbsOp>,
}

impl<'a> LineOpExtractor<'a> {
    pub fn new(buffer: &'a [u8], initial_ctm: Matrix) -> Self {
        Self {
            buffer,
            cursor: 0,
            ctm: initial_ctm,
            ctm_stack: Vec::new(),
            operands: Vec::new(),
            line_ops: Vec::new(),
        }
    }

    /// Run the whole stream and return the transformed line ops
    pub fn extract(mut self) -> SigilResult<Vec<AbsOp>> {
        loop {
            self.skip_ignorable();

            match self.peek_byte() {
                None => break,
                Some(b'0'..=b'9' | b'+' | b'-' | b'.') => {
                    let number = self.lex_number()?;
                    self.operands.push(number);
                }
                Some(b) if b.is_ascii_alphabetic() || b == b'\'' || b == b'"' => {
                    let operator = self.lex_operator();
                    self.apply_operator(&operator)?;
                }
                Some(..) => {
                    // stray delimiter; nothing we track
                    self.next_byte();
                }
            }
        }

        Ok(self.line_ops)
    }

    fn apply_operator(&mut self, operator: &str) -> SigilResult<()> {
        match operator {
            "q" => self.ctm_stack.push(self.ctm),
            "Q" => {
                self.ctm = self
                    .ctm_stack
                    .pop()
                    .ok_or(SigilError::GraphicsStateUnderflow)?;
            }
            "cm" => {
                let [a, b, c, d, e, f] = self.take_operands("cm")?;
                self.ctm = Matrix::new(a, b, c, d, e, f).then(self.ctm);
            }
            "m" => {
                let [x, y] = self.take_operands("m")?;
                self.push_op(x, y, Opcode::Move);
            }
            "l" => {
                let [x, y] = self.take_operands("l")?;
                self.push_op(x, y, Opcode::Line);
            }
            "c" => {
                let [x1, y1, x2, y2, x3, y3] = self.take_operands("c")?;

                // control points are kept as barriers; curved glyphs are
                // outside the recognition grammar
                self.push_op(x1, y1, Opcode::Curve);
                self.push_op(x2, y2, Opcode::Curve);
                self.push_op(x3, y3, Opcode::Curve);
            }
            _ => {}
        }

        self.operands.clear();

        Ok(())
    }

    fn push_op(&mut self, x: f32, y: f32, opcode: Opcode) {
        self.line_ops.push(AbsOp {
            pos: self.ctm.apply(Point::new(x, y)),
            opcode,
        });
    }

    fn take_operands<const N: usize>(&mut self, op: &'static str) -> SigilResult<[f32; N]> {
        if self.operands.len() < N {
            return Err(SigilError::MissingOperands {
                op,
                expected: N,
                found: self.operands.len(),
            });
        }

        let tail = self.operands.split_off(self.operands.len() - N);

        Ok(<[f32; N]>::try_from(tail).unwrap())
    }

    fn lex_number(&mut self) -> SigilResult<f32> {
        let start = self.cursor;

        if let Some(b'+' | b'-') = self.peek_byte() {
            self.next_byte();
        }

        while let Some(b'0'..=b'9' | b'.') = self.peek_byte() {
            self.next_byte();
        }

        std::str::from_utf8(&self.buffer[start..self.cursor])
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or(SigilError::MalformedNumber { offset: start })
    }

    fn lex_operator(&mut self) -> String {
        let start = self.cursor;

        while let Some(b) = self.peek_byte() {
            // a trailing star or quote ends the operator token
            if b == b'*' || b == b'\'' || b == b'"' {
                self.next_byte();
                break;
            }

            if !b.is_ascii_alphanumeric() {
                break;
            }

            self.next_byte();
        }

        String::from_utf8_lossy(&self.buffer[start..self.cursor]).into_owned()
    }

    /// Skip whitespace, comments, and the operand types that never carry
    /// geometry: names, strings, arrays, hex strings, and dictionaries.
    /// Skipping them whole keeps their contents off the operand stack.
    fn skip_ignorable(&mut self) {
        while let Some(b) = self.peek_byte() {
            match b {
                b'\0' | b'\t' | b'\n' | b'\x0C' | b'\r' | b' ' => {
                    self.next_byte();
                }
                b'%' => self.skip_comment(),
                b'/' => self.skip_name(),
                b'(' => self.skip_string(),
                b'<' => self.skip_hex_or_dict(),
                b'[' => self.skip_array(),
                _ => break,
            }
        }
    }

    fn skip_comment(&mut self) {
        while let Some(b) = self.next_byte() {
            if b == b'\n' || b == b'\r' {
                break;
            }
        }
    }

    fn skip_name(&mut self) {
        self.next_byte();

        while let Some(b) = self.peek_byte() {
            let delimiter = matches!(
                b,
                b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
            );

            if b.is_ascii_whitespace() || delimiter {
                break;
            }

            self.next_byte();
        }
    }

    fn skip_string(&mut self) {
        self.next_byte();

        let mut depth = 1usize;

        while let Some(b) = self.next_byte() {
            match b {
                b'\\' => {
                    self.next_byte();
                }
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
        }
    }

    fn skip_array(&mut self) {
        self.next_byte();

        let mut depth = 1usize;

        while let Some(b) = self.next_byte() {
            match b {
                b'[' => depth += 1,
                b']' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
        }
    }

    fn skip_hex_or_dict(&mut self) {
        self.next_byte();

        if self.peek_byte() == Some(b'<') {
            // a dictionary; skip balanced << >> pairs
            self.next_byte();

            let mut depth = 1usize;

            while let Some(b) = self.next_byte() {
                if b == b'<' && self.peek_byte() == Some(b'<') {
                    self.next_byte();
                    depth += 1;
                } else if b == b'>' && self.peek_byte() == Some(b'>') {
                    self.next_byte();
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
            }
        } else {
            while let Some(b) = self.next_byte() {
                if b == b'>' {
                    break;
                }
            }
        }
    }

    fn peek_byte(&self) -> Option<u8> {
        self.buffer.get(self.cursor).copied()
    }

    fn next_byte(&mut self) -> Option<u8> {
        self.buffer.get(self.cursor).copied().map(|b| {
            self.cursor += 1;
            b
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn extract(stream: &[u8]) -> Vec<AbsOp> {
        LineOpExtractor::new(stream, Matrix::identity())
            .extract()
            .unwrap()
    }

    #[test]
    fn move_and_line_endpoints_are_emitted() {
        let ops = extract(b"1 2 m 3 4 l S");

        assert_eq!(
            ops,
            vec![
                AbsOp::new(1.0, 2.0, Opcode::Move),
                AbsOp::new(3.0, 4.0, Opcode::Line),
            ]
        );
    }

    #[test]
    fn negative_and_bare_fraction_numbers_parse() {
        let ops = extract(b"-1.5 .5 m");

        assert_eq!(ops, vec![AbsOp::new(-1.5, 0.5, Opcode::Move)]);
    }

    #[test]
    fn cm_transforms_are_applied_and_restored() {
        let ops = extract(b"q 2 0 0 2 0 0 cm 1 1 m 2 2 l Q 1 1 m");

        assert_eq!(
            ops,
            vec![
                AbsOp::new(2.0, 2.0, Opcode::Move),
                AbsOp::new(4.0, 4.0, Opcode::Line),
                AbsOp::new(1.0, 1.0, Opcode::Move),
            ]
        );
    }

    #[test]
    fn cm_transforms_nest() {
        let ops = extract(b"1 0 0 1 10 0 cm q 2 0 0 2 0 0 cm 1 0 m Q 1 0 m");

        assert_eq!(
            ops,
            vec![
                AbsOp::new(12.0, 0.0, Opcode::Move),
                AbsOp::new(11.0, 0.0, Opcode::Move),
            ]
        );
    }

    #[test]
    fn restore_without_save_is_an_error() {
        let result = LineOpExtractor::new(b"Q", Matrix::identity()).extract();

        assert!(matches!(result, Err(SigilError::GraphicsStateUnderflow)));
    }

    #[test]
    fn curves_emit_control_points_as_barriers() {
        let ops = extract(b"0 0 m 1 1 2 2 3 3 c");

        assert_eq!(ops.len(), 4);
        assert!(ops[1..].iter().all(|op| op.opcode == Opcode::Curve));
        assert_eq!(ops[3].pos, Point::new(3.0, 3.0));
    }

    #[test]
    fn text_and_paint_operators_are_ignored() {
        let ops = extract(b"BT /F1 12 Tf (skip (nested) \\) me) Tj ET 0.5 G [3 1] 0 d 1 2 m");

        assert_eq!(ops, vec![AbsOp::new(1.0, 2.0, Opcode::Move)]);
    }

    #[test]
    fn array_contents_stay_off_the_operand_stack() {
        // with the array skipped whole, the move has no operands left
        let result = LineOpExtractor::new(b"[5 6] m", Matrix::identity()).extract();

        assert!(matches!(
            result,
            Err(SigilError::MissingOperands { op: "m", found: 0, .. })
        ));

        // nested arrays are skipped balanced
        let ops = extract(b"[[3 1] 2] 0 d 1 2 m");

        assert_eq!(ops, vec![AbsOp::new(1.0, 2.0, Opcode::Move)]);
    }

    #[test]
    fn page_rotation_is_undone_by_the_initial_ctm() {
        let ctm = Matrix::for_page_rotation(90, 100.0, 200.0).unwrap();
        let ops = LineOpExtractor::new(b"10 20 m", ctm).extract().unwrap();

        assert_eq!(ops, vec![AbsOp::new(20.0, 90.0, Opcode::Move)]);
    }

    #[test]
    fn inflated_streams_round_trip() {
        use flate2::{write::ZlibEncoder, Compression};
        use std::io::Write;

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"1 2 m 3 4 l").unwrap();
        let compressed = encoder.finish().unwrap();

        let decoded = inflate_stream(&compressed).unwrap();
        let ops = extract(&decoded);

        assert_eq!(ops.len(), 2);
    }
}
