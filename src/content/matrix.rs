use crate::{
    error::{SigilError, SigilResult},
    geometry::Point,
};

/// A PDF-style affine transform `[a b c d e f]`, mapping
/// `(x, y)` to `(a*x + c*y + e, b*x + d*y + f)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Matrix {
    pub const fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub const fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    /// The combined transform applying `self` first, then `after`
    pub fn then(&self, after: Matrix) -> Matrix {
        Matrix {
            a: after.a * self.a + after.c * self.b,
            b: after.b * self.a + after.d * self.b,
            c: after.a * self.c + after.c * self.d,
            d: after.b * self.c + after.d * self.d,
            e: after.a * self.e + after.c * self.f + after.e,
            f: after.b * self.e + after.d * self.f + after.f,
        }
    }

    /// The transform undoing a page's `/Rotate` entry, given the page box
    /// dimensions. The page corner is assumed to sit at the coordinate
    /// origin.
    pub fn for_page_rotation(rotation: i32, width: f32, height: f32) -> SigilResult<Matrix> {
        Ok(match rotation.rem_euclid(360) {
            0 => Self::identity(),
            90 => Self::new(0.0, -1.0, 1.0, 0.0, 0.0, width),
            180 => Self::new(-1.0, 0.0, 0.0, -1.0, width, height),
            270 => Self::new(0.0, 1.0, -1.0, 0.0, height, 0.0),
            _ => return Err(SigilError::UnsupportedRotation(rotation)),
        })
    }
}
