//! Range queries over 2D points.

use crate::geometry::Point;

/// Finds all points inside an axis-aligned box.
///
/// Backed by one sorted array per axis. A query bisects the array of the
/// axis on which the box is narrower relative to the point cloud's spread,
/// then checks the other coordinate per candidate. Returns indices into the
/// original point list, in unspecified order.
pub struct BoxLookup {
    points: Vec<Point>,
    by_x: Vec<(f32, usize)>,
    by_y: Vec<(f32, usize)>,
    x_range: f32,
    y_range: f32,
}

impl BoxLookup {
    pub fn new(points: Vec<Point>) -> Self {
        let mut by_x: Vec<(f32, usize)> = points
            .iter()
            .enumerate()
            .map(|(i, p)| (p.x, i))
            .collect();
        by_x.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut by_y: Vec<(f32, usize)> = points
            .iter()
            .enumerate()
            .map(|(i, p)| (p.y, i))
            .collect();
        by_y.sort_by(|a, b| a.0.total_cmp(&b.0));

        let x_range = by_x.last().map_or(0.0, |last| last.0 - by_x[0].0);
        let y_range = by_y.last().map_or(0.0, |last| last.0 - by_y[0].0);

        Self {
            points,
            by_x,
            by_y,
            x_range,
            y_range,
        }
    }

    pub fn search(&self, min: Point, max: Point) -> Vec<usize> {
        if self.points.is_empty() {
            return Vec::new();
        }

        let x_frac = if self.x_range > 0.0 {
            (max.x - min.x) / self.x_range
        } else {
            f32::INFINITY
        };
        let y_frac = if self.y_range > 0.0 {
            (max.y - min.y) / self.y_range
        } else {
            f32::INFINITY
        };

        let (sorted, first_min, first_max, second_min, second_max, second_coord): (
            _,
            _,
            _,
            _,
            _,
            fn(Point) -> f32,
        ) = if x_frac < y_frac {
            (&self.by_x, min.x, max.x, min.y, max.y, |p: Point| p.y)
        } else {
            (&self.by_y, min.y, max.y, min.x, max.x, |p: Point| p.x)
        };

        let start = sorted.partition_point(|&(coord, _)| coord < first_min);
        let end = sorted.partition_point(|&(coord, _)| coord <= first_max);

        sorted[start..end]
            .iter()
            .filter(|&&(_, i)| {
                let second = second_coord(self.points[i]);
                second_min <= second && second <= second_max
            })
            .map(|&(_, i)| i)
            .collect()
    }
}
