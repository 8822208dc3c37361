pub use bounding_box::BoundingBox;
pub use point::Point;

mod bounding_box;
mod point;
