//! Pin placement on component bodies

use crate::model::{Component, Point};

/// Canvas position of the pin at `index` on `component`.
///
/// - one pin sits in the middle of the body
/// - two pins sit on the left and right edges, vertically centered
/// - with three or more, the first and last pins take the left and right
///   edges and the rest are spread along the top edge
pub fn pin_position(component: &Component, index: usize) -> Point {
    let Point { x, y } = component.position;
    let w = component.size.width;
    let h = component.size.height;
    let total = component.pins.len();

    if total <= 1 {
        return Point::new(x + w / 2.0, y + h / 2.0);
    }
    if index == 0 {
        return Point::new(x, y + h / 2.0);
    }
    if index >= total - 1 {
        return Point::new(x + w, y + h / 2.0);
    }

    let segments = (total - 2) as f64;
    let progress = (index - 1) as f64 / segments;
    Point::new(x + w * progress, y)
}

/// Positions of every pin on `component`, in pin order
pub fn pin_positions(component: &Component) -> Vec<Point> {
    (0..component.pins.len())
        .map(|i| pin_position(component, i))
        .collect()
}
