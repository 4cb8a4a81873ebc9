//! Canvas geometry: wire curves and hit distances

use serde::Serialize;

use crate::model::Point;

/// Horizontal pull of a wire's control points, as a fraction of its width
const WIRE_TENSION: f64 = 0.3;

/// Segments used to approximate a wire when measuring distance to it
const CURVE_SAMPLES: usize = 20;

/// Cubic Bézier used to draw a wire
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CubicBezier {
    pub from: Point,
    pub ctrl1: Point,
    pub ctrl2: Point,
    pub to: Point,
}

impl CubicBezier {
    /// Wire between two pins. Control points keep the endpoint heights and
    /// pull 30% of the horizontal span inwards.
    pub fn wire(from: Point, to: Point) -> Self {
        let dx = to.x - from.x;
        Self {
            from,
            ctrl1: Point::new(from.x + dx * WIRE_TENSION, from.y),
            ctrl2: Point::new(to.x - dx * WIRE_TENSION, to.y),
            to,
        }
    }

    /// Evaluate the curve at `t` in `[0, 1]`
    pub fn eval(&self, t: f64) -> Point {
        let mt = 1.0 - t;
        let a = mt * mt * mt;
        let b = 3.0 * mt * mt * t;
        let c = 3.0 * mt * t * t;
        let d = t * t * t;
        Point::new(
            a * self.from.x + b * self.ctrl1.x + c * self.ctrl2.x + d * self.to.x,
            a * self.from.y + b * self.ctrl1.y + c * self.ctrl2.y + d * self.to.y,
        )
    }

    /// Approximate distance from `point` to the curve
    pub fn distance_to(&self, point: Point) -> f64 {
        let mut min_sq = f64::MAX;
        let mut prev = self.eval(0.0);
        for i in 1..=CURVE_SAMPLES {
            let curr = self.eval(i as f64 / CURVE_SAMPLES as f64);
            min_sq = min_sq.min(distance_to_segment_sq(point, prev, curr));
            prev = curr;
        }
        min_sq.sqrt()
    }
}

fn distance_to_segment_sq(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let cx = a.x + t * dx - p.x;
    let cy = a.y + t * dy - p.y;
    cx * cx + cy * cy
}

/// Is `point` within `radius` of `center`?
pub fn within_radius(point: Point, center: Point, radius: f64) -> bool {
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    dx * dx + dy * dy <= radius * radius
}
