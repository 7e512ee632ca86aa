//! Plane geometry helpers shared by the shape outlines and the trace summary.

use serde::{Deserialize, Serialize};

/// Screen-space coordinate (y grows downwards).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

pub fn distance(a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    (dx * dx + dy * dy).sqrt()
}

/// Direction from `a` to `b` in radians, measured with `atan2`.
pub fn angle(a: Point, b: Point) -> f64 {
    (b.y - a.y).atan2(b.x - a.x)
}

pub fn degrees_to_radians(deg: f64) -> f64 {
    deg.to_radians()
}

pub fn radians_to_degrees(rad: f64) -> f64 {
    rad.to_degrees()
}

pub fn is_point_in_circle(p: Point, center: Point, radius: f64) -> bool {
    distance(p, center) <= radius
}

/// Axis-aligned square of side `size` around `center`, bounds inclusive.
pub fn is_point_in_rectangle(p: Point, center: Point, size: f64) -> bool {
    let half = size / 2.0;
    p.x >= center.x - half && p.x <= center.x + half && p.y >= center.y - half && p.y <= center.y + half
}

/// Projects `p` radially onto the circumference.
///
/// The center has no direction; it is returned unchanged instead of
/// producing NaN coordinates.
pub fn closest_point_on_circle(p: Point, center: Point, radius: f64) -> Point {
    let dir = Point::new(p.x - center.x, p.y - center.y);
    let len = distance(Point::ZERO, dir);
    if len == 0.0 {
        return center;
    }
    Point::new(center.x + dir.x / len * radius, center.y + dir.y / len * radius)
}

/// Nearest point on the perimeter of the square of side `size`.
///
/// Strictly interior points snap to the nearest edge; ties go to left,
/// then right, then top, then bottom. Everything else is clamped.
pub fn closest_point_on_rectangle(p: Point, center: Point, size: f64) -> Point {
    let half = size / 2.0;
    let left = center.x - half;
    let right = center.x + half;
    let top = center.y - half;
    let bottom = center.y + half;

    if p.x > left && p.x < right && p.y > top && p.y < bottom {
        let to_left = p.x - left;
        let to_right = right - p.x;
        let to_top = p.y - top;
        let to_bottom = bottom - p.y;
        let min = to_left.min(to_right).min(to_top).min(to_bottom);

        return if min == to_left {
            Point::new(left, p.y)
        } else if min == to_right {
            Point::new(right, p.y)
        } else if min == to_top {
            Point::new(p.x, top)
        } else {
            Point::new(p.x, bottom)
        };
    }

    Point::new(p.x.clamp(left, right), p.y.clamp(top, bottom))
}

/// Distance from `p` to the segment `a`-`b`. A degenerate segment acts as a point.
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let len2 = abx * abx + aby * aby;
    let denom = if len2 == 0.0 { 1.0 } else { len2 };
    let t = (((p.x - a.x) * abx + (p.y - a.y) * aby) / denom).clamp(0.0, 1.0);
    distance(p, Point::new(a.x + abx * t, a.y + aby * t))
}

/// Total length of the polyline through `points`.
pub fn path_length(points: &[Point]) -> f64 {
    points.windows(2).map(|w| distance(w[0], w[1])).sum()
}

pub const DEFAULT_SIMPLIFY_TOLERANCE: f64 = 5.0;

/// Greedy thinning: keeps the first point and every point at least
/// `tolerance` away from the last kept one. Inputs with two points or
/// fewer come back untouched.
pub fn simplify_path(points: &[Point], tolerance: f64) -> Vec<Point> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let mut kept = Vec::with_capacity(points.len());
    let mut last = points[0];
    kept.push(last);
    for &p in &points[1..] {
        if distance(last, p) >= tolerance {
            kept.push(p);
            last = p;
        }
    }
    kept
}
