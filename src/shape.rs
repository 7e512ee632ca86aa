//! The fixed shape catalog: outlines, vertices and per-shape tolerances.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseShapeError;
use crate::geometry::{self, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Circle,
    Square,
    #[serde(rename = "cube3d", alias = "cube")]
    Cube3D,
}

// cube proportions relative to the frame size (width is the size itself)
const CUBE_HEIGHT_RATIO: f64 = 0.75;
const CUBE_DEPTH_RATIO: f64 = 0.22;

// share of the shorter surface side a shape occupies when fitted
const FLAT_FILL: f64 = 0.7;
const CUBE_FILL: f64 = 0.9;

impl ShapeKind {
    pub const ALL: [ShapeKind; 3] = [ShapeKind::Circle, ShapeKind::Square, ShapeKind::Cube3D];

    /// Maximum distance from the outline still counted as on path.
    pub fn tolerance(self) -> f64 {
        match self {
            ShapeKind::Cube3D => 24.0,
            ShapeKind::Circle | ShapeKind::Square => 10.0,
        }
    }

    /// Maximum distance from a vertex still counted as at the vertex.
    pub fn vertex_tolerance(self) -> f64 {
        match self {
            ShapeKind::Cube3D => 25.0,
            ShapeKind::Circle | ShapeKind::Square => 30.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Circle => "Circle",
            ShapeKind::Square => "Square",
            ShapeKind::Cube3D => "Cube3D",
        }
    }

    pub fn accessibility_description(self) -> &'static str {
        match self {
            ShapeKind::Circle => "Circle shape for tracing practice",
            ShapeKind::Square => "Square shape for tracing practice",
            ShapeKind::Cube3D => "3D Cube shape for tracing practice",
        }
    }

    fn fill_ratio(self) -> f64 {
        match self {
            ShapeKind::Cube3D => CUBE_FILL,
            ShapeKind::Circle | ShapeKind::Square => FLAT_FILL,
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShapeKind {
    type Err = ParseShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "circle" => Ok(ShapeKind::Circle),
            "square" => Ok(ShapeKind::Square),
            "cube3d" | "cube" => Ok(ShapeKind::Cube3D),
            _ => Err(ParseShapeError(s.to_string())),
        }
    }
}

/// Where a shape sits on the tracing surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeFrame {
    pub center: Point,
    pub size: f64,
}

impl ShapeFrame {
    pub fn new(center: Point, size: f64) -> Self {
        Self { center, size }
    }

    /// Centers `kind` on a `width` x `height` surface, scaled to the shorter side.
    pub fn fit(kind: ShapeKind, width: f64, height: f64) -> Self {
        Self {
            center: Point::new(width / 2.0, height / 2.0),
            size: width.min(height) * kind.fill_ratio(),
        }
    }

    pub fn radius(&self) -> f64 {
        self.size / 2.0
    }

    pub fn half_size(&self) -> f64 {
        self.size / 2.0
    }

    /// Projected cube corners, front face `A B C D` then back face `E F G H`.
    pub fn cube_vertices(&self) -> [Point; 8] {
        let w = self.size;
        let h = self.size * CUBE_HEIGHT_RATIO;
        let d = self.size * CUBE_DEPTH_RATIO;
        let left = self.center.x - w / 2.0;
        let right = self.center.x + w / 2.0;
        let top = self.center.y - h / 2.0;
        let bottom = top + h;

        [
            Point::new(left + d, top),
            Point::new(right, top),
            Point::new(right, bottom),
            Point::new(left + d, bottom),
            Point::new(left, top + d),
            Point::new(right - d, top + d),
            Point::new(right - d, bottom + d),
            Point::new(left, bottom + d),
        ]
    }

    /// The 12 wireframe edges: front face, back face, then connectors.
    pub fn cube_edges(&self) -> [(Point, Point); 12] {
        let [a, b, c, d, e, f, g, h] = self.cube_vertices();
        [
            (a, b),
            (b, c),
            (c, d),
            (d, a),
            (e, f),
            (f, g),
            (g, h),
            (h, e),
            (a, e),
            (b, f),
            (c, g),
            (d, h),
        ]
    }

    fn square_corners(&self) -> [Point; 4] {
        let half = self.half_size();
        let c = self.center;
        [
            Point::new(c.x - half, c.y - half),
            Point::new(c.x + half, c.y - half),
            Point::new(c.x + half, c.y + half),
            Point::new(c.x - half, c.y + half),
        ]
    }

    fn circle_axis_points(&self) -> [Point; 4] {
        let r = self.radius();
        let c = self.center;
        [
            Point::new(c.x, c.y - r),
            Point::new(c.x + r, c.y),
            Point::new(c.x, c.y + r),
            Point::new(c.x - r, c.y),
        ]
    }

    /// Candidate vertices for proximity checks. The circle has no corners, so
    /// its four axis points stand in for them.
    pub fn vertices(&self, kind: ShapeKind) -> Vec<Point> {
        match kind {
            ShapeKind::Circle => self.circle_axis_points().to_vec(),
            ShapeKind::Square => self.square_corners().to_vec(),
            ShapeKind::Cube3D => self.cube_vertices().to_vec(),
        }
    }

    /// Unsigned distance from `p` to the outline of `kind`.
    pub fn distance_to_outline(&self, kind: ShapeKind, p: Point) -> f64 {
        match kind {
            ShapeKind::Circle => (geometry::distance(p, self.center) - self.radius()).abs(),
            ShapeKind::Square => self.distance_to_square(p),
            ShapeKind::Cube3D => self
                .cube_edges()
                .iter()
                .map(|&(a, b)| geometry::distance_to_segment(p, a, b))
                .fold(f64::INFINITY, f64::min),
        }
    }

    // Inside the square this is the distance to the nearest edge line, so a
    // centered point reports the half size rather than zero.
    fn distance_to_square(&self, p: Point) -> f64 {
        let half = self.half_size();
        let left = self.center.x - half;
        let right = self.center.x + half;
        let top = self.center.y - half;
        let bottom = self.center.y + half;

        let inside_x = p.x >= left && p.x <= right;
        let inside_y = p.y >= top && p.y <= bottom;
        if inside_x && inside_y {
            return (p.x - left)
                .min(right - p.x)
                .min(p.y - top)
                .min(bottom - p.y);
        }

        let dx = (left - p.x).max(p.x - right).max(0.0);
        let dy = (top - p.y).max(p.y - bottom).max(0.0);
        match (dx > 0.0, dy > 0.0) {
            (true, true) => (dx * dx + dy * dy).sqrt(),
            (true, false) => dx,
            (false, true) => dy,
            (false, false) => 0.0,
        }
    }

    pub fn is_near_vertex(&self, kind: ShapeKind, p: Point) -> bool {
        let tol = kind.vertex_tolerance();
        self.vertices(kind)
            .into_iter()
            .any(|v| geometry::distance(p, v) <= tol)
    }
}
