//! Plane geometry used by hit-testing and relationship drawing.
//!
//! Everything works in canvas space (pixels, y pointing down). Model
//! coordinates are integers; computations happen in `f32` through [`Vec2f`].

use serde::{Deserialize, Serialize};

/// Side length of relationship glyphs: distance from the tip to the base
/// centre of a triangle, or half the long diagonal of a diamond.
pub const GLYPH_SIZE: f32 = 15.0;

/// How far a line stops short of its end point when a triangle is drawn there.
pub const TRIANGLE_OFFSET: f32 = 15.0;

/// How far a line stops short of its end point when a diamond is drawn there.
pub const DIAMOND_OFFSET: f32 = 30.0;

/// Integer canvas coordinate, as delivered by pointer events and stored in the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn to_vec2(self) -> Vec2f {
        Vec2f::new(self.x as f32, self.y as f32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2f {
    pub x: f32,
    pub y: f32,
}

impl Vec2f {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Vec2f) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Axis-aligned rectangle given by its top-left corner and size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectF {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl RectF {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Inclusive containment test, matching how a pointer on the border still hits the box.
    pub fn contains(&self, p: Vec2f) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }
}

/// Distance from `p` to the closed segment `a`–`b`.
///
/// The projection parameter is clamped to `[0, 1]`, so a zero-length segment
/// yields the plain point distance.
pub fn distance_point_to_segment(p: Vec2f, a: Vec2f, b: Vec2f) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance(Vec2f::new(a.x + t * dx, a.y + t * dy))
}

/// Distance from `p` to the nearest segment of a polyline. `None` for fewer than two points.
pub fn distance_point_to_polyline(p: Vec2f, points: &[Vec2f]) -> Option<f32> {
    points
        .windows(2)
        .map(|w| distance_point_to_segment(p, w[0], w[1]))
        .min_by(|a, b| a.total_cmp(b))
}

/// Move `end` back towards `start` by `offset` pixels along the `start → end` direction.
pub fn nearest_endpoint_offset(end: Vec2f, start: Vec2f, offset: f32) -> Vec2f {
    let angle = line_angle(start, end);
    Vec2f::new(end.x - offset * angle.cos(), end.y - offset * angle.sin())
}

/// Angle of the `from → to` direction in radians.
pub fn line_angle(from: Vec2f, to: Vec2f) -> f32 {
    (to.y - from.y).atan2(to.x - from.x)
}

/// Vertices of a triangle whose apex sits on `tip`, opening back along `angle`.
///
/// The two base corners lie at ±30° from the reversed line direction, placed
/// so the base centre is [`GLYPH_SIZE`] behind the apex.
pub fn triangle_glyph(tip: Vec2f, angle: f32) -> [Vec2f; 3] {
    let spread = 30f32.to_radians();
    let side = GLYPH_SIZE / spread.cos();
    [
        tip,
        Vec2f::new(
            tip.x - side * (angle - spread).cos(),
            tip.y - side * (angle - spread).sin(),
        ),
        Vec2f::new(
            tip.x - side * (angle + spread).cos(),
            tip.y - side * (angle + spread).sin(),
        ),
    ]
}

/// Vertices of a diamond whose front tip sits on `tip`.
///
/// Sides leave the tip at ±45°, the back tip is `2 * GLYPH_SIZE` behind the
/// front one, which is exactly [`DIAMOND_OFFSET`].
pub fn diamond_glyph(tip: Vec2f, angle: f32) -> [Vec2f; 4] {
    let spread = 45f32.to_radians();
    let side = GLYPH_SIZE / spread.cos();
    let back = 2.0 * GLYPH_SIZE;
    [
        tip,
        Vec2f::new(
            tip.x - side * (angle - spread).cos(),
            tip.y - side * (angle - spread).sin(),
        ),
        Vec2f::new(tip.x - back * angle.cos(), tip.y - back * angle.sin()),
        Vec2f::new(
            tip.x - side * (angle + spread).cos(),
            tip.y - side * (angle + spread).sin(),
        ),
    ]
}

/// The six connection points of a box, in their fixed order:
/// top-left-third, top-two-thirds, bottom-left-third, bottom-two-thirds,
/// left-centre, right-centre.
pub fn connection_points(rect: RectF) -> [Vec2f; 6] {
    let third = rect.width / 3.0;
    let mid_y = rect.y + rect.height / 2.0;
    [
        Vec2f::new(rect.x + third, rect.y),
        Vec2f::new(rect.x + 2.0 * third, rect.y),
        Vec2f::new(rect.x + third, rect.bottom()),
        Vec2f::new(rect.x + 2.0 * third, rect.bottom()),
        Vec2f::new(rect.x, mid_y),
        Vec2f::new(rect.right(), mid_y),
    ]
}
