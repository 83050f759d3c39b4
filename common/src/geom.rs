//! Scalar 2d geometry helpers used by the collision code. These operate on
//! bare points so they can be tested without building a whole map.

use crate::consts::EPSILON;
use vek::*;

/// 2d cross product (z component of the 3d cross product).
pub fn perp_dot(a: Vec2<f32>, b: Vec2<f32>) -> f32 { a.x * b.y - a.y * b.x }

/// Whether `p` lies inside the triangle `a b c`, boundary included.
///
/// Works for either winding: the point is inside when the cross products of
/// each edge with the vector to `p` do not disagree in sign.
pub fn point_in_triangle(p: Vec2<f32>, a: Vec2<f32>, b: Vec2<f32>, c: Vec2<f32>) -> bool {
    let d1 = perp_dot(b - a, p - a);
    let d2 = perp_dot(c - b, p - b);
    let d3 = perp_dot(a - c, p - c);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

/// Whether `p` lies inside a scaled, rotated rectangle whose untransformed
/// top-left corner sits at `pos`.
///
/// Degenerate rectangles (a dimension or the scale collapsing below
/// [`EPSILON`]) contain nothing.
pub fn point_in_quad(
    p: Vec2<f32>,
    pos: Vec2<f32>,
    dims: Vec2<f32>,
    rotation: f32,
    scale: f32,
) -> bool {
    let (w, h) = (dims.x * scale, dims.y * scale);
    if w.abs() < EPSILON || h.abs() < EPSILON {
        return false;
    }
    let (sin, cos) = rotation.sin_cos();
    let rot = |v: Vec2<f32>| Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos);
    let corners = [
        pos,
        pos + rot(Vec2::new(w, 0.0)),
        pos + rot(Vec2::new(w, h)),
        pos + rot(Vec2::new(0.0, h)),
    ];
    // Half-plane test against each edge in order. All four cross products
    // share a sign exactly when the point is inside.
    let mut has_neg = false;
    let mut has_pos = false;
    for i in 0..4 {
        let d = perp_dot(corners[(i + 1) % 4] - corners[i], p - corners[i]);
        has_neg |= d < 0.0;
        has_pos |= d > 0.0;
    }
    !(has_neg && has_pos)
}

/// Distance from `p` to the closest point of the segment `a b`.
pub fn point_segment_distance(p: Vec2<f32>, a: Vec2<f32>, b: Vec2<f32>) -> f32 {
    let ab = b - a;
    let len_sq = ab.magnitude_squared();
    if len_sq < EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Whether the segments `a1 a2` and `b1 b2` touch or cross.
pub fn segments_intersect(
    a1: Vec2<f32>,
    a2: Vec2<f32>,
    b1: Vec2<f32>,
    b2: Vec2<f32>,
) -> bool {
    let d1 = perp_dot(b2 - b1, a1 - b1);
    let d2 = perp_dot(b2 - b1, a2 - b1);
    let d3 = perp_dot(a2 - a1, b1 - a1);
    let d4 = perp_dot(a2 - a1, b2 - a1);
    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    // Collinear or endpoint touches.
    let on = |d: f32, p: Vec2<f32>, s1: Vec2<f32>, s2: Vec2<f32>| {
        d == 0.0
            && p.x >= s1.x.min(s2.x)
            && p.x <= s1.x.max(s2.x)
            && p.y >= s1.y.min(s2.y)
            && p.y <= s1.y.max(s2.y)
    };
    on(d1, a1, b1, b2) || on(d2, a2, b1, b2) || on(d3, b1, a1, a2) || on(d4, b2, a1, a2)
}

/// `v` reduced to unit length, or `fallback` when it is too short to carry a
/// direction.
pub fn normalized_or(v: Vec2<f32>, fallback: Vec2<f32>) -> Vec2<f32> {
    let len = v.magnitude();
    if len < EPSILON { fallback } else { v / len }
}
