//! 2D math helpers shared by combat and boss logic.

use glam::Vec2;

/// Distances below this are treated as zero.
pub const EPS: f32 = 1e-3;

/// Area of the triangle spanned by three points.
///
/// Used as a cheap point-to-line-segment proximity proxy: for a segment of
/// roughly unit length, a small area means the third point lies close to
/// the line through the other two.
#[must_use]
pub fn triangle_area(p1: Vec2, p2: Vec2, p3: Vec2) -> f32 {
    0.5 * (p1.y * (p2.x - p3.x) + p2.y * (p3.x - p1.x) + p3.y * (p1.x - p2.x)).abs()
}

/// Angle at `apex` between the rays towards `a` and `b`, in radians.
///
/// Law of cosines with the cosine argument clamped to [-1, 1], so floating
/// point noise on near-degenerate triangles never escapes the `acos`
/// domain. Returns 0 when either ray is degenerate (zero-length), which
/// callers treat as "always in front".
#[must_use]
pub fn angle_at(apex: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ra = apex.distance(a);
    let rb = apex.distance(b);
    if ra < EPS || rb < EPS {
        return 0.0;
    }
    let c = a.distance(b);
    let cos = ((ra * ra + rb * rb - c * c) / (2.0 * ra * rb)).clamp(-1.0, 1.0);
    cos.acos()
}

/// Normalizes a vector, returning `Vec2::ZERO` for near-zero input.
#[must_use]
pub fn normalize_or_zero(v: Vec2) -> Vec2 {
    if v.length_squared() < EPS * EPS {
        Vec2::ZERO
    } else {
        v.normalize()
    }
}

/// Axis-aligned rectangle test (exclusive bounds, matching camera culling).
#[must_use]
pub fn point_in_rect(point: Vec2, origin: Vec2, width: f32, height: f32) -> bool {
    point.x > origin.x
        && point.x < origin.x + width
        && point.y > origin.y
        && point.y < origin.y + height
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangle_area_degenerate() {
        let p = Vec2::new(1.0, 1.0);
        assert_eq!(triangle_area(p, p, p), 0.0);
        // Collinear points
        assert_eq!(
            triangle_area(Vec2::ZERO, Vec2::new(1.0, 1.0), Vec2::new(2.0, 2.0)),
            0.0
        );
    }

    #[test]
    fn test_triangle_area_unit() {
        let area = triangle_area(Vec2::ZERO, Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0));
        assert!((area - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_angle_at_right_angle() {
        let angle = angle_at(Vec2::ZERO, Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0));
        assert!((angle - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn test_angle_at_degenerate_is_zero() {
        assert_eq!(angle_at(Vec2::ZERO, Vec2::ZERO, Vec2::new(1.0, 0.0)), 0.0);
    }

    #[test]
    fn test_angle_at_collinear_clamps() {
        // Opposite rays: cosine argument lands exactly on -1, acos must not NaN.
        let angle = angle_at(Vec2::ZERO, Vec2::new(5.0, 0.0), Vec2::new(-3.0, 0.0));
        assert!((angle - std::f32::consts::PI).abs() < 1e-5);
    }

    #[test]
    fn test_normalize_or_zero() {
        assert_eq!(normalize_or_zero(Vec2::ZERO), Vec2::ZERO);
        let n = normalize_or_zero(Vec2::new(3.0, 4.0));
        assert!((n.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_point_in_rect() {
        let origin = Vec2::new(10.0, 10.0);
        assert!(point_in_rect(Vec2::new(15.0, 15.0), origin, 10.0, 10.0));
        assert!(!point_in_rect(Vec2::new(25.0, 15.0), origin, 10.0, 10.0));
        // Bounds are exclusive
        assert!(!point_in_rect(Vec2::new(10.0, 15.0), origin, 10.0, 10.0));
    }

    proptest::proptest! {
        // The clamp must keep acos in its domain for any geometry,
        // including near-collinear triangles.
        #[test]
        fn prop_angle_at_is_finite_and_in_range(
            ax in -1e3f32..1e3, ay in -1e3f32..1e3,
            bx in -1e3f32..1e3, by in -1e3f32..1e3,
            px in -1e3f32..1e3, py in -1e3f32..1e3,
        ) {
            let angle = angle_at(Vec2::new(px, py), Vec2::new(ax, ay), Vec2::new(bx, by));
            proptest::prop_assert!(angle.is_finite());
            proptest::prop_assert!((0.0..=std::f32::consts::PI + 1e-4).contains(&angle));
        }
    }
}
