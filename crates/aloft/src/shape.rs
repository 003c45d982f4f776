//! Ray intersection and line distance tests.
//!
//! Rays are given as an origin and a unit tangent. Each intersection returns
//! the first point of contact in front of the origin, or `None`.

use crate::scalar::within_epsilon;
use crate::vector::{Vec3, VectorExt};

/// First point where a ray meets a sphere surface.
///
/// Works from inside or outside the sphere. A ray starting on the surface
/// hits at its own origin. Only intersections with ray parameter `d >= 0`
/// count.
#[must_use]
pub fn ray_sphere_intersection(
    ray_origin: Vec3,
    ray_tangent: Vec3,
    sphere_radius: f64,
    sphere_center: Vec3,
) -> Option<Vec3> {
    let offset = ray_origin - sphere_center;
    let b = ray_tangent.dot(offset);
    let c = offset.length_squared() - sphere_radius * sphere_radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let root = discriminant.sqrt();
    [-b - root, -b + root]
        .into_iter()
        .find(|d| *d >= 0.0)
        .map(|d| ray_origin + ray_tangent * d)
}

/// Point where a ray meets an infinite plane.
///
/// `None` when the ray is parallel to the plane or the plane is behind (or
/// exactly at) the origin.
#[must_use]
pub fn ray_plane_intersection(
    ray_origin: Vec3,
    ray_tangent: Vec3,
    plane_origin: Vec3,
    plane_normal: Vec3,
) -> Option<Vec3> {
    let denominator = ray_tangent.dot(plane_normal);
    if within_epsilon(denominator, 0.0) {
        return None;
    }
    let d = (plane_origin - ray_origin).dot(plane_normal) / denominator;
    (d > 0.0).then(|| ray_origin + ray_tangent * d)
}

/// First point where a ray meets an infinite cylinder.
///
/// The cylinder is described by a point on its axis, a unit axis direction
/// and a radius. `_cylinder_length` is accepted for a capped variant but the
/// cylinder is currently treated as unbounded along its axis. Only roots with
/// ray parameter `d > 0` count, so a ray grazing the surface at its own
/// origin reports the far side instead. `None` when the ray runs parallel to
/// the axis or misses.
#[must_use]
pub fn ray_cylinder_intersection(
    ray_origin: Vec3,
    ray_tangent: Vec3,
    cylinder_endpoint: Vec3,
    cylinder_tangent: Vec3,
    cylinder_radius: f64,
    _cylinder_length: f64,
) -> Option<Vec3> {
    let b = cylinder_endpoint - ray_origin;
    let na = ray_tangent.cross(cylinder_tangent);
    let na_na = na.dot(na);
    if within_epsilon(na_na, 0.0) {
        return None;
    }
    let b_na = b.dot(na);
    let radicand = na_na * cylinder_radius * cylinder_radius - b_na * b_na;
    if radicand < 0.0 {
        return None;
    }
    let ba = b.cross(cylinder_tangent);
    let na_ba = na.dot(ba);
    let radical = radicand.sqrt();
    [(na_ba - radical) / na_na, (na_ba + radical) / na_na]
        .into_iter()
        .find(|d| *d > 0.0)
        .map(|d| ray_origin + ray_tangent * d)
}

/// Shortest distance between two infinite lines.
///
/// Parallel lines measure the perpendicular gap between them.
#[must_use]
pub fn distance_between_lines(
    origin_a: Vec3,
    tangent_a: Vec3,
    origin_b: Vec3,
    tangent_b: Vec3,
) -> f64 {
    let offset = origin_b - origin_a;
    let normal = tangent_a.cross(tangent_b);
    if normal.is_zero_length() {
        offset
            .perpendicular_component(tangent_a.normalize_or_0())
            .length()
    } else {
        offset.dot(normal).abs() / normal.length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-12
    }

    mod sphere_tests {
        use super::*;

        #[test]
        fn test_hit_from_outside() {
            let hit = ray_sphere_intersection(Vec3::new(-2.0, 0.0, 0.0), Vec3::X, 1.0, Vec3::ZERO);
            assert_eq!(hit, Some(Vec3::new(-1.0, 0.0, 0.0)));
        }

        #[test]
        fn test_hit_from_inside_takes_far_root() {
            let hit = ray_sphere_intersection(Vec3::ZERO, Vec3::Y, 5.0, Vec3::ZERO);
            assert_eq!(hit, Some(Vec3::new(0.0, 5.0, 0.0)));
        }

        #[test]
        fn test_tangent_origin_on_surface() {
            let hit = ray_sphere_intersection(Vec3::X, Vec3::Y, 1.0, Vec3::ZERO);
            assert_eq!(hit, Some(Vec3::X));
        }

        #[test]
        fn test_miss_and_behind() {
            assert_eq!(
                ray_sphere_intersection(Vec3::new(-2.0, 3.0, 0.0), Vec3::X, 1.0, Vec3::ZERO),
                None
            );
            assert_eq!(
                ray_sphere_intersection(Vec3::new(2.0, 0.0, 0.0), Vec3::X, 1.0, Vec3::ZERO),
                None
            );
        }
    }

    mod plane_tests {
        use super::*;

        #[test]
        fn test_hit() {
            let hit = ray_plane_intersection(Vec3::ZERO, Vec3::Y, Vec3::new(0.0, 3.0, 0.0), Vec3::Y);
            assert_eq!(hit, Some(Vec3::new(0.0, 3.0, 0.0)));
            // Normal facing the other way gives the same point.
            let hit = ray_plane_intersection(Vec3::ZERO, Vec3::Y, Vec3::new(0.0, 3.0, 0.0), -Vec3::Y);
            assert_eq!(hit, Some(Vec3::new(0.0, 3.0, 0.0)));
        }

        #[test]
        fn test_parallel_and_behind() {
            assert_eq!(ray_plane_intersection(Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Y), None);
            assert_eq!(ray_plane_intersection(Vec3::ZERO, -Vec3::Y, Vec3::Y, Vec3::Y), None);
            assert_eq!(ray_plane_intersection(Vec3::Y, Vec3::Y, Vec3::Y, Vec3::Y), None);
        }
    }

    mod cylinder_tests {
        use super::*;

        #[test]
        fn test_grazing_origin_reports_far_side() {
            let hit = ray_cylinder_intersection(
                Vec3::new(-1.0, 0.0, 0.0),
                Vec3::X,
                Vec3::new(0.0, -1.0, 0.0),
                Vec3::Y,
                1.0,
                2.0,
            );
            assert!(close(hit.unwrap(), Vec3::new(1.0, 0.0, 0.0)));
        }

        #[test]
        fn test_hit_from_outside() {
            let hit = ray_cylinder_intersection(
                Vec3::new(-5.0, 7.0, 0.0),
                Vec3::X,
                Vec3::ZERO,
                Vec3::Y,
                2.0,
                1.0,
            );
            assert!(close(hit.unwrap(), Vec3::new(-2.0, 7.0, 0.0)));
        }

        #[test]
        fn test_miss_and_parallel() {
            let miss = ray_cylinder_intersection(
                Vec3::new(-5.0, 0.0, 3.0),
                Vec3::X,
                Vec3::ZERO,
                Vec3::Y,
                2.0,
                1.0,
            );
            assert_eq!(miss, None);
            let parallel =
                ray_cylinder_intersection(Vec3::new(0.5, 0.0, 0.0), Vec3::Y, Vec3::ZERO, Vec3::Y, 2.0, 1.0);
            assert_eq!(parallel, None);
        }
    }

    mod line_tests {
        use super::*;

        #[test]
        fn test_skew_lines() {
            let d = distance_between_lines(Vec3::ZERO, Vec3::X, Vec3::new(0.0, 0.0, 4.0), Vec3::Y);
            assert!((d - 4.0).abs() < 1e-12);
        }

        #[test]
        fn test_parallel_lines() {
            let d = distance_between_lines(Vec3::ZERO, Vec3::X, Vec3::new(9.0, 3.0, 4.0), -Vec3::X);
            assert!((d - 5.0).abs() < 1e-12);
        }

        #[test]
        fn test_intersecting_lines() {
            let d = distance_between_lines(Vec3::ZERO, Vec3::X, Vec3::new(2.0, -1.0, 0.0), Vec3::Y);
            assert!(d.abs() < 1e-12);
        }
    }

    proptest! {
        #[test]
        fn prop_sphere_hit_lies_on_surface(
            ox in -20.0f64..20.0, oy in -20.0f64..20.0, oz in -20.0f64..20.0,
            tx in -1.0f64..1.0, ty in -1.0f64..1.0, tz in -1.0f64..1.0,
            radius in 0.5f64..15.0,
        ) {
            let tangent = Vec3::new(tx, ty, tz);
            prop_assume!(tangent.length() > 0.1);
            let tangent = tangent.normalize();
            let origin = Vec3::new(ox, oy, oz);
            if let Some(hit) = ray_sphere_intersection(origin, tangent, radius, Vec3::ZERO) {
                prop_assert!((hit.length() - radius).abs() < 1e-9);
                prop_assert!((hit - origin).dot(tangent) >= -1e-9);
            }
        }

        #[test]
        fn prop_ray_from_inside_sphere_always_hits(
            x in -0.5f64..0.5, y in -0.5f64..0.5, z in -0.5f64..0.5,
            tx in -1.0f64..1.0, ty in -1.0f64..1.0, tz in -1.0f64..1.0,
        ) {
            let tangent = Vec3::new(tx, ty, tz);
            prop_assume!(tangent.length() > 0.1);
            let hit = ray_sphere_intersection(Vec3::new(x, y, z), tangent.normalize(), 1.0, Vec3::ZERO);
            prop_assert!(hit.is_some());
        }

        #[test]
        fn prop_cylinder_hit_lies_on_surface(
            ox in -20.0f64..20.0, oy in -20.0f64..20.0, oz in -20.0f64..20.0,
            tx in -1.0f64..1.0, ty in -1.0f64..1.0, tz in -1.0f64..1.0,
            radius in 0.5f64..10.0,
        ) {
            let tangent = Vec3::new(tx, ty, tz);
            prop_assume!(tangent.length() > 0.1);
            let tangent = tangent.normalize();
            prop_assume!(tangent.cross(Vec3::Y).length() > 0.1);
            let origin = Vec3::new(ox, oy, oz);
            if let Some(hit) = ray_cylinder_intersection(origin, tangent, Vec3::ZERO, Vec3::Y, radius, 1.0) {
                let radial = Vec3::new(hit.x, 0.0, hit.z).length();
                prop_assert!((radial - radius).abs() < 1e-6);
                prop_assert!((hit - origin).dot(tangent) > 0.0);
            }
        }
    }
}
