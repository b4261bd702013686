//! Collision detection and response for bounce toys
//!
//! Discs against the canvas walls, discs against each other, and discs
//! against static rectangles (platforms). Every normalization is guarded so
//! coincident centers never turn into NaN velocities.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::Bounds;

/// Distances at or below this are treated as coincident
pub const MIN_SEPARATION: f32 = 1e-6;

/// A moving circle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Disc {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

impl Disc {
    pub fn new(pos: Vec2, vel: Vec2, radius: f32) -> Self {
        Self { pos, vel, radius }
    }
}

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Collision point (if hit)
    pub point: Vec2,
    /// Surface normal at collision (pointing toward the circle center)
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Keep a circle inside `bounds`, reflecting the velocity component that
/// pushed it out.
///
/// The outgoing component is `|v| * restitution` pointing back inside, so a
/// circle that was already moving inward is never flipped back out.
/// Returns true if any wall was hit.
pub fn bounce_in_bounds(
    pos: &mut Vec2,
    vel: &mut Vec2,
    radius: f32,
    bounds: &Bounds,
    restitution: f32,
) -> bool {
    let inner = bounds.expand(-radius);
    let mut hit = false;

    if pos.x < inner.min.x {
        pos.x = inner.min.x;
        vel.x = vel.x.abs() * restitution;
        hit = true;
    } else if pos.x > inner.max.x {
        pos.x = inner.max.x;
        vel.x = -vel.x.abs() * restitution;
        hit = true;
    }

    if pos.y < inner.min.y {
        pos.y = inner.min.y;
        vel.y = vel.y.abs() * restitution;
        hit = true;
    } else if pos.y > inner.max.y {
        pos.y = inner.max.y;
        vel.y = -vel.y.abs() * restitution;
        hit = true;
    }

    hit
}

/// Resolve an overlapping pair of equal-mass discs.
///
/// Exchanges the normal component of the relative velocity (scaled by
/// `restitution`) when the discs are approaching. With `separate`, the
/// overlap is also split evenly between them; some toys skip that step and
/// let the next frames pull them apart.
///
/// Returns false when the discs do not overlap or their centers coincide.
pub fn resolve_disc_pair(a: &mut Disc, b: &mut Disc, restitution: f32, separate: bool) -> bool {
    let delta = b.pos - a.pos;
    let dist = delta.length();
    let min_dist = a.radius + b.radius;

    if dist >= min_dist || dist <= MIN_SEPARATION {
        return false;
    }

    let normal = delta / dist;

    if separate {
        let overlap = min_dist - dist;
        a.pos -= normal * (overlap * 0.5);
        b.pos += normal * (overlap * 0.5);
    }

    let approach = (a.vel - b.vel).dot(normal);
    if approach > 0.0 {
        let impulse = normal * approach * (1.0 + restitution) * 0.5;
        a.vel -= impulse;
        b.vel += impulse;
    }

    true
}

/// Check a circle against a static rectangle
pub fn circle_bounds_collision(center: Vec2, radius: f32, rect: &Bounds) -> CollisionResult {
    let closest = rect.clamp(center);
    let offset = center - closest;
    let dist = offset.length();

    if dist >= radius {
        return CollisionResult::miss();
    }

    if dist > MIN_SEPARATION {
        return CollisionResult {
            hit: true,
            point: closest,
            normal: offset / dist,
            penetration: radius - dist,
        };
    }

    // Center is inside the rectangle: push out through the nearest face
    let to_left = center.x - rect.min.x;
    let to_right = rect.max.x - center.x;
    let to_top = center.y - rect.min.y;
    let to_bottom = rect.max.y - center.y;
    let nearest = to_left.min(to_right).min(to_top).min(to_bottom);

    let (normal, point) = if nearest == to_top {
        (Vec2::NEG_Y, Vec2::new(center.x, rect.min.y))
    } else if nearest == to_bottom {
        (Vec2::Y, Vec2::new(center.x, rect.max.y))
    } else if nearest == to_left {
        (Vec2::NEG_X, Vec2::new(rect.min.x, center.y))
    } else {
        (Vec2::X, Vec2::new(rect.max.x, center.y))
    };

    CollisionResult {
        hit: true,
        point,
        normal,
        penetration: radius + nearest,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflect_velocity() {
        // Ball moving right, hits vertical wall (normal pointing left)
        let velocity = Vec2::new(100.0, 0.0);
        let normal = Vec2::new(-1.0, 0.0);

        let reflected = reflect_velocity(velocity, normal);
        assert!((reflected.x - (-100.0)).abs() < 0.001);
        assert!(reflected.y.abs() < 0.001);
    }

    #[test]
    fn test_bounce_right_wall() {
        let bounds = Bounds::from_size(100.0, 100.0);
        let mut pos = Vec2::new(98.0, 50.0);
        let mut vel = Vec2::new(5.0, 1.0);

        assert!(bounce_in_bounds(&mut pos, &mut vel, 5.0, &bounds, 0.8));
        assert!((pos.x - 95.0).abs() < 1e-5);
        assert!((vel.x + 4.0).abs() < 1e-5);
        assert!((vel.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_bounce_keeps_inward_velocity() {
        let bounds = Bounds::from_size(100.0, 100.0);
        let mut pos = Vec2::new(-2.0, 50.0);
        let mut vel = Vec2::new(3.0, 0.0);
        bounce_in_bounds(&mut pos, &mut vel, 0.0, &bounds, 1.0);
        assert_eq!(pos.x, 0.0);
        assert_eq!(vel.x, 3.0);
    }

    #[test]
    fn test_bounce_no_hit_inside() {
        let bounds = Bounds::from_size(100.0, 100.0);
        let mut pos = Vec2::new(50.0, 50.0);
        let mut vel = Vec2::new(5.0, 5.0);
        assert!(!bounce_in_bounds(&mut pos, &mut vel, 5.0, &bounds, 1.0));
        assert_eq!(vel, Vec2::new(5.0, 5.0));
    }

    #[test]
    fn test_head_on_elastic_swap() {
        let mut a = Disc::new(Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), 5.0);
        let mut b = Disc::new(Vec2::new(8.0, 0.0), Vec2::new(-1.0, 0.0), 5.0);

        assert!(resolve_disc_pair(&mut a, &mut b, 1.0, false));
        assert!((a.vel.x + 1.0).abs() < 1e-6);
        assert!((b.vel.x - 1.0).abs() < 1e-6);
        // No separation requested
        assert_eq!(a.pos, Vec2::ZERO);
    }

    #[test]
    fn test_separation_correction() {
        let mut a = Disc::new(Vec2::new(0.0, 0.0), Vec2::ZERO, 5.0);
        let mut b = Disc::new(Vec2::new(8.0, 0.0), Vec2::ZERO, 5.0);

        assert!(resolve_disc_pair(&mut a, &mut b, 1.0, true));
        assert!(((b.pos - a.pos).length() - 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_separating_pair_keeps_velocity() {
        let mut a = Disc::new(Vec2::new(0.0, 0.0), Vec2::new(-1.0, 0.0), 5.0);
        let mut b = Disc::new(Vec2::new(8.0, 0.0), Vec2::new(1.0, 0.0), 5.0);
        resolve_disc_pair(&mut a, &mut b, 1.0, false);
        assert_eq!(a.vel, Vec2::new(-1.0, 0.0));
        assert_eq!(b.vel, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_coincident_centers_are_skipped() {
        let mut a = Disc::new(Vec2::new(3.0, 3.0), Vec2::new(1.0, 0.0), 5.0);
        let mut b = Disc::new(Vec2::new(3.0, 3.0), Vec2::new(-1.0, 0.0), 5.0);
        assert!(!resolve_disc_pair(&mut a, &mut b, 1.0, true));
        assert!(a.pos.is_finite() && a.vel.is_finite());
        assert!(b.pos.is_finite() && b.vel.is_finite());
    }

    #[test]
    fn test_circle_rect_from_above() {
        let platform = Bounds::from_origin_size(Vec2::new(0.0, 100.0), Vec2::new(200.0, 20.0));
        let result = circle_bounds_collision(Vec2::new(50.0, 96.0), 8.0, &platform);
        assert!(result.hit);
        assert!((result.normal - Vec2::NEG_Y).length() < 1e-6);
        assert!((result.penetration - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_circle_rect_center_inside() {
        let platform = Bounds::from_origin_size(Vec2::new(0.0, 100.0), Vec2::new(200.0, 20.0));
        let result = circle_bounds_collision(Vec2::new(50.0, 103.0), 8.0, &platform);
        assert!(result.hit);
        assert_eq!(result.normal, Vec2::NEG_Y);
        assert!((result.penetration - 11.0).abs() < 1e-5);
    }

    #[test]
    fn test_circle_rect_miss() {
        let platform = Bounds::from_origin_size(Vec2::new(0.0, 100.0), Vec2::new(200.0, 20.0));
        assert!(!circle_bounds_collision(Vec2::new(50.0, 50.0), 8.0, &platform).hit);
    }
}
