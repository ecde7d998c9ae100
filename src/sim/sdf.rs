//! SDF-based board collision
//!
//! The boards are a rounded rectangle around center ice. Signed distance is
//! negative inside the playing surface and positive beyond the boards.

use glam::Vec2;

use crate::consts::*;

/// Signed distance to a rounded box centered at the origin
pub fn sd_rounded_box(p: Vec2, half_extents: Vec2, corner_radius: f32) -> f32 {
    let r = corner_radius.min(half_extents.x).min(half_extents.y);
    let q = p.abs() - half_extents + Vec2::splat(r);
    q.max(Vec2::ZERO).length() + q.x.max(q.y).min(0.0) - r
}

/// Signed distance to the boards (negative = on the ice)
#[inline]
pub fn sd_boards(p: Vec2) -> f32 {
    sd_rounded_box(
        p,
        Vec2::new(BOARDS_HALF_WIDTH, BOARDS_HALF_HEIGHT),
        BOARDS_CORNER_RADIUS,
    )
}

/// Compute SDF gradient (surface normal) using central differences
pub fn sdf_gradient<F>(p: Vec2, sdf: F) -> Vec2
where
    F: Fn(Vec2) -> f32,
{
    let eps = 0.5;
    let dx = sdf(p + Vec2::new(eps, 0.0)) - sdf(p - Vec2::new(eps, 0.0));
    let dy = sdf(p + Vec2::new(0.0, eps)) - sdf(p - Vec2::new(0.0, eps));
    Vec2::new(dx, dy).normalize_or_zero()
}

/// Result of SDF collision check
#[derive(Debug, Clone)]
pub struct SdfCollision {
    pub hit: bool,
    pub distance: f32,
    /// Points back onto the ice
    pub normal: Vec2,
    pub penetration: f32,
}

impl SdfCollision {
    pub fn miss() -> Self {
        Self {
            hit: false,
            distance: f32::MAX,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check whether a circle pokes through the boards
pub fn check_board_collision(pos: Vec2, radius: f32) -> SdfCollision {
    let dist = sd_boards(pos);

    if dist > -radius {
        // Gradient points outward; flip it back toward the ice
        let normal = -sdf_gradient(pos, sd_boards);
        SdfCollision {
            hit: true,
            distance: dist,
            normal,
            penetration: dist + radius,
        }
    } else {
        SdfCollision::miss()
    }
}

/// Reflect velocity off a surface with given normal
#[inline]
pub fn reflect(vel: Vec2, normal: Vec2) -> Vec2 {
    vel - 2.0 * vel.dot(normal) * normal
}
