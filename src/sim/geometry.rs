//! Axis-aligned rectangles for nets and goal regions
//!
//! A rectangle is defined by its center and half extents, matching how the
//! nets are placed on the rink (anchored at their center point).

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub center: Vec2,
    pub half_extents: Vec2,
}

impl Rect {
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self {
            center,
            half_extents: size * 0.5,
        }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.center - self.half_extents
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.center + self.half_extents
    }

    /// Strict containment (points on the edge are outside)
    pub fn contains_point(&self, point: Vec2) -> bool {
        let min = self.min();
        let max = self.max();
        point.x > min.x && point.x < max.x && point.y > min.y && point.y < max.y
    }

    /// Closest point on or inside the rectangle
    pub fn closest_point(&self, point: Vec2) -> Vec2 {
        point.clamp(self.min(), self.max())
    }

    /// Check a circle against the rectangle, returning the push-out normal
    /// and penetration depth on overlap
    pub fn circle_overlap(&self, center: Vec2, radius: f32) -> Option<(Vec2, f32)> {
        let closest = self.closest_point(center);
        let delta = center - closest;
        let dist = delta.length();

        if dist > 0.0 {
            if dist < radius {
                return Some((delta / dist, radius - dist));
            }
            return None;
        }

        // Center is inside: push out through the nearest edge
        let local = center - self.center;
        let gap = self.half_extents - local.abs();
        if gap.x < gap.y {
            let normal = Vec2::new(local.x.signum(), 0.0);
            Some((normal, gap.x + radius))
        } else {
            let normal = Vec2::new(0.0, local.y.signum());
            Some((normal, gap.y + radius))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains_point_strict() {
        let rect = Rect::new(Vec2::new(2.0, 452.0), Vec2::new(55.0, 21.9));
        assert!(rect.contains_point(Vec2::new(2.0, 452.0)));
        assert!(rect.contains_point(Vec2::new(-25.0, 445.0)));
        // On the edge is not inside
        assert!(!rect.contains_point(Vec2::new(29.5, 452.0)));
        assert!(!rect.contains_point(Vec2::new(2.0, 400.0)));
    }

    #[test]
    fn test_circle_overlap_outside() {
        let rect = Rect::new(Vec2::ZERO, Vec2::new(20.0, 10.0));
        let (normal, depth) = rect
            .circle_overlap(Vec2::new(0.0, 8.0), 4.0)
            .expect("overlap");
        assert!((normal - Vec2::Y).length() < 1e-6);
        assert!((depth - 1.0).abs() < 1e-5);
        assert!(rect.circle_overlap(Vec2::new(0.0, 20.0), 4.0).is_none());
    }

    #[test]
    fn test_circle_overlap_center_inside() {
        let rect = Rect::new(Vec2::ZERO, Vec2::new(20.0, 10.0));
        let (normal, depth) = rect
            .circle_overlap(Vec2::new(9.0, 0.0), 2.0)
            .expect("overlap");
        assert_eq!(normal, Vec2::X);
        assert!((depth - 3.0).abs() < 1e-5);
    }
}
