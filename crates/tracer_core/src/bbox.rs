//! Axis-aligned bounding boxes.

use glam::Vec3;

/// An axis-aligned bounding box. Invariant: `min[a] <= max[a]` on every axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

/// Primitive bounds are inflated by this much on every axis to guard
/// against degenerate flatness (an axis-aligned triangle, for instance).
pub const BOUNDS_EPSILON: f32 = 0.001;

impl BoundingBox {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// The extent of the box along each axis.
    pub fn diagonal(&self) -> Vec3 {
        self.max - self.min
    }

    /// Twice the total area of the box's six faces, used by the KD-tree's
    /// surface-area heuristic.
    pub fn surface_area(&self) -> f32 {
        let d = self.diagonal();
        2.0 * (d.x * d.y + d.x * d.z + d.y * d.z)
    }

    /// The smallest box containing both `self` and `other`.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// `self[axis]`'s value on the given component, as `(min, max)`.
    pub fn axis_range(&self, axis: usize) -> (f32, f32) {
        (self.min[axis], self.max[axis])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_covers_both_boxes() {
        let a = BoundingBox::new(Vec3::splat(0.0), Vec3::splat(1.0));
        let b = BoundingBox::new(Vec3::new(-1.0, 0.5, 2.0), Vec3::new(0.5, 3.0, 2.5));
        let u = a.union(&b);
        assert_eq!(u.min, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(u.max, Vec3::new(1.0, 3.0, 2.5));
    }

    #[test]
    fn surface_area_of_unit_cube() {
        let b = BoundingBox::new(Vec3::ZERO, Vec3::ONE);
        assert!((b.surface_area() - 6.0).abs() < 1e-6);
    }
}
