//! Surface intersection results.

use glam::{Vec2, Vec3};

use crate::ray::Ray;

/// The result of a successful ray–surface intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitInfo {
    pub position: Vec3,
    pub unit_normal: Vec3,
    pub uv: Vec2,
    pub t_intersect: f32,
    pub front_face: bool,
}

impl HitInfo {
    /// Orients `outward_normal` against `ray`, filling in `unit_normal` and
    /// `front_face`. `outward_normal` must be unit length.
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        self.front_face = ray.dir.dot(outward_normal) < 0.0;
        self.unit_normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }
}

impl Default for HitInfo {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            unit_normal: Vec3::Z,
            uv: Vec2::ZERO,
            t_intersect: 0.0,
            front_face: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_always_opposes_ray() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0), 0.0);
        let mut hit = HitInfo::default();
        hit.set_face_normal(&ray, Vec3::new(0.0, 0.0, -1.0));
        assert!(hit.unit_normal.dot(ray.dir) < 0.0);
        assert!(hit.front_face);

        let mut hit = HitInfo::default();
        hit.set_face_normal(&ray, Vec3::new(0.0, 0.0, 1.0));
        assert!(hit.unit_normal.dot(ray.dir) < 0.0);
        assert!(!hit.front_face);
    }
}
