//! Thin-lens camera.

use glam::Vec3;

use crate::random::Rng;
use crate::ray::Ray;

/// A thin-lens camera producing rays from normalized film coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    origin: Vec3,
    bottom_left_corner: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    lens_radius: f32,
}

impl Camera {
    /// `vfov_deg` is the vertical field of view in degrees.
    pub fn new(
        look_from: Vec3,
        look_to: Vec3,
        vup: Vec3,
        aspect_ratio: f32,
        vfov_deg: f32,
        aperture: f32,
        focus_dist: f32,
    ) -> Self {
        let theta = vfov_deg.to_radians();
        let viewport_height = 2.0 * (theta / 2.0).tan();
        let viewport_width = aspect_ratio * viewport_height;

        let w = (look_from - look_to).normalize();
        let u = vup.cross(w).normalize();
        let v = w.cross(u);

        let horizontal = u * (viewport_width * focus_dist);
        let vertical = v * (viewport_height * focus_dist);
        let bottom_left_corner =
            look_from - horizontal * 0.5 - vertical * 0.5 - w * focus_dist;

        Self {
            origin: look_from,
            bottom_left_corner,
            horizontal,
            vertical,
            u,
            v,
            w,
            lens_radius: aperture / 2.0,
        }
    }

    /// Generates a ray through normalized film coordinates `(s, t) in [0, 1]^2`,
    /// jittered across the lens for depth of field.
    pub fn get_ray(&self, s: f32, t: f32, rng: &mut Rng) -> Ray {
        let rd = rng.in_unit_disc() * self.lens_radius;
        let offset = Vec3::new(s * rd.x, t * rd.y, 0.0);

        let origin = self.origin + offset;
        let dir = self.bottom_left_corner + self.horizontal * s + self.vertical * t - origin;

        Ray::new(origin, dir, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pinhole_camera_points_at_target() {
        let cam = Camera::new(
            Vec3::new(0.0, 0.0, 3.0),
            Vec3::ZERO,
            Vec3::Y,
            1.0,
            90.0,
            0.0,
            1.0,
        );
        let mut rng = Rng::seed(1, 1);
        // lens radius is zero, so the center ray should point straight at the target.
        let ray = cam.get_ray(0.5, 0.5, &mut rng);
        let dir = ray.dir.normalize();
        assert!((dir - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-4);
    }

    #[test]
    fn lens_offset_is_applied_in_film_space_not_through_the_camera_basis() {
        let look_from = Vec3::new(0.0, 0.0, 3.0);
        let cam = Camera::new(look_from, Vec3::ZERO, Vec3::Y, 1.0, 90.0, 2.0, 1.0);
        let (s, t) = (0.3, 0.7);

        let mut disc_rng = Rng::seed(5, 9);
        let rd = disc_rng.in_unit_disc() * 1.0; // lens_radius = aperture / 2 = 1.0
        let expected_origin = look_from + Vec3::new(s * rd.x, t * rd.y, 0.0);

        let mut ray_rng = Rng::seed(5, 9);
        let ray = cam.get_ray(s, t, &mut ray_rng);

        assert!((ray.origin - expected_origin).length() < 1e-5);
    }
}
