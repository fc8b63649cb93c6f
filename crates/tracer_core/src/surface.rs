//! Geometric primitives: spheres and triangles.

use glam::{Vec2, Vec3};

use crate::bbox::{BOUNDS_EPSILON, BoundingBox};
use crate::hit::HitInfo;
use crate::ray::Ray;

/// A sphere defined by center and radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let r = Vec3::splat(self.radius + BOUNDS_EPSILON);
        BoundingBox::new(self.center - r, self.center + r)
    }

    /// Solves `|o - c + t*d|^2 = r^2`, accepting the smallest root in
    /// `(t_min, t_max)`, then the larger.
    pub fn hit(&self, ray: &Ray, t_min: f32, t_max: f32) -> Option<HitInfo> {
        let dist = ray.origin - self.center;
        let poly_a = ray.dir.dot(ray.dir);
        let half_poly_b = dist.dot(ray.dir);
        let poly_c = dist.dot(dist) - self.radius * self.radius;
        let discriminant = half_poly_b * half_poly_b - poly_a * poly_c;

        if discriminant < 0.0 {
            return None;
        }

        let sqrt_d = discriminant.sqrt();
        let root1 = (-half_poly_b - sqrt_d) / poly_a;
        let root2 = (-half_poly_b + sqrt_d) / poly_a;

        let t_intersect = if t_min < root1 && root1 < t_max {
            root1
        } else if t_min < root2 && root2 < t_max {
            root2
        } else {
            return None;
        };

        let position = ray.at(t_intersect);
        let outward_normal = (position - self.center) / self.radius;

        let mut hit = HitInfo {
            position,
            t_intersect,
            uv: Vec2::ZERO,
            ..HitInfo::default()
        };
        hit.set_face_normal(ray, outward_normal);
        Some(hit)
    }
}

/// A single triangle vertex: position, shading normal, and texture coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub pos: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
}

/// A triangle with per-vertex normal and UV, interpolated by barycentric
/// coordinates at the hit point. The reference surface stores only the
/// three positions; per-vertex attributes are an addition this renderer
/// needs for textured meshes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vtx: [Vertex; 3],
}

impl Triangle {
    pub fn new(vtx: [Vertex; 3]) -> Self {
        Self { vtx }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let mut min = self.vtx[0].pos.min(self.vtx[1].pos).min(self.vtx[2].pos);
        let mut max = self.vtx[0].pos.max(self.vtx[1].pos).max(self.vtx[2].pos);
        min -= Vec3::splat(BOUNDS_EPSILON);
        max += Vec3::splat(BOUNDS_EPSILON);
        BoundingBox::new(min, max)
    }

    /// Möller–Trumbore intersection with barycentric normal/UV interpolation.
    pub fn hit(&self, ray: &Ray, t_min: f32, t_max: f32) -> Option<HitInfo> {
        const EPSILON: f32 = 0.0001;

        let v0 = self.vtx[0].pos;
        let v1 = self.vtx[1].pos;
        let v2 = self.vtx[2].pos;

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        let h = ray.dir.cross(edge2);
        let a = edge1.dot(h);
        if a.abs() < EPSILON {
            return None;
        }

        let s = ray.origin - v0;
        let u = s.dot(h) / a;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = ray.dir.dot(q) / a;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = edge2.dot(q) / a;
        if t > t_max || t < t_min {
            return None;
        }

        let w = 1.0 - u - v;
        let shading_normal =
            (self.vtx[0].normal * w + self.vtx[1].normal * u + self.vtx[2].normal * v).normalize();
        let uv = self.vtx[0].uv * w + self.vtx[1].uv * u + self.vtx[2].uv * v;

        let mut hit = HitInfo {
            position: ray.at(t),
            t_intersect: t,
            uv,
            ..HitInfo::default()
        };
        hit.set_face_normal(ray, shading_normal);
        Some(hit)
    }
}

/// A tagged geometric primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Surface {
    Sphere(Sphere),
    Triangle(Triangle),
}

impl Surface {
    pub fn bounding_box(&self) -> BoundingBox {
        match self {
            Surface::Sphere(s) => s.bounding_box(),
            Surface::Triangle(t) => t.bounding_box(),
        }
    }

    pub fn hit(&self, ray: &Ray, t_min: f32, t_max: f32) -> Option<HitInfo> {
        match self {
            Surface::Sphere(s) => s.hit(ray, t_min, t_max),
            Surface::Triangle(t) => t.hit(ray, t_min, t_max),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_hit_lies_on_surface() {
        let sphere = Sphere::new(Vec3::ZERO, 1.0);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 3.0), Vec3::new(0.0, 0.0, -1.0), 0.0);
        let hit = sphere.hit(&ray, 0.001, f32::INFINITY).unwrap();
        let dist = (hit.position - sphere.center).length();
        assert!((dist - sphere.radius).abs() < 1e-4);
        assert!(hit.unit_normal.dot(ray.dir) < 0.0);
    }

    #[test]
    fn sphere_miss_returns_none() {
        let sphere = Sphere::new(Vec3::ZERO, 1.0);
        let ray = Ray::new(Vec3::new(5.0, 5.0, 5.0), Vec3::new(0.0, 0.0, -1.0), 0.0);
        assert!(sphere.hit(&ray, 0.001, f32::INFINITY).is_none());
    }

    fn flat_triangle() -> Triangle {
        Triangle::new([
            Vertex {
                pos: Vec3::new(-1.0, -1.0, 0.0),
                normal: Vec3::Z,
                uv: Vec2::new(0.0, 0.0),
            },
            Vertex {
                pos: Vec3::new(1.0, -1.0, 0.0),
                normal: Vec3::Z,
                uv: Vec2::new(1.0, 0.0),
            },
            Vertex {
                pos: Vec3::new(0.0, 1.0, 0.0),
                normal: Vec3::Z,
                uv: Vec2::new(0.5, 1.0),
            },
        ])
    }

    #[test]
    fn triangle_hit_barycentrics_sum_to_one() {
        let tri = flat_triangle();
        let ray = Ray::new(Vec3::new(0.0, -0.5, 3.0), Vec3::new(0.0, 0.0, -1.0), 0.0);
        let hit = tri.hit(&ray, 0.001, f32::INFINITY).unwrap();
        assert!((hit.position.z).abs() < 1e-5);
        assert!(hit.t_intersect > 0.001);
    }

    #[test]
    fn triangle_miss_outside_edges() {
        let tri = flat_triangle();
        let ray = Ray::new(Vec3::new(10.0, 10.0, 3.0), Vec3::new(0.0, 0.0, -1.0), 0.0);
        assert!(tri.hit(&ray, 0.001, f32::INFINITY).is_none());
    }
}
