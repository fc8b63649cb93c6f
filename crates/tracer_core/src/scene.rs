//! A scene: a skybox plus a set of materialed objects.
//!
//! Acceleration (the KD-tree over bounded objects) lives in `tracer_render`,
//! which builds one from [`Scene::objects`] and [`Scene::bounded_indices`];
//! `tracer_core` only knows about the raw object list and the linear-scan
//! fallback.

use std::sync::Arc;

use glam::Vec3;
use log::debug;

use crate::bbox::BoundingBox;
use crate::hit::HitInfo;
use crate::material::Material;
use crate::ray::Ray;
use crate::skybox::Skybox;
use crate::surface::Surface;

pub const RT_EPSILON: f32 = 0.001;

/// A single piece of geometry paired with the material it scatters against.
#[derive(Debug, Clone)]
pub struct Object {
    pub surface: Surface,
    pub material: Arc<Material>,
}

impl Object {
    pub fn new(surface: Surface, material: Arc<Material>) -> Self {
        Self { surface, material }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.surface.bounding_box()
    }
}

/// The full set of objects and environment a ray can interact with.
///
/// Every surface this renderer supports (spheres, triangles) is bounded, so
/// `unbound_indices` is always empty; it's kept to preserve the reference's
/// bounded/unbounded split for any future unbounded surface (an infinite
/// plane, say) without reshaping the scene API.
#[derive(Debug, Clone)]
pub struct Scene {
    skybox: Arc<Skybox>,
    objects: Vec<Object>,
    bounded_indices: Vec<usize>,
    unbound_indices: Vec<usize>,
}

impl Scene {
    pub fn new(skybox: Arc<Skybox>) -> Self {
        Self {
            skybox,
            objects: Vec::new(),
            bounded_indices: Vec::new(),
            unbound_indices: Vec::new(),
        }
    }

    pub fn add_object(&mut self, object: Object) {
        self.objects.push(object);
    }

    /// Splits objects into bounded (KD-tree-eligible) and unbounded sets.
    /// Must be called once after every object has been added and before
    /// rendering; `tracer_render`'s KD-tree build reads `bounded_indices`.
    pub fn prepare(&mut self) {
        self.bounded_indices.clear();
        self.unbound_indices.clear();
        for (idx, _object) in self.objects.iter().enumerate() {
            // Every current surface type is bounded; this still routes
            // through the same bounded/unbounded split the reference scene
            // does, rather than assuming it.
            self.bounded_indices.push(idx);
        }
        debug!(
            "prepared scene: {} objects, {} bounded, {} unbound",
            self.objects.len(),
            self.bounded_indices.len(),
            self.unbound_indices.len()
        );
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    pub fn bounded_indices(&self) -> &[usize] {
        &self.bounded_indices
    }

    pub fn unbound_indices(&self) -> &[usize] {
        &self.unbound_indices
    }

    pub fn skybox(&self) -> &Arc<Skybox> {
        &self.skybox
    }

    pub fn sky_color(&self, dir: Vec3) -> Vec3 {
        self.skybox.color_at(dir)
    }

    /// Linear-scan closest hit over every object, ignoring any acceleration
    /// structure. Used as the reference oracle in tests and as a fallback
    /// when no KD-tree has been built (an empty scene, for instance).
    pub fn closest_hit_linear(&self, ray: &Ray, t_min: f32, t_max: f32) -> Option<(usize, HitInfo)> {
        let mut best: Option<(usize, HitInfo)> = None;

        for (idx, object) in self.objects.iter().enumerate() {
            if let Some(hit) = object.surface.hit(ray, t_min, t_max) {
                let closer = match &best {
                    Some((_, best_hit)) => hit.t_intersect < best_hit.t_intersect,
                    None => true,
                };
                if closer {
                    best = Some((idx, hit));
                }
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Sphere;
    use crate::texture::Texture;

    fn unit_sphere_scene() -> Scene {
        let mut scene = Scene::new(Arc::new(Skybox::solid(Vec3::ZERO)));
        scene.add_object(Object::new(
            Surface::Sphere(Sphere::new(Vec3::ZERO, 1.0)),
            Arc::new(Material::diffuse(Texture::solid(Vec3::splat(0.5)))),
        ));
        scene.prepare();
        scene
    }

    #[test]
    fn prepare_marks_every_object_bounded() {
        let scene = unit_sphere_scene();
        assert_eq!(scene.bounded_indices(), &[0]);
        assert!(scene.unbound_indices().is_empty());
    }

    #[test]
    fn closest_hit_linear_finds_the_sphere() {
        let scene = unit_sphere_scene();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0), 0.0);
        let (idx, hit) = scene.closest_hit_linear(&ray, RT_EPSILON, f32::INFINITY).unwrap();
        assert_eq!(idx, 0);
        assert!((hit.t_intersect - 4.0).abs() < 1e-4);
    }

    #[test]
    fn closest_hit_linear_misses_empty_space() {
        let scene = unit_sphere_scene();
        let ray = Ray::new(Vec3::new(10.0, 10.0, 10.0), Vec3::new(0.0, 0.0, -1.0), 0.0);
        assert!(scene.closest_hit_linear(&ray, RT_EPSILON, f32::INFINITY).is_none());
    }

    #[test]
    fn sky_color_reaches_through_scene() {
        let scene_color = Vec3::new(0.1, 0.2, 0.3);
        let scene = Scene::new(Arc::new(Skybox::solid(scene_color)));
        assert_eq!(scene.sky_color(Vec3::X), scene_color);
    }
}
