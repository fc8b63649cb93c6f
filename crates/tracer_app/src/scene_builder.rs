//! Builds the `Scene` a render runs against: either the reference's
//! hardcoded demo (spheres standing in for the asset-dependent meshes
//! `main.c`'s `FillScene` normally loads) or, when [`Config::scene_path`]
//! names an OBJ file, that mesh placed the way `Mesh_AddToScene` places it.

use std::path::Path;
use std::sync::Arc;

use glam::Vec3;

use tracer_core::material::Material;
use tracer_core::scene::{Object, Scene};
use tracer_core::skybox::Skybox;
use tracer_core::surface::{Sphere, Surface};
use tracer_core::texture::Texture;

use crate::app_error::AppError;
use crate::config::Config;

/// Reads a skybox directory containing `xpos.bmp, xneg.bmp, ypos.bmp,
/// yneg.bmp, zpos.bmp, zneg.bmp`.
pub fn load_skybox_dir(dir: impl AsRef<Path>) -> Result<Skybox, AppError> {
    let dir = dir.as_ref();
    let names = ["xpos.bmp", "xneg.bmp", "ypos.bmp", "yneg.bmp", "zpos.bmp", "zneg.bmp"];

    let mut faces = Vec::with_capacity(6);
    for name in names {
        let (width, height, rgb) = tracer_io::read_bmp(dir.join(name))?;
        let pixels = rgb
            .chunks_exact(3)
            .map(|c| Vec3::new(c[0] as f32 / 255.0, c[1] as f32 / 255.0, c[2] as f32 / 255.0))
            .collect();
        faces.push(Texture::from_pixels(width, height, pixels));
    }

    let faces: [Texture; 6] = faces.try_into().expect("exactly 6 face names above");
    Ok(Skybox::new(faces))
}

/// The reference's demo scene, rebuilt from primitives since the original's
/// mesh/texture assets aren't part of this repository: a ground sphere and
/// three colored spheres on the axes, one per Disney lobe this renderer
/// implements, plus a metal sphere standing in for "Shiny Sphere".
fn build_primitive_demo(scene: &mut Scene) {
    let ground = Arc::new(Material::disney_diffuse(Texture::solid(Vec3::splat(0.5)), 1.0, 0.0));
    scene.add_object(Object::new(
        Surface::Sphere(Sphere::new(Vec3::new(0.0, 0.0, -1000.0), 1000.0)),
        ground,
    ));

    let diffuse_red = Arc::new(Material::disney_diffuse(Texture::solid(Vec3::new(0.8, 0.1, 0.1)), 1.0, 0.0));
    scene.add_object(Object::new(
        Surface::Sphere(Sphere::new(Vec3::new(-3.0, 0.0, 1.0), 1.0)),
        diffuse_red,
    ));

    let metal_gold = Arc::new(Material::disney_metal(Texture::solid(Vec3::new(0.9, 0.7, 0.2)), 0.2, 0.3));
    scene.add_object(Object::new(
        Surface::Sphere(Sphere::new(Vec3::new(0.0, 0.0, 1.0), 1.0)),
        metal_gold,
    ));

    let clearcoat = Arc::new(Material::disney_clearcoat(0.8));
    scene.add_object(Object::new(
        Surface::Sphere(Sphere::new(Vec3::new(3.0, 0.0, 1.0), 1.0)),
        clearcoat,
    ));

    let light = Arc::new(Material::diffuse_light(Texture::solid(Vec3::ONE), 5.0));
    scene.add_object(Object::new(
        Surface::Sphere(Sphere::new(Vec3::new(-10.0, -10.0, 20.0), 8.0)),
        light,
    ));
}

/// Imports an OBJ mesh and instances it into `scene`, applying `origin` and
/// `scale` per vertex the way `Mesh_AddToScene` does, sharing one material
/// across every triangle.
fn add_obj_mesh(scene: &mut Scene, path: &Path, origin: Vec3, scale: Vec3) -> Result<(), AppError> {
    let triangles = tracer_io::load_obj(path)?;
    let placed = tracer_io::place_triangles(&triangles, origin, scale);
    let material = Arc::new(Material::disney_metal(Texture::solid(Vec3::new(0.9, 0.8, 0.1)), 1.0, 0.0));

    for tri in placed {
        scene.add_object(Object::new(Surface::Triangle(tri), Arc::clone(&material)));
    }

    Ok(())
}

/// Builds and prepares the scene named by `config`.
pub fn build_scene(config: &Config, skybox: Arc<Skybox>) -> Result<Scene, AppError> {
    let mut scene = Scene::new(skybox);

    match &config.scene_path {
        Some(path) => add_obj_mesh(&mut scene, path, Vec3::new(0.0, 0.0, 1.0), Vec3::splat(1.0 / 10.0))?,
        None => build_primitive_demo(&mut scene),
    }

    scene.prepare();
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_demo_prepares_with_every_object_bounded() {
        let mut scene = Scene::new(Arc::new(Skybox::solid(Vec3::splat(0.5))));
        build_primitive_demo(&mut scene);
        scene.prepare();
        assert_eq!(scene.objects().len(), scene.bounded_indices().len());
        assert!(!scene.objects().is_empty());
    }

    #[test]
    fn build_scene_with_no_scene_path_uses_the_primitive_demo() {
        let config = Config { scene_path: None, ..Config::default() };
        let scene = build_scene(&config, Arc::new(Skybox::solid(Vec3::ZERO))).unwrap();
        assert!(!scene.objects().is_empty());
    }
}
