//! Core scene representation for the path tracer: math helpers, the
//! xoshiro128+ generator, rays, geometric surfaces, materials, textures, the
//! skybox, the thin-lens camera, and the scene graph that ties them
//! together. Acceleration and parallel rendering live in `tracer_render`;
//! this crate only knows how to evaluate one ray at a time.

pub mod bbox;
pub mod camera;
pub mod hit;
pub mod material;
pub mod math;
pub mod random;
pub mod ray;
pub mod scene;
pub mod skybox;
pub mod surface;
pub mod texture;

pub use bbox::BoundingBox;
pub use camera::Camera;
pub use hit::HitInfo;
pub use material::{BounceResult, Material};
pub use random::Rng;
pub use ray::Ray;
pub use scene::{Object, Scene};
pub use skybox::Skybox;
pub use surface::{Sphere, Surface, Triangle, Vertex};
pub use texture::Texture;
