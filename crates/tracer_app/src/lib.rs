//! CLI shell: argument parsing, configuration, logging setup, the interrupt
//! handler, and the top-level render-then-export pipeline.

pub mod app_error;
pub mod cli;
pub mod config;
pub mod interrupt;
pub mod scene_builder;

use std::sync::{Arc, Mutex};

use glam::Vec3;
use log::info;

use tracer_core::camera::Camera;
use tracer_render::{FrameBuffer, KdTree};

use config::Config;

/// Initializes `env_logger` from `RUST_LOG`, defaulting to `info`.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

/// The camera the reference's `main()` hardcodes: looking from `(20,-20,20)`
/// at `(0,0,6)`, `z` up, 40 degree vertical FOV, zero-aperture pinhole.
fn default_camera(aspect_ratio: f32) -> Camera {
    let look_from = Vec3::new(20.0, -20.0, 20.0);
    let look_at = Vec3::new(0.0, 0.0, 6.0);
    let focus_dist = (look_from - look_at).length();
    Camera::new(look_from, look_at, Vec3::Z, aspect_ratio, 40.0, 0.0, focus_dist)
}

/// Builds the scene, renders it, and exports it to `config.output_path`,
/// installing a `SIGINT` handler that dumps whatever's been rendered so far
/// if interrupted.
pub fn run(config: &Config) -> anyhow::Result<()> {
    let skybox = Arc::new(match &config.skybox_dir {
        Some(dir) => scene_builder::load_skybox_dir(dir)?,
        None => tracer_core::skybox::Skybox::solid(Vec3::new(0.5, 0.7, 1.0)),
    });
    let scene = scene_builder::build_scene(config, skybox)?;

    let tree = KdTree::build(scene.objects(), scene.bounded_indices())?;
    let aspect_ratio = config.width as f32 / config.height as f32;
    let cam = default_camera(aspect_ratio);

    let framebuffer = Arc::new(Mutex::new(FrameBuffer::new(config.width, config.height)));
    interrupt::install(Arc::clone(&framebuffer), config.output_path.with_file_name("partial.bmp"));

    info!("scene built with {} objects", scene.objects().len());

    tracer_render::render_into(
        &scene,
        tree.as_ref(),
        &cam,
        &framebuffer,
        config.samples_per_pixel,
        config.max_bounces,
        config.threads,
    );

    interrupt::clear();

    let fb = framebuffer.lock().unwrap();
    tracer_io::write_bmp(&config.output_path, fb.width(), fb.height(), fb.as_rgb_bytes())?;
    info!("exported render to {}", config.output_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera_looks_from_the_documented_position() {
        let cam = default_camera(16.0 / 9.0);
        let ray = cam.get_ray(0.5, 0.5, &mut tracer_core::random::Rng::seed(1, 2));
        assert!(ray.origin.distance(Vec3::new(20.0, -20.0, 20.0)) < 1e-4);
    }

    #[test]
    fn run_produces_an_output_file() {
        let dir = std::env::temp_dir().join(format!("tracer_app_run_test_{:?}", std::thread::current().id()));
        std::fs::create_dir_all(&dir).unwrap();
        let output_path = dir.join("output.bmp");

        let config = Config {
            threads: 2,
            samples_per_pixel: 1,
            max_bounces: 2,
            width: 16,
            height: 9,
            scene_path: None,
            skybox_dir: None,
            output_path: output_path.clone(),
        };

        run(&config).unwrap();
        assert!(output_path.exists());
        std::fs::remove_dir_all(&dir).ok();
    }
}
