//! Rays with precomputed per-axis reciprocals for KD-tree traversal.

use glam::Vec3;

/// A ray `origin + t * dir`, carrying a cache of `1/dir` and `origin/dir`
/// used by KD-tree traversal to avoid recomputing a division per node.
///
/// `time` exists for parity with the reference surface model but is unused:
/// motion blur is out of scope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
    pub time: f32,
    inv_dir: Vec3,
    origin_div_dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3, time: f32) -> Self {
        Self {
            origin,
            dir,
            time,
            inv_dir: Vec3::new(1.0 / dir.x, 1.0 / dir.y, 1.0 / dir.z),
            origin_div_dir: Vec3::new(origin.x / dir.x, origin.y / dir.y, origin.z / dir.z),
        }
    }

    /// The point at parametric distance `t` along the ray.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }

    /// `1 / dir`, per axis. `±inf` where `dir` is zero on that axis.
    pub fn inv_dir(&self) -> Vec3 {
        self.inv_dir
    }

    /// `origin / dir`, per axis.
    pub fn origin_div_dir(&self) -> Vec3 {
        self.origin_div_dir
    }
}
