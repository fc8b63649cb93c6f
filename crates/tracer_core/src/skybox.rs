//! Six-face cube-mapped environment.

use glam::Vec3;

use crate::texture::Texture;

/// Cube face, in the order the reference's skybox folder format expects
/// (`xpos.bmp, xneg.bmp, ypos.bmp, yneg.bmp, zpos.bmp, zneg.bmp`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum Face {
    XPos = 0,
    XNeg = 1,
    YPos = 2,
    YNeg = 3,
    ZPos = 4,
    ZNeg = 5,
}

pub const FACE_COUNT: usize = 6;

/// A six-face cube skybox, sampled by ray direction.
#[derive(Debug, Clone, PartialEq)]
pub struct Skybox {
    faces: [Texture; FACE_COUNT],
}

impl Skybox {
    pub fn new(faces: [Texture; FACE_COUNT]) -> Self {
        Self { faces }
    }

    /// A uniform skybox (e.g. black, for test scenes with no environment).
    pub fn solid(color: Vec3) -> Self {
        Self::new(std::array::from_fn(|_| Texture::solid(color)))
    }

    pub fn face(&self, face: Face) -> &Texture {
        &self.faces[face as usize]
    }

    /// Maps `dir` to a cube face by dominant axis, then samples it.
    pub fn color_at(&self, dir: Vec3) -> Vec3 {
        let abs = dir.abs();
        let is_positive = Vec3::new(
            if dir.x > 0.0 { 1.0 } else { 0.0 },
            if dir.y > 0.0 { 1.0 } else { 0.0 },
            if dir.z > 0.0 { 1.0 } else { 0.0 },
        );

        let (face, max_axis, uc, vc) = if dir.x > 0.0 && abs.x >= abs.y && abs.x >= abs.z {
            (Face::XPos, abs.x, dir.y, dir.z)
        } else if is_positive.x == 0.0 && abs.x >= abs.y && abs.x >= abs.z {
            (Face::XNeg, abs.x, -dir.y, dir.z)
        } else if dir.y > 0.0 && abs.y >= abs.x && abs.y >= abs.z {
            (Face::YPos, abs.y, -dir.x, dir.z)
        } else if is_positive.y == 0.0 && abs.y >= abs.x && abs.y >= abs.z {
            (Face::YNeg, abs.y, dir.x, dir.z)
        } else if dir.z > 0.0 && abs.z >= abs.x && abs.z >= abs.y {
            (Face::ZPos, abs.z, -dir.x, -dir.y)
        } else {
            (Face::ZNeg, abs.z, -dir.x, dir.y)
        };

        let uv = glam::Vec2::new(0.5 * (uc / max_axis + 1.0), 0.5 * (vc / max_axis + 1.0));
        self.face(face).color_at(uv)
    }
}
