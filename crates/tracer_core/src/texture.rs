//! Linear-color 2-D textures, sampled by UV coordinate.

use glam::{Vec2, Vec3};

/// A linear-color image sampled by `(u, v) in [0, 1]^2`.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    width: usize,
    height: usize,
    pixels: Vec<Vec3>,
}

impl Texture {
    /// Builds a texture from a row-major, top-to-bottom pixel buffer.
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<Vec3>) -> Self {
        debug_assert_eq!(pixels.len(), width * height);
        Self {
            width,
            height,
            pixels,
        }
    }

    /// A 1x1 texture of a single solid color, for materials with no map.
    pub fn solid(color: Vec3) -> Self {
        Self::from_pixels(1, 1, vec![color])
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Nearest-neighbor sample. `v` is flipped (image origin is top-left);
    /// bilinear interpolation is a permitted refinement, not implemented here
    /// to match the reference's truncating lookup exactly.
    pub fn color_at(&self, st: Vec2) -> Vec3 {
        let xx = (st.x * (self.width as f32 - 1.0)) as usize;
        let yy = ((1.0 - st.y) * (self.height as f32 - 1.0)) as usize;
        let xx = xx.min(self.width.saturating_sub(1));
        let yy = yy.min(self.height.saturating_sub(1));
        self.pixels[yy * self.width + xx]
    }
}
